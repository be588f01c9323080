//! Repository listing and content access through the GitHub REST API

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::types::{Repository, TreeEntry};
use crate::walker::DirectoryLister;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const SERVICE: &str = "GitHub";

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    full_name: Option<String>,
    owner: GitHubOwner,
}

#[derive(Debug, Deserialize)]
struct GitHubOwner {
    login: String,
}

impl From<GitHubRepo> for Repository {
    fn from(repo: GitHubRepo) -> Self {
        let full_name = repo
            .full_name
            .unwrap_or_else(|| format!("{}/{}", repo.owner.login, repo.name));
        Repository {
            owner: repo.owner.login,
            name: repo.name,
            full_name,
        }
    }
}

/// Authenticated GitHub client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
}

impl GitHubClient {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            api_base: config.hosting_api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Every repository of the authenticated user, following `Link: rel="next"`
    pub async fn list_repositories(&self, page_size: u32) -> Result<Vec<Repository>> {
        let mut repositories = Vec::new();
        let mut next = Some(format!("{}/user/repos?per_page={}", self.api_base, page_size));

        while let Some(url) = next {
            let response = self.get(&url).await?;
            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(extract_next_link);

            let page: Vec<GitHubRepo> = response.json().await?;
            debug!("Fetched {} repositories from {}", page.len(), url);
            repositories.extend(page.into_iter().map(Repository::from));
        }

        Ok(repositories)
    }

    /// Raw text of a file, from its `download_url`
    pub async fn fetch_file(&self, download_url: &str) -> Result<String> {
        let response = self.get(download_url).await?;
        Ok(response.text().await?)
    }

    fn contents_url(&self, repository: &Repository, path: &str) -> String {
        let encoded: Vec<_> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();

        let mut url = format!(
            "{}/repos/{}/{}/contents",
            self.api_base,
            urlencoding::encode(&repository.owner),
            urlencoding::encode(&repository.name)
        );
        if !encoded.is_empty() {
            url.push('/');
            url.push_str(&encoded.join("/"));
        }
        url
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AuditError::network(format!("{} request failed: {}", SERVICE, e)))?;

        if !response.status().is_success() {
            return Err(AuditError::http_status(SERVICE, response.status().as_u16(), url));
        }

        Ok(response)
    }
}

#[async_trait]
impl DirectoryLister for GitHubClient {
    async fn list_directory(&self, repository: &Repository, path: &str) -> Result<Vec<TreeEntry>> {
        let url = self.contents_url(repository, path);
        let response = self.get(&url).await?;
        let entries: Vec<TreeEntry> = response.json().await?;
        Ok(entries)
    }
}

/// Build HTTP client with GitHub authentication
fn build_client(config: &AuditConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));

    if let Some(token) = &config.github_token {
        let mut value = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|_| AuditError::config("GitHub token contains invalid header characters"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.network.timeout())
        .default_headers(headers)
        .build()
        .map_err(|e| AuditError::network(format!("Failed to build HTTP client: {}", e)))
}

/// Extract the `rel="next"` target from a Link header
fn extract_next_link(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|link| {
        let (target, params) = link.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == "rel=\"next\"") {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Some(target.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> GitHubClient {
        let config = AuditConfig::builder()
            .github_token("secret")
            .hosting_api_base(server.url())
            .build();
        GitHubClient::new(&config).unwrap()
    }

    #[test]
    fn test_extract_next_link() {
        let link_header = r#"<https://api.github.com/user/repos?per_page=2&page=2>; rel="next", <https://api.github.com/user/repos?per_page=2&page=5>; rel="last""#;
        assert_eq!(
            extract_next_link(link_header).as_deref(),
            Some("https://api.github.com/user/repos?per_page=2&page=2")
        );

        let last_page = r#"<https://api.github.com/user/repos?per_page=2&page=1>; rel="prev", <https://api.github.com/user/repos?per_page=2&page=1>; rel="first""#;
        assert_eq!(extract_next_link(last_page), None);
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let server_url = "https://api.github.com";
        let config = AuditConfig::builder().hosting_api_base(server_url).build();
        let github = GitHubClient::new(&config).unwrap();
        let repo = Repository::new("acme", "widgets");

        assert_eq!(
            github.contents_url(&repo, ""),
            "https://api.github.com/repos/acme/widgets/contents"
        );
        assert_eq!(
            github.contents_url(&repo, "src/My App"),
            "https://api.github.com/repos/acme/widgets/contents/src/My%20App"
        );
    }

    #[tokio::test]
    async fn test_list_repositories_follows_pagination() {
        let mut server = mockito::Server::new_async().await;
        let next = format!("{}/user/repos?per_page=1&page=2", server.url());

        let first = server
            .mock("GET", "/user/repos")
            .match_query(Matcher::Exact("per_page=1".into()))
            .match_header("authorization", "token secret")
            .with_status(200)
            .with_header("link", &format!("<{}>; rel=\"next\"", next))
            .with_body(r#"[{"name": "widgets", "full_name": "acme/widgets", "owner": {"login": "acme"}}]"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/user/repos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("per_page".into(), "1".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"name": "gadgets", "owner": {"login": "acme"}}]"#)
            .create_async()
            .await;

        let repos = client(&server).list_repositories(1).await.unwrap();

        assert_eq!(
            repos,
            vec![Repository::new("acme", "widgets"), Repository::new("acme", "gadgets")]
        );
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_repositories_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/user/repos")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let result = client(&server).list_repositories(100).await;
        assert!(matches!(result, Err(AuditError::HttpStatus { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_list_directory() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/acme/widgets/contents/src")
            .with_status(200)
            .with_body(
                r#"[
                    {"name": "Widgets.csproj", "path": "src/Widgets.csproj", "type": "file",
                     "download_url": "https://raw.githubusercontent.com/acme/widgets/main/src/Widgets.csproj"},
                    {"name": "Models", "path": "src/Models", "type": "dir", "download_url": null}
                ]"#,
            )
            .create_async()
            .await;

        let entries = client(&server)
            .list_directory(&Repository::new("acme", "widgets"), "src")
            .await
            .unwrap();

        assert_eq!(
            entries,
            vec![
                TreeEntry::file(
                    "Widgets.csproj",
                    "https://raw.githubusercontent.com/acme/widgets/main/src/Widgets.csproj"
                ),
                TreeEntry::dir("Models"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_directory_on_file_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/acme/widgets/contents/README.md")
            .with_status(200)
            .with_body(r#"{"name": "README.md", "type": "file"}"#)
            .create_async()
            .await;

        let result = client(&server)
            .list_directory(&Repository::new("acme", "widgets"), "README.md")
            .await;
        assert!(matches!(result, Err(AuditError::DecodeError(_))));
    }
}
