//! Depth-first discovery of project descriptors in a repository tree

use crate::error::Result;
use crate::parser::is_descriptor_name;
use crate::types::{DescriptorLocation, EntryKind, Repository, TreeEntry};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Anything that can list a directory of a repository
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// List the entries of `path` (`""` is the repository root), in listing order
    async fn list_directory(&self, repository: &Repository, path: &str) -> Result<Vec<TreeEntry>>;
}

/// Lazy walk over the descriptors of one repository.
///
/// Directories are listed only when the walk reaches them, and a directory's
/// contents are exhausted before its later siblings are visited. A directory
/// whose listing fails contributes nothing; the rest of the walk continues.
pub struct DescriptorWalk<'a, L: ?Sized> {
    lister: &'a L,
    repository: &'a Repository,
    extension: String,
    root: Option<String>,
    pending: Vec<(String, std::vec::IntoIter<TreeEntry>)>,
}

impl<'a, L: DirectoryLister + ?Sized> DescriptorWalk<'a, L> {
    pub fn new(
        lister: &'a L,
        repository: &'a Repository,
        root: &str,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            lister,
            repository,
            extension: extension.into(),
            root: Some(root.trim_matches('/').to_string()),
            pending: Vec::new(),
        }
    }

    /// Next descriptor in depth-first order, or `None` once the tree is exhausted
    pub async fn next(&mut self) -> Option<DescriptorLocation> {
        if let Some(root) = self.root.take() {
            self.descend(root).await;
        }

        loop {
            let (dir, entries) = self.pending.last_mut()?;
            let next = entries.next().map(|entry| (join_path(dir, &entry.name), entry));
            let Some((path, entry)) = next else {
                self.pending.pop();
                continue;
            };

            match entry.kind {
                EntryKind::File if is_descriptor_name(&entry.name, &self.extension) => {
                    return Some(DescriptorLocation {
                        path,
                        name: entry.name,
                        download_url: entry.download_url,
                    });
                }
                EntryKind::Dir => self.descend(path).await,
                _ => {}
            }
        }
    }

    /// Drain the walk
    pub async fn collect(mut self) -> Vec<DescriptorLocation> {
        let mut found = Vec::new();
        while let Some(location) = self.next().await {
            found.push(location);
        }
        found
    }

    /// Whether the tree holds at least one descriptor; stops at the first hit
    pub async fn has_descriptors(mut self) -> bool {
        self.next().await.is_some()
    }

    async fn descend(&mut self, path: String) {
        match self.lister.list_directory(self.repository, &path).await {
            Ok(entries) => {
                debug!(
                    "Listed {}:/{} ({} entries)",
                    self.repository.full_name,
                    path,
                    entries.len()
                );
                self.pending.push((path, entries.into_iter()));
            }
            Err(e) => {
                warn!(
                    "Skipping {}:/{}: {}",
                    self.repository.full_name, path, e
                );
            }
        }
    }
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
