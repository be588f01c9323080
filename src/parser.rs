//! Parser for project descriptors (`.csproj`) to extract package references

use crate::error::Result;
use crate::types::DependencyDeclaration;
use roxmltree::{Document, Node};

const PACKAGE_REFERENCE_TAG: &str = "PackageReference";
const NAME_ATTRIBUTE: &str = "Include";
const VERSION_ATTRIBUTE: &str = "Version";

/// Extract every `PackageReference` declared in a descriptor document.
///
/// Elements are matched on their local name, so SDK-style projects and
/// legacy projects in the MSBuild namespace are treated alike. A reference
/// without `Include` or `Version` produces a declaration with an empty field.
pub fn extract_dependencies(document: &str) -> Result<Vec<DependencyDeclaration>> {
    let document = document.trim_start_matches('\u{feff}');
    let doc = Document::parse(document)?;

    let dependencies = doc
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == PACKAGE_REFERENCE_TAG)
        .map(|node| DependencyDeclaration {
            name: node.attribute(NAME_ATTRIBUTE).unwrap_or_default().trim().to_string(),
            version: declared_version(node).unwrap_or_default().trim().to_string(),
        })
        .collect();

    Ok(dependencies)
}

/// `Version="x"` or, failing that, a `<Version>x</Version>` child
fn declared_version<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute(VERSION_ATTRIBUTE).or_else(|| {
        node.children()
            .find(|child| child.is_element() && child.tag_name().name() == VERSION_ATTRIBUTE)
            .and_then(|child| child.text())
    })
}

/// Whether a file name looks like a project descriptor
pub fn is_descriptor_name(name: &str, extension: &str) -> bool {
    name.to_lowercase().ends_with(&extension.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuditError;

    #[test]
    fn test_sdk_style_project() {
        let csproj = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.1" />
    <PackageReference Include="Serilog" Version="3.1.1" />
  </ItemGroup>
  <ItemGroup>
    <PackageReference Include="xunit" Version="2.6.2" />
  </ItemGroup>
</Project>"#;

        let deps = extract_dependencies(csproj).unwrap();
        assert_eq!(
            deps,
            vec![
                DependencyDeclaration::new("Newtonsoft.Json", "13.0.1"),
                DependencyDeclaration::new("Serilog", "3.1.1"),
                DependencyDeclaration::new("xunit", "2.6.2"),
            ]
        );
    }

    #[test]
    fn test_namespaced_project_with_bom() {
        let csproj = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<Project ToolsVersion=\"15.0\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n\
  <ItemGroup>\n\
    <PackageReference Include=\"Dapper\">\n\
      <Version>2.1.24</Version>\n\
    </PackageReference>\n\
  </ItemGroup>\n\
</Project>";

        let deps = extract_dependencies(csproj).unwrap();
        assert_eq!(deps, vec![DependencyDeclaration::new("Dapper", "2.1.24")]);
    }

    #[test]
    fn test_no_package_references() {
        let csproj = r#"<Project Sdk="Microsoft.NET.Sdk"><ItemGroup><Compile Include="a.cs" /></ItemGroup></Project>"#;
        assert!(extract_dependencies(csproj).unwrap().is_empty());
    }

    #[test]
    fn test_missing_attributes_give_empty_fields() {
        let csproj = r#"<Project>
  <ItemGroup>
    <PackageReference Include="NoVersion" />
    <PackageReference Version="1.0.0" />
  </ItemGroup>
</Project>"#;

        let deps = extract_dependencies(csproj).unwrap();
        assert_eq!(
            deps,
            vec![
                DependencyDeclaration::new("NoVersion", ""),
                DependencyDeclaration::new("", "1.0.0"),
            ]
        );
    }

    #[test]
    fn test_malformed_document() {
        let result = extract_dependencies("<Project><ItemGroup></Project>");
        assert!(matches!(result, Err(AuditError::XmlError(_))));
    }

    #[test]
    fn test_is_descriptor_name() {
        assert!(is_descriptor_name("Widgets.csproj", ".csproj"));
        assert!(is_descriptor_name("LEGACY.CSPROJ", ".csproj"));
        assert!(!is_descriptor_name("Widgets.csproj.user", ".csproj"));
        assert!(!is_descriptor_name("README.md", ".csproj"));
    }
}
