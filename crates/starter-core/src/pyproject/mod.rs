//! `pyproject.toml` generation and auxiliary project config files

pub mod document;
pub mod sections;

use crate::error::{Result, ScaffoldError};
use crate::project::Template;
use crate::templates::version::parse_python_pin;
use std::path::Path;
use tracing::debug;

pub use document::{ManifestDocument, Section, SectionKind, Task, Value};
pub use sections::{build_document, DependencySet};

pub const MANIFEST_FILE: &str = "pyproject.toml";
pub const PYTHON_VERSION_FILE: &str = ".python-version";
pub const DOCS_DESCRIPTOR: &str = "mkdocs.yml";

/// Interpreter pinned for server templates
pub const SERVER_PYTHON_VERSION: &str = "3.12.4";

/// Write `pyproject.toml` into `target` and return the declared dependencies
pub fn generate(target: &Path, identifier: &str, template: Template) -> Result<DependencySet> {
    if template.is_library() && identifier.is_empty() {
        return Err(ScaffoldError::Manifest {
            message: format!(
                "a package identifier is required for the '{}' template",
                template
            ),
        });
    }

    let deps = DependencySet::for_template(template);
    let document = build_document(identifier, template, &deps);

    let path = target.join(MANIFEST_FILE);
    std::fs::write(&path, document.render()).map_err(|e| ScaffoldError::manifest_io(&path, e))?;
    debug!("Wrote {}", path.display());

    Ok(deps)
}

/// Python version pinned by `template`, if any
pub fn python_pin(template: Template) -> Option<&'static str> {
    template.exposes_endpoints().then_some(SERVER_PYTHON_VERSION)
}

/// Write `.python-version` for templates that pin one
pub fn pin_python_version(target: &Path, template: Template) -> Result<bool> {
    let Some(pin) = python_pin(template) else {
        return Ok(false);
    };
    parse_python_pin(pin)?;

    let path = target.join(PYTHON_VERSION_FILE);
    std::fs::write(&path, pin).map_err(|e| ScaffoldError::manifest_io(&path, e))?;
    debug!("Pinned Python {} in {}", pin, path.display());
    Ok(true)
}

/// Point the first line of `mkdocs.yml` at the project title (library templates only).
///
/// Everything after the first line is kept byte for byte.
pub fn configure_docs_descriptor(target: &Path, title: &str, template: Template) -> Result<bool> {
    if !template.is_library() {
        return Ok(false);
    }

    let path = target.join(DOCS_DESCRIPTOR);
    let existing = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(ScaffoldError::manifest_io(&path, e)),
    };

    let mut content = format!("site_name: {} Documentation", title).into_bytes();
    if let Some(newline) = existing.iter().position(|b| *b == b'\n') {
        content.extend_from_slice(&existing[newline..]);
    } else {
        content.push(b'\n');
    }

    std::fs::write(&path, content).map_err(|e| ScaffoldError::manifest_io(&path, e))?;
    debug!("Set documentation title in {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn parse(target: &Path) -> toml::Table {
        std::fs::read_to_string(target.join(MANIFEST_FILE))
            .unwrap()
            .parse()
            .unwrap()
    }

    fn strings(value: &toml::Value) -> Vec<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_generate_library_manifest() {
        let tmp = TempDir::new().unwrap();
        let deps = generate(tmp.path(), "My_Lib", Template::Python).unwrap();
        assert!(deps.runtime.is_empty());

        let manifest = parse(tmp.path());
        let project = &manifest["project"];
        assert_eq!(project["name"].as_str(), Some("My_Lib"));
        assert_eq!(project["version"].as_str(), Some("0.1.0"));
        assert_eq!(project["requires-python"].as_str(), Some(">= 3.10"));
        assert!(project["dependencies"].as_array().unwrap().is_empty());
        assert!(project["authors"].as_array().unwrap().is_empty());

        let tool = &manifest["tool"];
        assert_eq!(tool["rye"]["managed"].as_bool(), Some(true));
        assert_eq!(strings(&tool["rye"]["dev-dependencies"]), deps.dev);
        assert_eq!(
            strings(&tool["hatch"]["build"]["targets"]["wheel"]["packages"]),
            vec!["src/My_Lib"]
        );
        assert_eq!(
            strings(&tool["ruff"]["lint"]["isort"]["known-first-party"]),
            vec!["My_Lib", "tests"]
        );
        assert_eq!(tool["coverage"]["report"]["fail_under"].as_integer(), Some(90));
        assert_eq!(
            manifest["build-system"]["build-backend"].as_str(),
            Some("hatchling.build")
        );
        assert_eq!(
            tool["rye"]["scripts"]["docs:serve"]["cmd"].as_str(),
            Some("mkdocs serve -f mkdocs.yml")
        );
    }

    #[test]
    fn test_generate_server_manifest() {
        let tmp = TempDir::new().unwrap();
        let deps = generate(tmp.path(), "demo_api", Template::Fastapi).unwrap();

        let manifest = parse(tmp.path());
        assert_eq!(
            strings(&manifest["project"]["dependencies"]),
            vec!["fastapi==0.115.6", "pydantic-settings>=2.3.4"]
        );
        assert_eq!(strings(&manifest["project"]["dependencies"]), deps.runtime);

        let scripts = &manifest["tool"]["rye"]["scripts"];
        assert_eq!(scripts["dev"]["cmd"].as_str(), Some("fastapi dev app/main.py"));
        assert_eq!(
            scripts["prod"]["env"]["FAST_API_ENV"].as_str(),
            Some("production")
        );
        assert_eq!(
            strings(&scripts["fix"]["chain"]),
            vec!["lint:ruff", "ruff format"]
        );
        assert_eq!(
            strings(&manifest["tool"]["hatch"]["build"]["targets"]["wheel"]["packages"]),
            vec!["app"]
        );
        assert!(manifest["tool"]["ruff"].get("lint").is_none());
    }

    #[test]
    fn test_generate_overwrites() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_FILE), "[stale]\nkey = 1\n").unwrap();
        generate(tmp.path(), "fresh", Template::Flask).unwrap();
        let manifest = parse(tmp.path());
        assert!(manifest.get("stale").is_none());
        assert_eq!(manifest["project"]["name"].as_str(), Some("fresh"));
    }

    #[test]
    fn test_library_requires_identifier() {
        let tmp = TempDir::new().unwrap();
        let err = generate(tmp.path(), "", Template::Python).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Manifest);
        assert!(!tmp.path().join(MANIFEST_FILE).exists());
    }

    #[test]
    fn test_pin_python_version() {
        let tmp = TempDir::new().unwrap();
        assert!(!pin_python_version(tmp.path(), Template::Python).unwrap());
        assert!(!tmp.path().join(PYTHON_VERSION_FILE).exists());

        assert!(pin_python_version(tmp.path(), Template::Fastapi).unwrap());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(PYTHON_VERSION_FILE)).unwrap(),
            "3.12.4"
        );
    }

    #[test]
    fn test_docs_descriptor_keeps_tail() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DOCS_DESCRIPTOR);
        std::fs::write(&path, "site_name: Placeholder\ntheme:\n  name: material\r\n\n").unwrap();

        assert!(configure_docs_descriptor(tmp.path(), "My Lib", Template::Python).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "site_name: My Lib Documentation\ntheme:\n  name: material\r\n\n"
        );
    }

    #[test]
    fn test_docs_descriptor_missing_or_skipped() {
        let tmp = TempDir::new().unwrap();
        assert!(!configure_docs_descriptor(tmp.path(), "Web", Template::Flask).unwrap());
        assert!(!tmp.path().join(DOCS_DESCRIPTOR).exists());

        assert!(configure_docs_descriptor(tmp.path(), "Lib", Template::Python).unwrap());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(DOCS_DESCRIPTOR)).unwrap(),
            "site_name: Lib Documentation\n"
        );
    }
}
