//! Template bundle manifest types

use serde::{Deserialize, Serialize};

/// File name of the root and per-layer manifests; never copied into projects
pub const MANIFEST_FILE: &str = "template.yaml";

fn default_common() -> String {
    "common".to_string()
}

/// Root bundle manifest (templates/template.yaml)
/// Names the shared layer and lists the variant layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootManifest {
    /// Semver version of the bundle, compared against the CLI version
    pub version: String,

    /// Directory name of the layer shared by every template
    #[serde(default = "default_common")]
    pub common: String,

    /// Directory names of the variant layers
    pub templates: Vec<String>,
}

impl RootManifest {
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.iter().any(|t| t == name)
    }

    /// Every layer name, common first
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.common.as_str()).chain(self.templates.iter().map(String::as_str))
    }
}

/// Per-layer manifest (templates/<layer>/template.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerManifest {
    /// Display name of the layer
    pub name: String,

    /// Description shown in the template picker
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_manifest_defaults_common() {
        let root: RootManifest =
            serde_yaml::from_str("version: 0.1.0\ntemplates: [python, flask]\n").unwrap();
        assert_eq!(root.common, "common");
        assert!(root.has_template("flask"));
        assert!(!root.has_template("common"));
        assert_eq!(
            root.layer_names().collect::<Vec<_>>(),
            vec!["common", "python", "flask"]
        );
    }

    #[test]
    fn test_layer_manifest_description_optional() {
        let layer: LayerManifest = serde_yaml::from_str("name: Shared files\n").unwrap();
        assert_eq!(layer.name, "Shared files");
        assert!(layer.description.is_empty());
    }
}
