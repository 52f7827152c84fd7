//! Advisory detection of the external tools a build needs

use super::tool::{ToolConfig, ToolManager};

/// Tool detection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

impl RuntimeInfo {
    /// "rye (rye 0.39.0)" or "git (not installed)"
    pub fn summary(&self) -> String {
        match (&self.version, self.available) {
            (Some(version), true) => format!("{} ({})", self.name, version),
            (None, true) => format!("{} (unknown)", self.name),
            (_, false) => format!("{} (not installed)", self.name),
        }
    }
}

/// Check one tool by running `<tool> --version`
pub fn check_tool(config: &ToolConfig) -> RuntimeInfo {
    let version = ToolManager::new(config.clone()).get_version();
    RuntimeInfo {
        name: config.display_name,
        available: version.is_some(),
        version,
    }
}

/// Check every tool; never fails, missing tools are reported as unavailable
pub fn check_tools(configs: &[ToolConfig]) -> Vec<RuntimeInfo> {
    configs.iter().map(check_tool).collect()
}

/// Tools from `infos` that are not available
pub fn missing<'a>(infos: &'a [RuntimeInfo]) -> impl Iterator<Item = &'a RuntimeInfo> {
    infos.iter().filter(|info| !info.available)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let found = RuntimeInfo {
            name: "rye",
            version: Some("rye 0.39.0".to_string()),
            available: true,
        };
        assert_eq!(found.summary(), "rye (rye 0.39.0)");

        let absent = RuntimeInfo {
            name: "git",
            version: None,
            available: false,
        };
        assert_eq!(absent.summary(), "git (not installed)");
    }

    #[test]
    fn test_unknown_tool_reported_missing() {
        let infos = check_tools(&[ToolConfig {
            name: "definitely-not-a-real-tool-3f9a",
            display_name: "ghost",
            install_command: None,
            docs_url: "https://example.invalid",
        }]);
        assert_eq!(infos.len(), 1);
        assert!(!infos[0].available);
        assert_eq!(missing(&infos).count(), 1);
    }
}
