//! Generic tool management for CLI tools
//!
//! Describes the external tools the scaffolder shells out to (git, rye) and
//! offers an install path for tools that publish an install script.

use anyhow::Result;
use colored::Colorize;
use std::process::Command;

/// Configuration for a CLI tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Name of the tool binary (e.g., "rye")
    pub name: &'static str,
    /// Display name for user-facing messages
    pub display_name: &'static str,
    /// Shell pipeline that installs the tool, if the tool has one
    pub install_command: Option<&'static str>,
    /// URL to the documentation
    pub docs_url: &'static str,
}

/// Manager for checking and installing CLI tools
pub struct ToolManager {
    config: ToolConfig,
}

impl ToolManager {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Check if the tool is installed and available in PATH
    pub fn is_installed(&self) -> bool {
        Command::new("which")
            .arg(self.config.name)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Get the installed tool version (if available)
    pub fn get_version(&self) -> Option<String> {
        Command::new(self.config.name)
            .arg("--version")
            .output()
            .ok()
            .filter(|output| output.status.success())
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .and_then(|s| s.lines().next().map(|l| l.trim().to_string()))
    }

    /// Run the tool's install script with the terminal attached
    pub fn install(&self) -> Result<()> {
        let Some(cmd) = self.config.install_command else {
            anyhow::bail!(
                "{} has no automatic installer. See {}",
                self.config.display_name,
                self.config.docs_url
            );
        };

        println!();
        println!("{} {}", "Running:".dimmed(), cmd.yellow());
        println!();

        let status = Command::new("sh").arg("-c").arg(cmd).status()?;

        println!();
        if status.success() {
            Ok(())
        } else {
            anyhow::bail!(
                "Installation failed with exit code: {}\n\
                 Please try installing manually: {}",
                status.code().unwrap_or(-1),
                cmd
            );
        }
    }

    /// Open the tool's documentation in the default browser
    pub fn open_docs(&self) -> Result<()> {
        println!(
            "{}",
            format!("Opening {} documentation in your browser...", self.config.display_name).cyan()
        );
        open::that(self.config.docs_url)?;
        Ok(())
    }
}

/// git, used to initialize the project repository
pub fn git_tool() -> ToolConfig {
    ToolConfig {
        name: "git",
        display_name: "git",
        install_command: None,
        docs_url: "https://git-scm.com/downloads",
    }
}

/// rye, used to resolve and install project dependencies
pub fn rye_tool() -> ToolConfig {
    ToolConfig {
        name: "rye",
        display_name: "rye",
        install_command: Some("curl -sSf https://rye.astral.sh/get | RYE_INSTALL_OPTION=\"--yes\" bash"),
        docs_url: "https://rye.astral.sh/",
    }
}
