//! Product configuration trait for CLI binaries
//!
//! A binary implements this trait to give the shared scaffolding workflow its
//! identity: names, where templates live, which tools it needs and what to
//! print once a project exists.

use crate::project::Template;
use crate::runtime::tool::{git_tool, rye_tool, ToolConfig};
use std::path::{Path, PathBuf};

/// Configuration trait for scaffolding CLI products
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI command and share dir)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Environment variable name for overriding the template directory
    fn template_dir_env(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path, template: Template) -> Vec<String>;

    /// Tools checked (advisory) before a build
    fn required_tools(&self) -> Vec<ToolConfig> {
        vec![git_tool(), rye_tool()]
    }

    /// Last-resort template directory, usually the in-repo `templates/`
    fn bundled_template_dir(&self) -> Option<PathBuf> {
        None
    }
}
