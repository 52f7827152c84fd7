//! External tool steps run inside the new project directory
//!
//! Both delegates follow the same contract: run in the project directory,
//! return `Ok(())` or a [`ScaffoldError::Delegate`] naming the likely
//! missing tool.

use super::tool::{git_tool, rye_tool, ToolConfig};
use crate::error::{Result, ScaffoldError};
use crate::pyproject::DependencySet;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Repository-local hook run between staging and the initial commit
pub const PREPARE_SCRIPT: &str = "scripts/prepare";

pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// Initializes version control for a freshly composed project
pub trait VersionControl {
    fn init(&self, project_dir: &Path) -> Result<()>;
}

/// Resolves and installs the declared dependency set
pub trait DependencyInstaller {
    fn install(&self, project_dir: &Path, dependencies: &DependencySet) -> Result<()>;
}

impl<T: VersionControl + ?Sized> VersionControl for &T {
    fn init(&self, project_dir: &Path) -> Result<()> {
        (**self).init(project_dir)
    }
}

impl<T: DependencyInstaller + ?Sized> DependencyInstaller for &T {
    fn install(&self, project_dir: &Path, dependencies: &DependencySet) -> Result<()> {
        (**self).install(project_dir, dependencies)
    }
}

/// Run `program args...` in `cwd`, discarding stdout and capturing stderr
pub fn exec_command(program: &str, args: &[&str], cwd: &Path) -> std::result::Result<(), String> {
    debug!("Running: {} {} (in {})", program, args.join(" "), cwd.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("failed to run `{}`: {}", program, e))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let code = output
        .status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());
    Err(format!(
        "`{} {}` exited with status {}: {}",
        program,
        args.join(" "),
        code,
        stderr.trim()
    ))
}

/// git-backed [`VersionControl`]
#[derive(Debug, Clone)]
pub struct GitInitializer {
    tool: ToolConfig,
}

impl Default for GitInitializer {
    fn default() -> Self {
        Self { tool: git_tool() }
    }
}

impl GitInitializer {
    fn fail(&self, message: String) -> ScaffoldError {
        ScaffoldError::Delegate {
            tool: self.tool.name,
            hint: format!("See more at: {}", self.tool.docs_url),
            message: format!("Failed to initialize a git repository.\n\nError: {}", message),
        }
    }
}

impl VersionControl for GitInitializer {
    fn init(&self, project_dir: &Path) -> Result<()> {
        info!("Initializing git repository in {}", project_dir.display());

        exec_command("git", &["init", "."], project_dir).map_err(|e| self.fail(e))?;
        exec_command("git", &["add", "-A"], project_dir).map_err(|e| self.fail(e))?;

        if project_dir.join(PREPARE_SCRIPT).is_file() {
            let script = format!("./{}", PREPARE_SCRIPT);
            exec_command("sh", &[script.as_str()], project_dir).map_err(|e| self.fail(e))?;
        }

        exec_command(
            "git",
            &["commit", "-am", INITIAL_COMMIT_MESSAGE, "--no-verify"],
            project_dir,
        )
        .map_err(|e| self.fail(e))
    }
}

/// rye-backed [`DependencyInstaller`]
#[derive(Debug, Clone)]
pub struct RyeInstaller {
    tool: ToolConfig,
}

impl Default for RyeInstaller {
    fn default() -> Self {
        Self { tool: rye_tool() }
    }
}

impl DependencyInstaller for RyeInstaller {
    fn install(&self, project_dir: &Path, dependencies: &DependencySet) -> Result<()> {
        info!(
            "Installing {} dev and {} runtime dependencies with rye",
            dependencies.dev.len(),
            dependencies.runtime.len()
        );

        exec_command("rye", &["sync", "--all-features"], project_dir).map_err(|e| {
            ScaffoldError::Delegate {
                tool: self.tool.name,
                hint: format!("See more at: {}", self.tool.docs_url),
                message: format!(
                    "Could not install dependencies with `{}`, are you sure you have it installed?\n\nError: {}",
                    self.tool.name, e
                ),
            }
        })
    }
}
