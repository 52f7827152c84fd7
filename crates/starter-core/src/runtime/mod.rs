//! External tools and process delegates
//!
//! This module provides:
//! - Tool detection for git and rye
//! - Generic tool management (install script, docs)
//! - The version-control and dependency-installer delegates

pub mod check;
pub mod delegate;
pub mod tool;

pub use check::{check_tool, check_tools, RuntimeInfo};
pub use delegate::{DependencyInstaller, GitInitializer, RyeInstaller, VersionControl};
pub use tool::{git_tool, rye_tool, ToolConfig, ToolManager};
