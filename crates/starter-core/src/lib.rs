//! Starter Core - scaffolding library for Python starter projects
//!
//! Creates a ready-to-develop Python project (a library, a Flask service or a
//! FastAPI service) from a layered template bundle, writes its
//! `pyproject.toml`, initializes git and installs dependencies with rye.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - naming, validation, template bundles and
//!   composition, manifest generation, tool detection and delegates
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait and the
//!   transactional `ProjectBuilder`
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use starter_core::{GitInitializer, ProjectBuilder, ProjectSpec, RyeInstaller, Template};
//! use starter_core::templates::{TemplateBundle, TemplateSource};
//!
//! let bundle = TemplateBundle::load(&TemplateSource::from_path("templates"))?;
//! let spec = ProjectSpec::new("demo-api", &std::env::current_dir()?, Template::Fastapi);
//! let builder = ProjectBuilder::new(&bundle, GitInitializer::default(), RyeInstaller::default());
//! let report = builder.build(&spec, &mut ())?;
//! println!("{}", report.dependencies);
//! ```

pub mod builder;
pub mod error;
pub mod naming;
pub mod product;
pub mod project;
pub mod pyproject;
pub mod runtime;
pub mod templates;
pub mod validate;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use builder::{BuildFailure, BuildObserver, BuildReport, BuildState, ProjectBuilder};
pub use error::{ConflictEntry, ErrorKind, Result, ScaffoldError};
pub use naming::{derive_identifier, derive_title};
pub use product::ProductConfig;
pub use project::{ProjectSpec, Template, TemplateStyle};
pub use pyproject::DependencySet;
pub use runtime::{
    check_tools, DependencyInstaller, GitInitializer, RuntimeInfo, RyeInstaller, VersionControl,
};
pub use templates::{TemplateBundle, TemplateSource};
pub use validate::validate_target;

#[cfg(feature = "tui")]
pub use tui::run;

/// CLI version - used for template compatibility checking
/// Each binary should define its own version, but this provides a fallback
pub const DEFAULT_CLI_VERSION: &str = "0.1.1";
