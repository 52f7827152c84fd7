//! Template bundles and layered composition
//!
//! This module provides:
//! - Bundle manifest types (RootManifest, LayerManifest)
//! - Bundle loading from a local directory or a zip archive
//! - Common-then-variant composition into a project directory
//! - Version compatibility checking

pub mod bundle;
pub mod composer;
pub mod manifest;
pub mod version;

use crate::product::ProductConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub use bundle::{Layer, TemplateBundle, TemplateSource};
pub use composer::{compose, ComposeReport, PACKAGE_PLACEHOLDER, TYPED_MARKER};
pub use manifest::{LayerManifest, RootManifest};
pub use version::check_compatibility;

/// Pack a template directory into a single zip archive and return its digest
pub fn build_zip<C: ProductConfig>(config: &C, template_dir: &Path, output: &Path) -> Result<String> {
    if !template_dir.is_dir() {
        anyhow::bail!("Template directory not found: {}", template_dir.display());
    }

    println!(
        "{}",
        format!("Building {} template bundle...", config.display_name())
            .cyan()
            .bold()
    );
    println!();

    let bundle = TemplateBundle::from_directory(template_dir)
        .with_context(|| format!("Failed to load templates from {}", template_dir.display()))?;

    for name in bundle.root().layer_names() {
        let layer = bundle.layer(name)?;
        println!(
            "  {} {} ({} files)",
            "->".blue(),
            name,
            layer.files.len()
        );
    }

    let zip_bytes = bundle.to_zip()?;
    std::fs::write(output, &zip_bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let digest = bundle.digest();
    println!();
    println!(
        "{} {} ({} bytes, sha256 {})",
        "Built".green().bold(),
        output.display(),
        zip_bytes.len(),
        digest
    );

    Ok(digest)
}
