//! Layered template composition
//!
//! The common layer is written first, then the variant layer on top of it.
//! Library templates ship their package under a placeholder directory that is
//! renamed to the derived package identifier once both layers are in place.

use crate::error::{Result, ScaffoldError};
use crate::project::ProjectSpec;
use crate::templates::bundle::{Layer, TemplateBundle};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory segment standing in for the package identifier
pub const PACKAGE_PLACEHOLDER: &str = "[package]";

/// Parent of the package directory in library templates
pub const PACKAGE_ROOT: &str = "src";

/// Empty marker declaring the package as type-checked (PEP 561)
pub const TYPED_MARKER: &str = "py.typed";

/// What a composition run put on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeReport {
    /// Relative paths written from the layers, before the placeholder rename
    pub files: Vec<String>,
    /// Renamed package directory, for library templates
    pub package_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    IfAbsent,
    Overwrite,
}

/// Write the common and variant layers for `spec` into its target directory
pub fn compose(bundle: &TemplateBundle, spec: &ProjectSpec) -> Result<ComposeReport> {
    let common = bundle.common()?;
    let variant = bundle.variant(spec.template())?;
    let target = spec.target();

    fs::create_dir_all(target).map_err(|e| ScaffoldError::compose(target, e))?;

    let mut written = BTreeSet::new();
    written.extend(copy_layer(common, target, WriteMode::IfAbsent)?);
    written.extend(copy_layer(variant, target, WriteMode::Overwrite)?);

    let package_dir = if spec.template().is_library() {
        Some(resolve_package_placeholder(target, spec.identifier())?)
    } else {
        None
    };

    Ok(ComposeReport {
        files: written.into_iter().collect(),
        package_dir,
    })
}

fn copy_layer(layer: &Layer, target: &Path, mode: WriteMode) -> Result<Vec<String>> {
    let mut copied = Vec::new();

    for (relative, content) in &layer.files {
        let target_path = target.join(relative);

        if mode == WriteMode::IfAbsent && target_path.exists() {
            debug!("Keeping existing {}", target_path.display());
            continue;
        }

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ScaffoldError::compose(parent, e))?;
        }

        fs::write(&target_path, content).map_err(|e| ScaffoldError::compose(&target_path, e))?;
        debug!("Wrote {} from layer '{}'", relative, layer.manifest.name);

        copied.push(relative.clone());
    }

    Ok(copied)
}

/// Rename `src/[package]` to `src/<identifier>` and drop the typed marker inside
pub fn resolve_package_placeholder(target: &Path, identifier: &str) -> Result<PathBuf> {
    let placeholder = target.join(PACKAGE_ROOT).join(PACKAGE_PLACEHOLDER);
    if !placeholder.is_dir() {
        return Err(ScaffoldError::MissingPlaceholder { path: placeholder });
    }

    if identifier.is_empty() {
        return Err(ScaffoldError::compose(
            &placeholder,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "package identifier is empty",
            ),
        ));
    }

    let package_dir = target.join(PACKAGE_ROOT).join(identifier);
    fs::rename(&placeholder, &package_dir).map_err(|e| ScaffoldError::compose(&package_dir, e))?;

    let marker = package_dir.join(TYPED_MARKER);
    fs::write(&marker, b"").map_err(|e| ScaffoldError::compose(&marker, e))?;

    debug!("Package directory is {}", package_dir.display());
    Ok(package_dir)
}
