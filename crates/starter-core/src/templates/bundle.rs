//! Template bundle loading from a local directory or a zip archive
//!
//! Both sources produce the same in-memory [`TemplateBundle`]:
//! - Directory: `template.yaml` at the root plus one folder per layer
//! - Archive: the same tree packed into a zip (see [`TemplateBundle::to_zip`])
//!
//! Layers are loaded eagerly; the whole bundle is a few dozen small files.

use super::manifest::{LayerManifest, RootManifest, MANIFEST_FILE};
use crate::error::{Result, ScaffoldError};
use crate::product::ProductConfig;
use crate::project::Template;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Template source - either an unpacked directory or a zip archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl TemplateSource {
    /// Pick the source kind from the path: `*.zip` is an archive
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip {
            Self::Archive(path)
        } else {
            Self::Directory(path)
        }
    }

    /// Resolve the template source for a product.
    ///
    /// Order: explicit path, the product's env var, next to the executable,
    /// the shared data dir next to the executable, the product's build-time
    /// fallback.
    pub fn from_config<C: ProductConfig>(config: &C, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::from_path(path));
        }

        if let Ok(path) = std::env::var(config.template_dir_env()) {
            if !path.is_empty() {
                debug!("Using templates from ${}", config.template_dir_env());
                return Ok(Self::from_path(path));
            }
        }

        let mut candidates = Vec::new();
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(exe_dir.join("templates"));
            candidates.push(
                exe_dir
                    .join("..")
                    .join("share")
                    .join(config.name())
                    .join("templates"),
            );
        }
        if let Some(dir) = config.bundled_template_dir() {
            candidates.push(dir);
        }

        candidates
            .into_iter()
            .find(|dir| dir.join(MANIFEST_FILE).is_file())
            .map(Self::Directory)
            .ok_or_else(|| {
                ScaffoldError::bundle(format!(
                    "no template directory found; pass --template-dir or set {}",
                    config.template_dir_env()
                ))
            })
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(p) | Self::Archive(p) => p,
        }
    }
}

/// One template layer: its manifest and files keyed by `/`-separated relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub manifest: LayerManifest,
    pub files: BTreeMap<String, Vec<u8>>,
}

impl Layer {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            manifest: LayerManifest {
                name: name.to_string(),
                description: description.to_string(),
            },
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), content.into());
        self
    }
}

/// The common layer plus every variant layer, held in memory
#[derive(Debug, Clone)]
pub struct TemplateBundle {
    root: RootManifest,
    layers: BTreeMap<String, Layer>,
}

impl TemplateBundle {
    pub fn from_parts(root: RootManifest, layers: BTreeMap<String, Layer>) -> Self {
        Self { root, layers }
    }

    pub fn load(source: &TemplateSource) -> Result<Self> {
        let bundle = match source {
            TemplateSource::Directory(dir) => Self::from_directory(dir)?,
            TemplateSource::Archive(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    ScaffoldError::bundle(format!("failed to read {}: {}", path.display(), e))
                })?;
                Self::from_zip(&bytes)?
            }
        };
        debug!(
            "Loaded template bundle {} from {} ({} layers)",
            bundle.root.version,
            source.path().display(),
            bundle.layers.len()
        );
        Ok(bundle)
    }

    /// Read an unpacked bundle; every layer listed in the root manifest must exist
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let root_path = dir.join(MANIFEST_FILE);
        let root: RootManifest = read_yaml(&root_path)?;

        let mut layers = BTreeMap::new();
        for name in root.layer_names() {
            let layer_dir = dir.join(name);
            if !layer_dir.is_dir() {
                return Err(ScaffoldError::bundle(format!(
                    "layer '{}' not found in {}",
                    name,
                    dir.display()
                )));
            }
            let manifest: LayerManifest = read_yaml(&layer_dir.join(MANIFEST_FILE))?;
            let files = read_layer_files(&layer_dir)?;
            layers.insert(name.to_string(), Layer { manifest, files });
        }

        Ok(Self { root, layers })
    }

    /// Read a bundle packed by [`TemplateBundle::to_zip`]
    pub fn from_zip(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ScaffoldError::bundle(format!("failed to read zip archive: {}", e)))?;

        let mut entries: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| ScaffoldError::bundle(format!("corrupt zip entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)
                .map_err(|e| ScaffoldError::bundle(format!("failed to read {}: {}", name, e)))?;
            entries.insert(name, contents);
        }

        let root_bytes = entries
            .remove(MANIFEST_FILE)
            .ok_or_else(|| ScaffoldError::bundle("zip archive missing template.yaml"))?;
        let root: RootManifest = parse_yaml(&root_bytes, MANIFEST_FILE)?;

        let mut layers = BTreeMap::new();
        for name in root.layer_names() {
            let prefix = format!("{}/", name);
            let manifest_key = format!("{}{}", prefix, MANIFEST_FILE);
            let manifest_bytes = entries.get(&manifest_key).ok_or_else(|| {
                ScaffoldError::bundle(format!("layer '{}' not found in zip archive", name))
            })?;
            let manifest: LayerManifest = parse_yaml(manifest_bytes, &manifest_key)?;

            let files = entries
                .iter()
                .filter(|(path, _)| path.starts_with(&prefix) && **path != manifest_key)
                .map(|(path, content)| (path[prefix.len()..].to_string(), content.clone()))
                .collect();
            layers.insert(name.to_string(), Layer { manifest, files });
        }

        Ok(Self { root, layers })
    }

    /// Pack the bundle into a zip archive readable by [`TemplateBundle::from_zip`]
    pub fn to_zip(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            let root_yaml = serde_yaml::to_string(&self.root).map_err(zip_error)?;
            write_zip_entry(&mut zip, MANIFEST_FILE, root_yaml.as_bytes(), options)?;

            for (name, layer) in &self.layers {
                let layer_yaml = serde_yaml::to_string(&layer.manifest).map_err(zip_error)?;
                let manifest_path = format!("{}/{}", name, MANIFEST_FILE);
                write_zip_entry(&mut zip, &manifest_path, layer_yaml.as_bytes(), options)?;
                for (path, content) in &layer.files {
                    write_zip_entry(&mut zip, &format!("{}/{}", name, path), content, options)?;
                }
            }

            zip.finish().map_err(zip_error)?;
        }

        Ok(buffer)
    }

    pub fn root(&self) -> &RootManifest {
        &self.root
    }

    pub fn layer(&self, name: &str) -> Result<&Layer> {
        self.layers
            .get(name)
            .ok_or_else(|| ScaffoldError::bundle(format!("layer '{}' not found", name)))
    }

    pub fn common(&self) -> Result<&Layer> {
        self.layer(&self.root.common)
    }

    pub fn variant(&self, template: Template) -> Result<&Layer> {
        if !self.root.has_template(template.id()) {
            return Err(ScaffoldError::bundle(format!(
                "template '{}' not found. Available templates: {}",
                template,
                self.root.templates.join(", ")
            )));
        }
        self.layer(template.id())
    }

    /// SHA-256 over every layer's files, hex encoded.
    ///
    /// Manifests are excluded so that renaming a layer's display name keeps the digest.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, layer) in &self.layers {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            for (path, content) in &layer.files {
                hasher.update(path.as_bytes());
                hasher.update([0u8]);
                hasher.update((content.len() as u64).to_le_bytes());
                hasher.update(content);
            }
        }
        hex::encode(hasher.finalize())
    }
}

fn zip_error(e: impl std::fmt::Display) -> ScaffoldError {
    ScaffoldError::bundle(format!("failed to write zip archive: {}", e))
}

fn write_zip_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &str,
    content: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(path, options).map_err(zip_error)?;
    zip.write_all(content).map_err(zip_error)
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read(path)
        .map_err(|e| ScaffoldError::bundle(format!("failed to read {}: {}", path.display(), e)))?;
    parse_yaml(&content, &path.display().to_string())
}

fn parse_yaml<T: serde::de::DeserializeOwned>(content: &[u8], origin: &str) -> Result<T> {
    serde_yaml::from_slice(content)
        .map_err(|e| ScaffoldError::bundle(format!("failed to parse {}: {}", origin, e)))
}

fn read_layer_files(layer_dir: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(layer_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            ScaffoldError::bundle(format!("failed to walk {}: {}", layer_dir.display(), e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(layer_dir)
            .map_err(|e| ScaffoldError::bundle(e.to_string()))?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if key == MANIFEST_FILE {
            continue;
        }
        let content = std::fs::read(entry.path()).map_err(|e| {
            ScaffoldError::bundle(format!("failed to read {}: {}", entry.path().display(), e))
        })?;
        files.insert(key, content);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn sample_dir() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            &root.join("template.yaml"),
            "version: 0.1.0\ncommon: common\ntemplates: [python]\n",
        );
        write(&root.join("common/template.yaml"), "name: Common\n");
        write(&root.join("common/README.md"), "# readme\n");
        write(&root.join("common/scripts/prepare"), "#!/bin/sh\n");
        write(
            &root.join("python/template.yaml"),
            "name: Python library\ndescription: A library\n",
        );
        write(&root.join("python/src/[package]/__init__.py"), "");
        tmp
    }

    #[test]
    fn test_source_from_path() {
        assert_eq!(
            TemplateSource::from_path("bundle.ZIP"),
            TemplateSource::Archive(PathBuf::from("bundle.ZIP"))
        );
        assert_eq!(
            TemplateSource::from_path("templates"),
            TemplateSource::Directory(PathBuf::from("templates"))
        );
    }

    #[test]
    fn test_load_directory() {
        let tmp = sample_dir();
        let bundle = TemplateBundle::load(&TemplateSource::Directory(tmp.path().into())).unwrap();

        let common = bundle.common().unwrap();
        assert_eq!(
            common.files.keys().collect::<Vec<_>>(),
            vec!["README.md", "scripts/prepare"]
        );

        let python = bundle.variant(Template::Python).unwrap();
        assert_eq!(python.manifest.description, "A library");
        assert!(python.files.contains_key("src/[package]/__init__.py"));
        assert!(!python.files.contains_key("template.yaml"));
    }

    #[test]
    fn test_missing_variant_is_bundle_error() {
        let tmp = sample_dir();
        let bundle = TemplateBundle::from_directory(tmp.path()).unwrap();
        let err = bundle.variant(Template::Fastapi).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bundle);
        assert!(err.to_string().contains("Available templates: python"));
    }

    #[test]
    fn test_missing_layer_directory() {
        let tmp = sample_dir();
        std::fs::remove_dir_all(tmp.path().join("python")).unwrap();
        let err = TemplateBundle::from_directory(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("layer 'python' not found"));
    }

    #[test]
    fn test_zip_matches_directory() {
        let tmp = sample_dir();
        let from_dir = TemplateBundle::from_directory(tmp.path()).unwrap();
        let zipped = from_dir.to_zip().unwrap();

        let archive_path = tmp.path().join("bundle.zip");
        std::fs::write(&archive_path, &zipped).unwrap();
        let from_zip = TemplateBundle::load(&TemplateSource::from_path(&archive_path)).unwrap();

        assert_eq!(from_zip.root(), from_dir.root());
        assert_eq!(from_zip.common().unwrap(), from_dir.common().unwrap());
        assert_eq!(
            from_zip.variant(Template::Python).unwrap(),
            from_dir.variant(Template::Python).unwrap()
        );
        assert_eq!(from_zip.digest(), from_dir.digest());
    }

    #[test]
    fn test_digest_tracks_content() {
        let tmp = sample_dir();
        let before = TemplateBundle::from_directory(tmp.path()).unwrap().digest();
        assert_eq!(before.len(), 64);
        assert_eq!(
            before,
            TemplateBundle::from_directory(tmp.path()).unwrap().digest()
        );

        write(&tmp.path().join("common/README.md"), "# changed\n");
        let after = TemplateBundle::from_directory(tmp.path()).unwrap().digest();
        assert_ne!(before, after);
    }
}
