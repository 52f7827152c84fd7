//! Template selection and the per-invocation project description

use crate::naming::{derive_identifier, derive_title};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Starter template variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Template {
    /// Importable library under `src/<package>`
    Python,
    /// Flask web application under `app/`
    Flask,
    /// FastAPI web application under `app/`
    Fastapi,
}

/// Layout family a template belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateStyle {
    Library,
    Server,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Python, Template::Flask, Template::Fastapi];

    /// Name of the layer directory in the template bundle
    pub fn id(&self) -> &'static str {
        match self {
            Template::Python => "python",
            Template::Flask => "flask",
            Template::Fastapi => "fastapi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Template::Python => "Python library",
            Template::Flask => "Flask",
            Template::Fastapi => "FastAPI",
        }
    }

    pub fn style(&self) -> TemplateStyle {
        match self {
            Template::Python => TemplateStyle::Library,
            Template::Flask | Template::Fastapi => TemplateStyle::Server,
        }
    }

    pub fn is_library(&self) -> bool {
        self.style() == TemplateStyle::Library
    }

    /// Whether generated projects serve HTTP endpoints
    pub fn exposes_endpoints(&self) -> bool {
        self.style() == TemplateStyle::Server
    }

    pub fn from_id(id: &str) -> Option<Template> {
        Self::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Everything one scaffolding run needs to know about the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    raw_name: String,
    target: PathBuf,
    identifier: String,
    title: String,
    template: Template,
}

impl ProjectSpec {
    /// Resolve `name` against `cwd` and derive the package names from the
    /// final path component.
    pub fn new(name: &str, cwd: &Path, template: Template) -> Self {
        let target = normalize(&cwd.join(name));
        let leaf = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let identifier = derive_identifier(&leaf);
        let title = derive_title(&identifier);

        Self {
            raw_name: name.to_string(),
            target,
            identifier,
            title,
            template,
        }
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn template(&self) -> Template {
        self.template
    }
}

/// Lexical normalization: drops `.` and folds `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
