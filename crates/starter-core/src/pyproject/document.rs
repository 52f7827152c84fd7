//! Ordered `pyproject.toml` document model
//!
//! Sections are rendered in insertion order. TOML scalars are encoded through
//! `toml_edit` so quoting and escaping follow the TOML spec.

use std::fmt::Write as _;

/// Named manifest sections, in the order they appear in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Metadata,
    ToolManager,
    Scripts,
    BuildBackend,
    Formatter,
    Linter,
    ImportOrdering,
    Tests,
    Coverage,
    PackagingMetadata,
    Wheel,
}

impl SectionKind {
    /// TOML table header
    pub fn header(&self) -> &'static str {
        match self {
            SectionKind::Metadata => "project",
            SectionKind::ToolManager => "tool.rye",
            SectionKind::Scripts => "tool.rye.scripts",
            SectionKind::BuildBackend => "build-system",
            SectionKind::Formatter => "tool.ruff.format",
            SectionKind::Linter => "tool.ruff.lint",
            SectionKind::ImportOrdering => "tool.ruff.lint.isort",
            SectionKind::Tests => "tool.pytest.ini_options",
            SectionKind::Coverage => "tool.coverage.report",
            SectionKind::PackagingMetadata => "tool.hatch.metadata",
            SectionKind::Wheel => "tool.hatch.build.targets.wheel",
        }
    }
}

/// A rye task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Cmd {
        cmd: String,
        env: Vec<(String, String)>,
    },
    Chain(Vec<String>),
}

impl Task {
    pub fn cmd(cmd: impl Into<String>) -> Self {
        Task::Cmd {
            cmd: cmd.into(),
            env: Vec::new(),
        }
    }

    pub fn cmd_with_env(cmd: impl Into<String>, key: &str, value: &str) -> Self {
        Task::Cmd {
            cmd: cmd.into(),
            env: vec![(key.to_string(), value.to_string())],
        }
    }

    pub fn chain<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Task::Chain(steps.into_iter().map(Into::into).collect())
    }
}

/// Entry values used by the generated manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    /// Single-line array of strings
    List(Vec<String>),
    /// Array of strings with one item per line
    Block(Vec<String>),
    Task(Task),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) | Value::Block(items) => Some(items),
            _ => None,
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Value::Str(s) => out.push_str(&quote(s)),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => {
                let _ = write!(out, "{}", i);
            }
            Value::List(items) => out.push_str(&inline_list(items)),
            Value::Block(items) if items.is_empty() => out.push_str("[]"),
            Value::Block(items) => {
                out.push_str("[\n");
                for item in items {
                    let _ = writeln!(out, "   {},", quote(item));
                }
                out.push(']');
            }
            Value::Task(Task::Cmd { cmd, env }) if env.is_empty() => {
                let _ = write!(out, "{{ cmd = {} }}", quote(cmd));
            }
            Value::Task(Task::Cmd { cmd, env }) => {
                let pairs = env
                    .iter()
                    .map(|(k, v)| format!("{} = {}", key(k), quote(v)))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = write!(out, "{{ cmd = {}, env = {{ {} }} }}", quote(cmd), pairs);
            }
            Value::Task(Task::Chain(steps)) => {
                let _ = write!(out, "{{ chain = {} }}", inline_list(steps));
            }
        }
    }
}

/// One `[header]` table and its ordered entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub entries: Vec<(String, Value)>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, key: &str, value: Value) -> Self {
        self.entries.push((key.to_string(), value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// The whole manifest as an ordered list of sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDocument {
    sections: Vec<Section>,
}

impl ManifestDocument {
    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "[{}]", section.kind.header());
            for (k, v) in &section.entries {
                out.push_str(&key(k));
                out.push_str(" = ");
                v.render(&mut out);
                out.push('\n');
            }
        }
        out
    }
}

fn quote(s: &str) -> String {
    toml_edit::Value::from(s).to_string()
}

fn inline_list(items: &[String]) -> String {
    let quoted = items.iter().map(|i| quote(i)).collect::<Vec<_>>();
    format!("[{}]", quoted.join(", "))
}

/// Bare key when TOML allows it, quoted otherwise (`"lint:ruff"`)
fn key(k: &str) -> String {
    let bare = !k.is_empty()
        && k
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if bare {
        k.to_string()
    } else {
        quote(k)
    }
}
