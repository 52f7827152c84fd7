//! Variant-keyed section content

use super::document::{ManifestDocument, Section, SectionKind, Task, Value};
use crate::project::{Template, TemplateStyle};
use std::fmt;

pub const DEFAULT_VERSION: &str = "0.1.0";
pub const DEFAULT_DESCRIPTION: &str = "Add your description here";
pub const REQUIRES_PYTHON: &str = ">= 3.10";
pub const COVERAGE_FAIL_UNDER: i64 = 90;

const DEV_DEPENDENCIES: &[&str] = &[
    "mypy>=1.10.1",
    "pytest-cov>=5.0.0",
    "ruff>=0.5.0",
    "mkdocs>=1.6.0",
    "mkdocstrings[python]>=0.25.1",
    "mkdocs-material>=9.5.29",
    "commitlint>=1.1.0",
];

const HTTP_TEST_CLIENT: &str = "httpx>=0.27.0";

/// Development and runtime requirements of a generated project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    pub dev: Vec<String>,
    pub runtime: Vec<String>,
}

impl DependencySet {
    pub fn for_template(template: Template) -> Self {
        let mut dev: Vec<String> = DEV_DEPENDENCIES.iter().map(|d| d.to_string()).collect();
        if template.exposes_endpoints() {
            dev.push(HTTP_TEST_CLIENT.to_string());
        }

        let runtime = match template {
            Template::Python => Vec::new(),
            Template::Flask => vec!["flask>=3.0.3".to_string(), "python-dotenv>=1.0.1".to_string()],
            Template::Fastapi => vec![
                "fastapi==0.115.6".to_string(),
                "pydantic-settings>=2.3.4".to_string(),
            ],
        };

        Self { dev, runtime }
    }
}

impl fmt::Display for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dev dependencies:")?;
        for dep in &self.dev {
            writeln!(f, "   {}", dep)?;
        }
        if !self.runtime.is_empty() {
            writeln!(f, "Dependencies:")?;
            for dep in &self.runtime {
                writeln!(f, "   {}", dep)?;
            }
        }
        Ok(())
    }
}

/// Production and development run commands for server templates
struct RunTasks {
    env_var: &'static str,
    prod: &'static str,
    dev: &'static str,
}

fn run_tasks(template: Template) -> Option<RunTasks> {
    match template {
        Template::Python => None,
        Template::Flask => Some(RunTasks {
            env_var: "FLASK_ENV",
            prod: "flask --app app run",
            dev: "flask --app app run --debug",
        }),
        Template::Fastapi => Some(RunTasks {
            env_var: "FAST_API_ENV",
            prod: "fastapi run",
            dev: "fastapi dev app/main.py",
        }),
    }
}

/// Directory measured by `pytest --cov`
pub fn coverage_root(template: Template) -> &'static str {
    match template.style() {
        TemplateStyle::Library => "src/",
        TemplateStyle::Server => "app/",
    }
}

/// Package path included in the wheel
pub fn wheel_package(identifier: &str, template: Template) -> String {
    match template.style() {
        TemplateStyle::Library => format!("src/{}", identifier),
        TemplateStyle::Server => "app".to_string(),
    }
}

/// Build the full manifest for (identifier, template)
pub fn build_document(identifier: &str, template: Template, deps: &DependencySet) -> ManifestDocument {
    let mut doc = ManifestDocument::default();
    let library = template.is_library();

    doc.push(
        Section::new(SectionKind::Metadata)
            .entry("name", Value::str(identifier))
            .entry("version", Value::str(DEFAULT_VERSION))
            .entry("description", Value::str(DEFAULT_DESCRIPTION))
            .entry("authors", Value::List(Vec::new()))
            .entry("dependencies", Value::Block(deps.runtime.clone()))
            .entry("readme", Value::str("README.md"))
            .entry("requires-python", Value::str(REQUIRES_PYTHON)),
    );

    doc.push(
        Section::new(SectionKind::ToolManager)
            .entry("managed", Value::Bool(true))
            .entry("dev-dependencies", Value::Block(deps.dev.clone())),
    );

    doc.push(scripts(template));

    doc.push(
        Section::new(SectionKind::BuildBackend)
            .entry("requires", Value::list(["hatchling"]))
            .entry("build-backend", Value::str("hatchling.build")),
    );

    doc.push(Section::new(SectionKind::Formatter).entry("docstring-code-format", Value::Bool(true)));

    if library {
        // isort ordering and unused imports
        doc.push(Section::new(SectionKind::Linter).entry("select", Value::list(["I", "F401"])));
        doc.push(
            Section::new(SectionKind::ImportOrdering)
                .entry("length-sort", Value::Bool(true))
                .entry("length-sort-straight", Value::Bool(true))
                .entry("combine-as-imports", Value::Bool(true))
                .entry("known-first-party", Value::list([identifier, "tests"])),
        );
    }

    doc.push(Section::new(SectionKind::Tests).entry("testpaths", Value::list(["tests"])));
    doc.push(Section::new(SectionKind::Coverage).entry("fail_under", Value::Int(COVERAGE_FAIL_UNDER)));
    doc.push(
        Section::new(SectionKind::PackagingMetadata)
            .entry("allow-direct-references", Value::Bool(true)),
    );
    doc.push(
        Section::new(SectionKind::Wheel)
            .entry("packages", Value::list([wheel_package(identifier, template)])),
    );

    doc
}

fn scripts(template: Template) -> Section {
    let mut section = Section::new(SectionKind::Scripts);

    if let Some(run) = run_tasks(template) {
        section = section
            .entry("prod", Value::Task(Task::cmd_with_env(run.prod, run.env_var, "production")))
            .entry("dev", Value::Task(Task::cmd_with_env(run.dev, run.env_var, "development")));
    }

    let cov = coverage_root(template);
    section = section
        .entry("test", Value::Task(Task::cmd(format!("pytest --cov={} tests/", cov))))
        .entry(
            "test-ui",
            Value::Task(Task::cmd(format!("pytest --cov={} --cov-report=html tests/", cov))),
        )
        .entry("fix", Value::Task(Task::chain(["lint:ruff", "ruff format"])))
        .entry("lint:ruff", Value::Task(Task::cmd("ruff check --fix")))
        .entry("lint", Value::Task(Task::chain(["lint:ruff", "mypy ."])));

    if template.is_library() {
        section = section.entry("docs:serve", Value::Task(Task::cmd("mkdocs serve -f mkdocs.yml")));
    }

    section
}
