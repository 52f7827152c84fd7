//! Transactional project builder
//!
//! Runs validation, composition, configuration and the two delegates in a
//! fixed order. Once anything may have been written, a failure removes the
//! whole target directory before the original error is handed back.

use crate::error::{ErrorKind, Result, ScaffoldError};
use crate::project::ProjectSpec;
use crate::pyproject::{self, DependencySet};
use crate::runtime::{DependencyInstaller, VersionControl};
use crate::templates::{compose, TemplateBundle};
use crate::validate::validate_target;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Progress of one build; advances strictly in declaration order up to `Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildState {
    NotStarted,
    Validated,
    Composed,
    Configured,
    VcsReady,
    DependenciesReady,
    Done,
    /// Terminal: the target directory was removed after a failure
    RolledBack,
    /// Terminal: validation failed, nothing was created
    Aborted,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BuildState::NotStarted => "not started",
            BuildState::Validated => "validated",
            BuildState::Composed => "composed",
            BuildState::Configured => "configured",
            BuildState::VcsReady => "repository initialized",
            BuildState::DependenciesReady => "dependencies installed",
            BuildState::Done => "done",
            BuildState::RolledBack => "rolled back",
            BuildState::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Hooks for progress display; every method defaults to a no-op
pub trait BuildObserver {
    /// Called when the build is about to start the step that leads out of `state`
    fn step_started(&mut self, _state: BuildState) {}

    fn state_entered(&mut self, _state: BuildState) {}

    fn dependencies_resolved(&mut self, _dependencies: &DependencySet) {}
}

impl BuildObserver for () {}

/// A finished project
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub spec: ProjectSpec,
    pub dependencies: DependencySet,
    pub files: Vec<String>,
    pub bundle_digest: String,
}

/// A failed build, after rollback when one was needed
#[derive(Debug, Error)]
#[error("{error}")]
pub struct BuildFailure {
    /// `RolledBack` or `Aborted`
    pub state: BuildState,
    /// Last state reached before the failing step
    pub reached: BuildState,
    pub error: ScaffoldError,
    /// Set when rollback could not remove the target
    pub leftover: Option<PathBuf>,
}

impl BuildFailure {
    pub fn is_validation_conflict(&self) -> bool {
        self.error.kind() == ErrorKind::ValidationConflict
    }
}

/// Builds one project from a template bundle using the given delegates
pub struct ProjectBuilder<'a, V, I> {
    bundle: &'a TemplateBundle,
    vcs: V,
    installer: I,
}

impl<'a, V: VersionControl, I: DependencyInstaller> ProjectBuilder<'a, V, I> {
    pub fn new(bundle: &'a TemplateBundle, vcs: V, installer: I) -> Self {
        Self {
            bundle,
            vcs,
            installer,
        }
    }

    pub fn build(
        &self,
        spec: &ProjectSpec,
        observer: &mut dyn BuildObserver,
    ) -> std::result::Result<BuildReport, BuildFailure> {
        let mut state = BuildState::NotStarted;

        match self.run_steps(spec, &mut state, observer) {
            Ok(report) => Ok(report),
            Err(error) => {
                let failure = self.recover(spec.target(), state, error);
                observer.state_entered(failure.state);
                Err(failure)
            }
        }
    }

    fn run_steps(
        &self,
        spec: &ProjectSpec,
        state: &mut BuildState,
        observer: &mut dyn BuildObserver,
    ) -> Result<BuildReport> {
        let target = spec.target();
        info!(
            "Creating '{}' from the {} template at {}",
            spec.identifier(),
            spec.template(),
            target.display()
        );

        observer.step_started(*state);
        validate_target(target)?;
        advance(state, BuildState::Validated, observer);

        observer.step_started(*state);
        let composed = compose(self.bundle, spec)?;
        advance(state, BuildState::Composed, observer);

        observer.step_started(*state);
        pyproject::pin_python_version(target, spec.template())?;
        let dependencies = pyproject::generate(target, spec.identifier(), spec.template())?;
        pyproject::configure_docs_descriptor(target, spec.title(), spec.template())?;
        advance(state, BuildState::Configured, observer);

        observer.step_started(*state);
        self.vcs.init(target)?;
        advance(state, BuildState::VcsReady, observer);

        observer.dependencies_resolved(&dependencies);
        observer.step_started(*state);
        self.installer.install(target, &dependencies)?;
        advance(state, BuildState::DependenciesReady, observer);

        advance(state, BuildState::Done, observer);

        Ok(BuildReport {
            spec: spec.clone(),
            dependencies,
            files: composed.files,
            bundle_digest: self.bundle.digest(),
        })
    }

    fn recover(&self, target: &Path, reached: BuildState, error: ScaffoldError) -> BuildFailure {
        match error.kind() {
            ErrorKind::ValidationConflict => {
                info!("Validation failed; nothing was created");
                BuildFailure {
                    state: BuildState::Aborted,
                    reached,
                    error,
                    leftover: None,
                }
            }
            kind => {
                warn!(
                    "{:?} failure after state '{}'; rolling back {}",
                    kind,
                    reached,
                    target.display()
                );
                BuildFailure {
                    state: BuildState::RolledBack,
                    reached,
                    error,
                    leftover: rollback(target),
                }
            }
        }
    }
}

fn advance(state: &mut BuildState, next: BuildState, observer: &mut dyn BuildObserver) {
    debug_assert!(next > *state && next <= BuildState::Done);
    debug!("Build state: {} -> {}", state, next);
    *state = next;
    observer.state_entered(next);
}

/// Remove the target tree; returns the path if it could not be removed
fn rollback(target: &Path) -> Option<PathBuf> {
    match std::fs::remove_dir_all(target) {
        Ok(()) => {
            info!("Removed {}", target.display());
            None
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            error!("Failed to remove {}: {}", target.display(), e);
            Some(target.to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Template;
    use crate::templates::manifest::RootManifest;
    use crate::templates::Layer;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn bundle() -> TemplateBundle {
        let root = RootManifest {
            version: "0.1.0".to_string(),
            common: "common".to_string(),
            templates: vec![
                "python".to_string(),
                "flask".to_string(),
                "fastapi".to_string(),
            ],
        };
        let mut layers = BTreeMap::new();
        layers.insert(
            "common".to_string(),
            Layer::new("Common", "")
                .with_file("README.md", "# Project\n")
                .with_file("tests/__init__.py", ""),
        );
        layers.insert(
            "python".to_string(),
            Layer::new("Python library", "")
                .with_file("mkdocs.yml", "site_name: placeholder\nnav: []\n")
                .with_file("src/[package]/__init__.py", ""),
        );
        layers.insert(
            "flask".to_string(),
            Layer::new("Flask", "")
                .with_file("app/__init__.py", "")
                // A directory where the manifest must go
                .with_file("pyproject.toml/keep", ""),
        );
        layers.insert(
            "fastapi".to_string(),
            Layer::new("FastAPI", "").with_file("app/main.py", ""),
        );
        TemplateBundle::from_parts(root, layers)
    }

    #[derive(Default)]
    struct FakeVcs {
        fail: bool,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl VersionControl for FakeVcs {
        fn init(&self, project_dir: &Path) -> Result<()> {
            self.calls.borrow_mut().push(project_dir.to_path_buf());
            assert!(project_dir.join("pyproject.toml").is_file());
            if self.fail {
                return Err(ScaffoldError::Delegate {
                    tool: "git",
                    hint: "install git".to_string(),
                    message: "git init failed".to_string(),
                });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeInstaller {
        fail: bool,
        seen: RefCell<Option<DependencySet>>,
    }

    impl DependencyInstaller for FakeInstaller {
        fn install(&self, _project_dir: &Path, dependencies: &DependencySet) -> Result<()> {
            *self.seen.borrow_mut() = Some(dependencies.clone());
            if self.fail {
                return Err(ScaffoldError::Delegate {
                    tool: "rye",
                    hint: "install rye".to_string(),
                    message: "rye sync failed".to_string(),
                });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        states: Vec<BuildState>,
    }

    impl BuildObserver for Recorder {
        fn state_entered(&mut self, state: BuildState) {
            self.states.push(state);
        }
    }

    fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
        let mut out: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().display().to_string();
                (rel, std::fs::read(e.path()).unwrap())
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_successful_build_walks_every_state() {
        let tmp = TempDir::new().unwrap();
        let bundle = bundle();
        let installer = FakeInstaller::default();
        let builder = ProjectBuilder::new(&bundle, FakeVcs::default(), installer);
        let spec = ProjectSpec::new("My Lib", tmp.path(), Template::Python);
        let mut recorder = Recorder::default();

        let report = builder.build(&spec, &mut recorder).unwrap();

        assert_eq!(
            recorder.states,
            vec![
                BuildState::Validated,
                BuildState::Composed,
                BuildState::Configured,
                BuildState::VcsReady,
                BuildState::DependenciesReady,
                BuildState::Done,
            ]
        );
        assert_eq!(report.dependencies, DependencySet::for_template(Template::Python));
        assert_eq!(
            builder.installer.seen.borrow().as_ref(),
            Some(&report.dependencies)
        );
        assert_eq!(builder.vcs.calls.borrow().as_slice(), &[spec.target().to_path_buf()]);
        assert_eq!(report.bundle_digest, bundle.digest());

        let target = spec.target();
        assert!(target.join("src/My_Lib/py.typed").is_file());
        assert_eq!(
            std::fs::read_to_string(target.join("mkdocs.yml")).unwrap(),
            "site_name: My Lib Documentation\nnav: []\n"
        );
        assert!(!target.join(".python-version").exists());
    }

    #[test]
    fn test_validation_conflict_aborts_without_deleting() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("taken");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("notes.txt"), "mine").unwrap();

        let bundle = bundle();
        let builder = ProjectBuilder::new(&bundle, FakeVcs::default(), FakeInstaller::default());
        let spec = ProjectSpec::new("taken", tmp.path(), Template::Fastapi);
        let mut recorder = Recorder::default();

        let failure = builder.build(&spec, &mut recorder).unwrap_err();

        assert_eq!(failure.state, BuildState::Aborted);
        assert_eq!(failure.reached, BuildState::NotStarted);
        assert!(failure.is_validation_conflict());
        assert_eq!(recorder.states, vec![BuildState::Aborted]);
        assert_eq!(std::fs::read_to_string(target.join("notes.txt")).unwrap(), "mine");
        assert!(builder.vcs.calls.borrow().is_empty());
    }

    #[test]
    fn test_compose_failure_rolls_back() {
        let tmp = TempDir::new().unwrap();
        let root = RootManifest {
            version: "0.1.0".to_string(),
            common: "common".to_string(),
            templates: vec!["python".to_string()],
        };
        let mut layers = BTreeMap::new();
        layers.insert(
            "common".to_string(),
            Layer::new("Common", "").with_file("README.md", ""),
        );
        // No placeholder directory in the library layer
        layers.insert(
            "python".to_string(),
            Layer::new("Python library", "").with_file("src/lib.py", ""),
        );
        let bundle = TemplateBundle::from_parts(root, layers);
        let builder = ProjectBuilder::new(&bundle, FakeVcs::default(), FakeInstaller::default());
        let spec = ProjectSpec::new("lib", tmp.path(), Template::Python);

        let failure = builder.build(&spec, &mut ()).unwrap_err();

        assert_eq!(failure.state, BuildState::RolledBack);
        assert_eq!(failure.reached, BuildState::Validated);
        assert_eq!(failure.error.kind(), ErrorKind::Compose);
        assert!(failure.leftover.is_none());
        assert!(!spec.target().exists());
    }

    #[test]
    fn test_manifest_failure_rolls_back() {
        let tmp = TempDir::new().unwrap();
        let bundle = bundle();
        let builder = ProjectBuilder::new(&bundle, FakeVcs::default(), FakeInstaller::default());
        let spec = ProjectSpec::new("web", tmp.path(), Template::Flask);

        let failure = builder.build(&spec, &mut ()).unwrap_err();

        assert_eq!(failure.state, BuildState::RolledBack);
        assert_eq!(failure.reached, BuildState::Composed);
        assert_eq!(failure.error.kind(), ErrorKind::Manifest);
        assert!(!spec.target().exists());
        assert!(builder.vcs.calls.borrow().is_empty());
    }

    #[test]
    fn test_vcs_failure_rolls_back() {
        let tmp = TempDir::new().unwrap();
        let bundle = bundle();
        let vcs = FakeVcs {
            fail: true,
            ..Default::default()
        };
        let builder = ProjectBuilder::new(&bundle, vcs, FakeInstaller::default());
        let spec = ProjectSpec::new("demo-api", tmp.path(), Template::Fastapi);

        let failure = builder.build(&spec, &mut ()).unwrap_err();

        assert_eq!(failure.reached, BuildState::Configured);
        assert_eq!(failure.error.kind(), ErrorKind::Delegate);
        assert!(failure.to_string().contains("git init failed"));
        assert!(!spec.target().exists());
        assert!(builder.installer.seen.borrow().is_none());
    }

    #[test]
    fn test_install_failure_rolls_back_and_retry_matches() {
        let tmp = TempDir::new().unwrap();
        let bundle = bundle();
        let spec = ProjectSpec::new("demo-api", tmp.path(), Template::Fastapi);

        let failing = ProjectBuilder::new(
            &bundle,
            FakeVcs::default(),
            FakeInstaller {
                fail: true,
                ..Default::default()
            },
        );
        let failure = failing.build(&spec, &mut ()).unwrap_err();
        assert_eq!(failure.state, BuildState::RolledBack);
        assert_eq!(failure.reached, BuildState::VcsReady);
        assert!(!spec.target().exists());

        let working = ProjectBuilder::new(&bundle, FakeVcs::default(), FakeInstaller::default());
        working.build(&spec, &mut ()).unwrap();
        let first = snapshot(spec.target());

        std::fs::remove_dir_all(spec.target()).unwrap();
        working.build(&spec, &mut ()).unwrap();
        assert_eq!(snapshot(spec.target()), first);
        assert_eq!(
            std::fs::read_to_string(spec.target().join(".python-version")).unwrap(),
            "3.12.4"
        );
    }

    #[test]
    fn test_states_are_ordered() {
        assert!(BuildState::NotStarted < BuildState::Validated);
        assert!(BuildState::DependenciesReady < BuildState::Done);
        assert_eq!(BuildState::VcsReady.to_string(), "repository initialized");
    }
}
