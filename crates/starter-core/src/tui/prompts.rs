//! Charm-style CLI prompts using cliclack

use crate::builder::{BuildObserver, BuildState, ProjectBuilder};
use crate::product::ProductConfig;
use crate::project::{ProjectSpec, Template};
use crate::runtime::check::{self, RuntimeInfo};
use crate::runtime::tool::{ToolConfig, ToolManager};
use crate::runtime::{GitInitializer, RyeInstaller};
use crate::templates::{version, TemplateBundle, TemplateSource};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project name; may be a relative or absolute path
    pub name: Option<String>,

    /// Template to use
    pub template: Option<Template>,

    /// Template directory or zip archive to use instead of the default lookup
    pub template_dir: Option<PathBuf>,

    /// Skip the git/rye availability check
    pub skip_tool_check: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the CLI with interactive prompts
///
/// A failed build is returned as a [`crate::builder::BuildFailure`] after it
/// has been reported, so callers can pick the exit code.
pub fn run<C: ProductConfig>(config: &C, args: CreateArgs, cli_version: &str) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: Advisory tool check
    if args.skip_tool_check {
        cliclack::log::info("Skipping tool check")?;
    } else {
        handle_tool_check(config, &args)?;
    }

    // Step 2: Load the template bundle
    let bundle = load_bundle(config, args.template_dir.as_deref())?;

    if let Some(warning) =
        version::check_compatibility(cli_version, &bundle.root().version, config.upgrade_command())
    {
        cliclack::log::warning(format!(
            "Version warning: {}",
            warning.lines().next().unwrap_or(&warning)
        ))?;
    }

    // Step 3: Select template
    let template = select_template(&bundle, &args)?;

    // Step 4: Project name
    let name = select_name(&args)?;
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let spec = ProjectSpec::new(&name, &cwd, template);

    // Step 5: Build
    create_project(&bundle, &spec)?;

    // Step 6: Show next steps
    print_next_steps(config, spec.target(), template)?;

    Ok(())
}

fn handle_tool_check<C: ProductConfig>(config: &C, args: &CreateArgs) -> Result<()> {
    let tools = config.required_tools();
    let infos = check::check_tools(&tools);

    for (tool, info) in tools.into_iter().zip(&infos) {
        if info.available {
            cliclack::log::success(format!("{} installed", info.summary()))?;
            continue;
        }
        handle_missing_tool(ToolManager::new(tool), info, args)?;
    }

    Ok(())
}

fn handle_missing_tool(tool: ToolManager, info: &RuntimeInfo, args: &CreateArgs) -> Result<()> {
    let display_name = tool.config().display_name;
    cliclack::log::warning(format!("{} is not installed", info.name))?;

    // In non-interactive mode, or without an installer, just continue
    if args.yes || tool.config().install_command.is_none() {
        cliclack::log::info(format!(
            "Continuing without {}. Refer to the docs for installation instructions: ({})",
            display_name,
            tool.config().docs_url
        ))?;
        return Ok(());
    }

    let action: &str = cliclack::select("What would you like to do?")
        .item("install", format!("Install {} automatically", display_name), "")
        .item(
            "docs",
            format!("Open documentation ({})", tool.config().docs_url),
            "",
        )
        .item("skip", format!("Skip and continue without {}", display_name), "")
        .interact()?;

    match action {
        "install" => install_tool(&tool)?,
        "docs" => {
            tool.open_docs()?;
            cliclack::outro(format!(
                "After installing {}, run this command again.",
                display_name
            ))?;
            std::process::exit(0);
        }
        _ => {
            cliclack::log::info(format!(
                "Continuing without {}. Refer to the docs for installation instructions: ({})",
                display_name,
                tool.config().docs_url
            ))?;
        }
    }

    Ok(())
}

fn install_tool(tool: &ToolManager) -> Result<()> {
    let ToolConfig {
        display_name,
        install_command,
        ..
    } = tool.config().clone();

    if let Some(cmd) = install_command {
        cliclack::log::info(format!("This will execute: {}", cmd))?;
    }

    let confirm: bool = cliclack::confirm("Proceed with installation?")
        .initial_value(true)
        .interact()?;

    if !confirm {
        cliclack::log::info(format!("Continuing without {}", display_name))?;
        return Ok(());
    }

    match tool.install() {
        Ok(()) => {
            cliclack::log::success(format!("{} installed successfully", display_name))?;
        }
        Err(e) => {
            cliclack::log::error(format!("{}", e))?;

            let continue_anyway: bool =
                cliclack::confirm(format!("Continue without {}?", display_name))
                    .initial_value(false)
                    .interact()?;

            if !continue_anyway {
                anyhow::bail!("Setup cancelled.");
            }
        }
    }

    Ok(())
}

fn load_bundle<C: ProductConfig>(config: &C, explicit: Option<&Path>) -> Result<TemplateBundle> {
    let source = TemplateSource::from_config(config, explicit)?;

    let spinner = cliclack::spinner();
    spinner.start("Loading templates...");

    match TemplateBundle::load(&source) {
        Ok(bundle) => {
            spinner.stop(format!("Templates loaded from {}", source.path().display()));
            Ok(bundle)
        }
        Err(e) => {
            spinner.error("Failed to load templates");
            Err(e).with_context(|| format!("Could not read {}", source.path().display()))
        }
    }
}

fn select_template(bundle: &TemplateBundle, args: &CreateArgs) -> Result<Template> {
    if let Some(template) = args.template {
        let layer = bundle.variant(template)?;
        cliclack::log::info(format!(
            "Using template: {} - {}",
            layer.manifest.name, layer.manifest.description
        ))?;
        return Ok(template);
    }

    let available: Vec<Template> = Template::ALL
        .into_iter()
        .filter(|t| bundle.root().has_template(t.id()))
        .collect();

    match available.as_slice() {
        [] => anyhow::bail!("No templates found."),
        [only] => {
            let layer = bundle.variant(*only)?;
            cliclack::log::info(format!(
                "Using template: {} - {}",
                layer.manifest.name, layer.manifest.description
            ))?;
            return Ok(*only);
        }
        _ => {}
    }

    if args.yes {
        anyhow::bail!("--template is required with --yes");
    }

    let mut select = cliclack::select("Select a template");
    for template in &available {
        let layer = bundle.variant(*template)?;
        select = select.item(
            *template,
            &layer.manifest.name,
            &layer.manifest.description,
        );
    }

    Ok(select.interact()?)
}

fn select_name(args: &CreateArgs) -> Result<String> {
    if let Some(name) = &args.name {
        cliclack::log::info(format!("Project name: {}", name))?;
        return Ok(name.clone());
    }

    if args.yes {
        anyhow::bail!("--name is required with --yes");
    }

    let name: String = cliclack::input("Project name")
        .placeholder("my-project")
        .validate(|input: &String| {
            if input.trim().is_empty() {
                Err("Please enter a project name")
            } else {
                Ok(())
            }
        })
        .interact()?;

    Ok(name)
}

/// Mirrors build progress on a spinner
struct SpinnerObserver {
    spinner: cliclack::ProgressBar,
}

impl BuildObserver for SpinnerObserver {
    fn step_started(&mut self, state: BuildState) {
        let message = match state {
            BuildState::NotStarted => "Checking target directory...",
            BuildState::Validated => "Copying template files...",
            BuildState::Composed => "Writing pyproject.toml...",
            BuildState::Configured => "Initializing git repository...",
            BuildState::VcsReady => "Installing dependencies with rye...",
            _ => return,
        };
        self.spinner.set_message(message);
    }
}

fn create_project(bundle: &TemplateBundle, spec: &ProjectSpec) -> Result<()> {
    let mut observer = SpinnerObserver {
        spinner: cliclack::spinner(),
    };
    observer
        .spinner
        .start(format!("Creating {}...", spec.identifier()));

    let builder = ProjectBuilder::new(bundle, GitInitializer::default(), RyeInstaller::default());
    let result = builder.build(spec, &mut observer);
    let spinner = observer.spinner;

    match result {
        Ok(report) => {
            spinner.stop(format!(
                "Created {} files in {}",
                report.files.len(),
                spec.target().display()
            ));
            cliclack::log::info(report.dependencies.to_string())?;
            Ok(())
        }
        Err(failure) => {
            if failure.is_validation_conflict() {
                spinner.error("Target directory is not empty");
            } else {
                spinner.error(format!("Setup failed after state '{}'", failure.reached));
            }
            cliclack::log::error(failure.to_string())?;
            if let Some(leftover) = &failure.leftover {
                cliclack::log::warning(format!(
                    "Could not clean up {}; remove it before retrying",
                    leftover.display()
                ))?;
            }
            cliclack::outro_cancel("Project was not created")?;
            Err(failure.into())
        }
    }
}

fn print_next_steps<C: ProductConfig>(config: &C, project_dir: &Path, template: Template) -> Result<()> {
    let steps = config.next_steps(project_dir, template);

    println!();
    println!("  Project created at {}", project_dir.display());
    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}
