//! create-python-starter - Project scaffolding for Python libraries and web services

use anyhow::Result;
use clap::{Parser, Subcommand};
use starter_core::tui::CreateArgs;
use starter_core::{BuildFailure, ProductConfig, Template};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// create-python-starter product configuration
#[derive(Clone)]
pub struct PythonStarterConfig;

impl ProductConfig for PythonStarterConfig {
    fn name(&self) -> &'static str {
        "create-python-starter"
    }

    fn display_name(&self) -> &'static str {
        "Python Starter"
    }

    fn template_dir_env(&self) -> &'static str {
        "CREATE_PYTHON_STARTER_TEMPLATES"
    }

    fn docs_url(&self) -> &'static str {
        "https://rye.astral.sh/guide/"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for scaffolding Python library and web service projects"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install create-python-starter --force"
    }

    fn bundled_template_dir(&self) -> Option<PathBuf> {
        Some(PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../templates"
        )))
    }

    fn next_steps(&self, dir: &Path, template: Template) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: cd to directory if not current
        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }

        // Step 2: Run the tests
        steps.push("rye test".to_string());

        // Step 3: Start developing
        if template.exposes_endpoints() {
            steps.push("rye run dev".to_string());
        } else {
            steps.push("rye run docs:serve".to_string());
        }

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-python-starter")]
#[command(about = "CLI for scaffolding Python library and web service projects")]
#[command(version)]
pub struct Args {
    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new Python project
    Create(CliCreateArgs),
    /// Pack a template directory into a zip archive (for development use)
    Bundle(BundleArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Project name (relative or absolute path)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Template to use
    #[arg(short, long, value_enum)]
    pub template: Option<Template>,

    /// Template directory or .zip archive to use instead of the bundled templates
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Skip the git/rye installation check
    #[arg(long = "skip-tool-check")]
    pub skip_tool_check: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            name: args.name,
            template: args.template,
            template_dir: args.template_dir,
            skip_tool_check: args.skip_tool_check,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct BundleArgs {
    /// Template directory to pack
    #[arg(long = "template-dir")]
    pub template_dir: PathBuf,

    /// Output archive path
    #[arg(short, long, default_value = "templates.zip")]
    pub output: PathBuf,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "starter_core=debug"
    } else {
        "starter_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = PythonStarterConfig;

    match args.command {
        Some(Command::Bundle(bundle_args)) => {
            starter_core::templates::build_zip(&config, &bundle_args.template_dir, &bundle_args.output)
                .map(|_| ())
        }
        Some(Command::Create(create_args)) => {
            starter_core::run(&config, create_args.into(), CLI_VERSION)
        }
        // No subcommand provided, default to create behavior (interactive mode)
        None => starter_core::run(&config, CreateArgs::default(), CLI_VERSION),
    }
}

fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_logging(args.verbose);

    let result = run(args);

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // Build failures were already reported by the prompts
        Err(err) => match err.downcast_ref::<BuildFailure>() {
            Some(failure) if failure.is_validation_conflict() => ExitCode::from(2),
            Some(_) => ExitCode::FAILURE,
            None => {
                eprintln!("Error: {:?}", err);
                ExitCode::FAILURE
            }
        },
    }
}
