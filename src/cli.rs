use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uipath_project::ProjectDescriptor;

/// Environment variable consulted when `--project` is not given.
const PROJECT_ROOT_ENV: &str = "UIPATH_PROJECT_ROOT";

/// Root CLI for uipath-project
#[derive(Parser)]
#[command(name = "uipath-project")]
#[command(about = "Inspect UiPath project metadata and workflow files")]
pub struct Cli {
    /// Project directory containing project.json (default: $UIPATH_PROJECT_ROOT, then `.`)
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show name, description, version and project type
    Info {
        /// Print the full project summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List declared dependencies as `name version`
    Deps,
    /// List workflows marked private in libraryOptions
    Private,
    /// List workflow (.xaml) files
    Workflows {
        /// Include workflows in subdirectories
        #[arg(long)]
        recursive: bool,
        /// Leave out workflows marked private
        #[arg(long)]
        exclude_private: bool,
    },
    /// Print the absolute project path
    Path,
}

/// Dispatch after parse
pub fn run() {
    let cli = Cli::parse();
    let root = project_root(cli.project);

    let (label, outcome) = match cli.command {
        Commands::Info { json } => ("info", info(&root, json)),
        Commands::Deps => ("deps", deps(&root)),
        Commands::Private => ("private", private(&root)),
        Commands::Workflows {
            recursive,
            exclude_private,
        } => ("workflows", workflows(&root, recursive, exclude_private)),
        Commands::Path => ("path", path(&root)),
    };

    if let Err(e) = outcome {
        eprintln!("error ({label}): {e:#}");
        std::process::exit(1);
    }
}

fn project_root(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(PROJECT_ROOT_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn open(root: &Path) -> Result<ProjectDescriptor> {
    ProjectDescriptor::open(root)
        .with_context(|| format!("opening project at {}", root.display()))
}

fn info(root: &Path, json: bool) -> Result<()> {
    let project = open(root)?;
    if json {
        let rendered = serde_json::to_string_pretty(&project.summary())
            .context("rendering project summary")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("name: {}", project.name());
    println!("description: {}", project.description());
    println!("version: {}", project.version());
    println!(
        "type: {}",
        if project.is_library() { "library" } else { "process" }
    );
    println!("path: {}", project.project_path().display());
    Ok(())
}

fn deps(root: &Path) -> Result<()> {
    let project = open(root)?;
    for (name, version) in project.dependencies() {
        println!("{name} {version}");
    }
    Ok(())
}

fn private(root: &Path) -> Result<()> {
    let project = open(root)?;
    for workflow in project.private_workflows() {
        println!("{workflow}");
    }
    Ok(())
}

fn workflows(root: &Path, recursive: bool, exclude_private: bool) -> Result<()> {
    let project = open(root)?;
    let files = project
        .xaml_files(recursive, exclude_private)
        .context("listing workflow files")?;
    for file in files {
        println!("{}", file.display());
    }
    Ok(())
}

fn path(root: &Path) -> Result<()> {
    let project = open(root)?;
    println!("{}", project.project_path().display());
    Ok(())
}
