//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{init_logging, Output, OutputFormat};
use super::{group, item, merge, pack, query};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "facepack")]
#[command(author, version, about = "Ordered face registry for character image packs")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new facepack project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage packs
    #[command(subcommand)]
    Pack(pack::PackCommands),

    /// Manage groups (characters) inside a pack
    #[command(subcommand)]
    Group(group::GroupCommands),

    /// Manage items (faces) inside a group
    #[command(subcommand)]
    Item(item::ItemCommands),

    /// Look up an item by `group/item` path
    Get {
        /// Pack ID
        pack: String,

        /// Item path, e.g. `Alice/happy`
        path: String,
    },

    /// Order groups or items by their after/before links
    Order {
        /// Pack ID
        pack: String,

        /// Order the items of this group instead of the groups
        #[arg(long, short)]
        group: Option<String>,

        /// Write the result back as spaced priorities
        #[arg(long)]
        apply: bool,

        /// Fail on cycles or dangling links
        #[arg(long)]
        strict: bool,
    },

    /// Union several packs into a new pack
    Merge {
        /// ID of the pack to create
        output: String,

        /// Packs to merge; the first one supplies pack metadata
        #[arg(required = true)]
        packs: Vec<String>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load()
            .map(|config| config.global.default_format.into())
            .unwrap_or_default(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("facepack starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .facepack directory at: {}", project.data_dir().display()),
            );
            output.success(&format!(
                "Initialized facepack project at {}",
                project.root().display()
            ));
        }

        Commands::Pack(cmd) => pack::run(cmd, &output)?,
        Commands::Group(cmd) => group::run(cmd, &output)?,
        Commands::Item(cmd) => item::run(cmd, &output)?,

        Commands::Get { pack, path } => {
            output.verbose_ctx("get", &format!("Resolving {} in pack {}", path, pack));
            query::get(&output, &pack, &path)?
        }

        Commands::Order {
            pack,
            group,
            apply,
            strict,
        } => {
            output.verbose_ctx(
                "order",
                &format!(
                    "Ordering pack {} (group={:?}, apply={}, strict={})",
                    pack, group, apply, strict
                ),
            );
            query::order(&output, &pack, group.as_deref(), apply, strict)?
        }

        Commands::Merge {
            output: target,
            packs,
        } => merge::run(&output, &target, &packs)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
