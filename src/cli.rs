use std::path::{Path, PathBuf};

mod check;
mod evaluate;
mod show;
mod terminal;

use check::Check;
use clap::ArgAction;
use evaluate::Evaluate;
use pathways::Catalogue;
use show::Show;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a catalogue TOML file (defaults to the built-in field operator
    /// pathway)
    #[arg(short, long, value_name = "PATH", global = true)]
    catalogue: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let catalogue = load_catalogue(self.catalogue.as_deref())?;
        self.command.run(&catalogue)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn load_catalogue(path: Option<&Path>) -> anyhow::Result<Catalogue> {
    let catalogue = match path {
        Some(path) => Catalogue::load(path)?,
        None => Catalogue::builtin()?,
    };
    tracing::info!(
        requirements = catalogue.requirements().len(),
        certifications = catalogue.certifications().len(),
        "loaded catalogue"
    );
    Ok(catalogue)
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Evaluate every member of a roster
    Evaluate(Evaluate),

    /// Validate the catalogue
    ///
    /// Checks for duplicate names, undefined inputs and cycles.
    Check(Check),

    /// Show how a requirement or certification is defined
    Show(Show),
}

impl Command {
    fn run(self, catalogue: &Catalogue) -> anyhow::Result<()> {
        match self {
            Self::Evaluate(command) => command.run(catalogue)?,
            Self::Check(command) => command.run(catalogue)?,
            Self::Show(command) => command.run(catalogue)?,
        }
        Ok(())
    }
}
