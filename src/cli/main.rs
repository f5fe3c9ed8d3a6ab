//! CLI binary entry point for odata-metadata-cli

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use odata_metadata_sdk::cli::commands::classify::handle_classify;
#[cfg(feature = "cli")]
use odata_metadata_sdk::cli::commands::inspect::handle_inspect;
#[cfg(feature = "cli")]
use odata_metadata_sdk::cli::commands::validate::{ValidateArgs, handle_validate};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "odata-metadata-cli")]
#[command(about = "Validate and inspect OData CSDL metadata documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Resolve and validate a metadata document (XML or JSON)
    Validate {
        /// Input file path, or '-' for stdin
        input: String,
        /// Report every violation instead of stopping at the first
        #[arg(long)]
        all: bool,
        /// Configuration file (defaults to ./.odata-metadata.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Report whether a document is OData V4
    Classify {
        /// Input file path, or '-' for stdin
        input: String,
    },
    /// Print a schema summary, or the resolved view of one type
    Inspect {
        /// Input file path, or '-' for stdin
        input: String,
        /// Qualified type name (namespace or alias)
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { input, all, config } => handle_validate(&ValidateArgs {
            input,
            all,
            config,
        }),
        Commands::Classify { input } => handle_classify(&input),
        Commands::Inspect { input, type_name } => handle_inspect(&input, type_name.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
