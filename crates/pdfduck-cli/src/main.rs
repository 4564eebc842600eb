use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pdfduck_extract::Extractor;
use pdfduck_pdf_mupdf::MupdfBackend;

/// pdfduck - extract PDF tables or invoice fields as JSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a single PDF and print the result JSON to stdout
    Extract {
        /// Path to the PDF file
        file_path: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract { file_path, pretty } => {
            let backend = MupdfBackend::new();
            let extraction = Extractor::new()
                .extract(&backend, &file_path)
                .with_context(|| format!("failed to extract {}", file_path.display()))?;

            let out = serde_json::json!({ "rows": extraction });
            if pretty {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", serde_json::to_string(&out)?);
            }
        }
    }

    Ok(())
}
