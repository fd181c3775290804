use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use scopebridge::cli::{self, CliMode};
use scopebridge::config::ModelMode;
use scopebridge::Runtime;

#[derive(Parser)]
#[command(
    name = "scopebridge",
    version,
    about = "Route turns between an admin and a customer-facing agent"
)]
struct Cli {
    /// admin routes via the supervisor; user goes straight to the customer worker.
    #[arg(long, value_enum)]
    mode: CliMode,

    /// auto uses an online model when credentials are configured.
    #[arg(long, default_value = "auto")]
    model_mode: ModelMode,

    /// Directory holding the admin/ and docs/ sandboxes.
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Run a single turn and exit.
    #[arg(long)]
    once: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let runtime = Runtime::create(&args.base_dir, args.model_mode, None)?;

    if let Some(text) = args.once {
        let response = cli::run_turn(&runtime, args.mode, &text).await?;
        println!("{response}");
        return Ok(());
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    cli::repl::run_loop(&runtime, args.mode, stdin, tokio::io::stdout()).await?;
    Ok(())
}
