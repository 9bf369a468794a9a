// storetree CLI entry point

use clap::Parser;
use storetree_cli::{run, Cli};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let code = run(cli).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
