mod cli;
mod render;
mod walkthrough;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use cli::Cli;

fn main() -> ExitCode {
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the level; defaults to WARN.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "starting walkthrough");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match walkthrough::run(&cli, &mut out).and_then(|()| out.flush()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "failed to write walkthrough");
            ExitCode::FAILURE
        }
    }
}
