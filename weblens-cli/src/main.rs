//! weblens -- 접근 로그 분석 명령줄 도구

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 로그 레벨: CLI 플래그 > 기본값. 형식은 터미널 친화적인 pretty.
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    if let Err(e) = logging::init_tracing(log_level, "pretty") {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    weblens_core::metrics::describe_all();

    tracing::info!(config = %cli.config.display(), "weblens starting");

    let writer = OutputWriter::new(cli.output);

    let result: Result<(), CliError> = match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
