/// Levelr - batch loudness normalization
use clap::Parser;
use levelr_cli::{
    cli::{Cli, Commands},
    commands::{self, TrackOptions},
    config::AppConfig,
};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "levelr=info,levelr_cli=info,levelr_batch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Categories {
            categories,
            output,
            format,
            archive,
        } => {
            let summary =
                commands::run_categories(&config, &categories, output.clone(), format, archive)
                    .await?;
            println!("{}", commands::status_line(&summary, &output));
        }
        Commands::Tracks {
            source,
            output,
            platform,
            lufs,
            peak,
            premaster,
            format,
            archive,
        } => {
            let options = TrackOptions {
                source,
                output,
                platform,
                lufs,
                peak,
                premaster,
                format,
                archive,
            };
            let summary = commands::run_tracks(&config, &options).await?;
            println!("{}", commands::status_line(&summary, &options.output));
        }
        Commands::Presets => commands::list_presets(&config),
    }

    Ok(())
}
