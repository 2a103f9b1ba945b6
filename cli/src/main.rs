use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use service::DeployService;

mod config;
mod logging;
mod output;

#[derive(Parser, Debug)]
#[command(name = "s3deploy", version, about = "Deploy a static site to an S3 bucket")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the site, replace the bucket contents and invalidate the CDN cache
    Deploy {
        /// Deploy configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Do not run BUILD_CMD even when it is configured
        #[arg(long)]
        skip_build: bool,
    },
    /// Invalidate the configured CDN paths without deploying
    ClearCache {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the status of an earlier invalidation
    InvalidationStatus {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(long)]
        distribution_id: String,

        #[arg(long)]
        invalidation_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = logging::init_logging();

    match cli.command {
        Command::Deploy { config, skip_build } => {
            let service = DeployService::new(config::load_config(&config)?).with_skip_build(skip_build);

            let (progress_tx, progress_rx) = flume::unbounded();
            let printer = tokio::spawn(async move {
                while let Ok(event) = progress_rx.recv_async().await {
                    println!("{}", output::describe_event(&event));
                }
            });

            let result = service.deploy(Some(progress_tx)).await;
            printer.await.ok();
            let report = result?;

            println!();
            for line in output::summarize(&report) {
                println!("{}", line);
            }

            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("Deploy failed: {}", report.failed_phases().join(", "));
                Ok(ExitCode::FAILURE)
            }
        }
        Command::ClearCache { config } => {
            let service = DeployService::new(config::load_config(&config)?);
            match service.clear_cache().await? {
                Some(invalidation) => println!(
                    "Invalidation : {} - {}",
                    invalidation.id, invalidation.status
                ),
                None => println!("No CACHE configured, nothing to invalidate"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::InvalidationStatus {
            config,
            distribution_id,
            invalidation_id,
        } => {
            let service = DeployService::new(config::load_config(&config)?);
            let invalidation = service
                .invalidation_status(&distribution_id, &invalidation_id)
                .await?;
            println!(
                "Distribution : {} > Invalidation : {} - {}",
                distribution_id, invalidation.id, invalidation.status
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}
