use artifact_sync::cli::{self, CliError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli::main().await {
        Ok(()) => {}
        Err(CliError::Usage(usage)) => {
            println!("{}", usage);
            std::process::exit(1);
        }
        Err(e @ CliError::InvalidArguments(_)) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
