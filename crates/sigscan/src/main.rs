use anyhow::Result;
use cli::CliApp;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "warn,sigscan=info,cli=info,scanner=info,output=info";

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the exported signatures
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match CliApp::run() {
        Ok(code) => code.exit(),
        Err(e) => match e.downcast::<clap::Error>() {
            // --help, --version and usage errors
            Ok(clap_error) => clap_error.exit(),
            Err(e) => {
                tracing::error!("{:#}", e);
                cli::ExitCode::ScanError.exit()
            }
        },
    }
}
