use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "doorman", about = "Doorman presence notification CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report a recognition snapshot to the daemon
    Report {
        /// Identity labels visible in the frame (omit for an empty frame)
        labels: Vec<String>,
    },
    /// Show daemon status
    Status,
}

#[zbus::proxy(
    interface = "org.sovren.Doorman1",
    default_service = "org.sovren.Doorman1",
    default_path = "/org/sovren/Doorman1"
)]
trait Doorman {
    async fn report_presence(&self, labels: Vec<String>) -> zbus::Result<String>;
    async fn status(&self) -> zbus::Result<String>;
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let conn = zbus::Connection::session().await?;
    let proxy = DoormanProxy::new(&conn).await?;

    match cli.command {
        Commands::Report { labels } => {
            let report = proxy.report_presence(labels).await?;
            println!("{}", pretty(&report));
        }
        Commands::Status => {
            let status = proxy.status().await?;
            println!("{}", pretty(&status));
        }
    }

    Ok(())
}

/// Pretty-print a JSON reply, falling back to the raw string if the
/// daemon ever returns something unparseable.
fn pretty(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| raw.to_string())
}
