use clap::Parser;
use health_check::report::{print_header, print_verdict};
use health_check::{
    candidate_hosts, detect_local_ip, Diagnostic, DiagnosticSettings, ReqwestTransport,
    DEFAULT_PORT,
};
use std::process::ExitCode;
use std::time::Duration;

/// Find a running plant care relay and check it end to end.
#[derive(Parser, Debug)]
#[command(name = "health-check")]
#[command(about = "Find a running plant care relay and check it end to end", long_about = None)]
struct Cli {
    /// Extra host to try before the built-in candidates
    #[arg(long)]
    host: Option<String>,

    /// Port the relay listens on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Timeout for `/` and `/test` probes, in seconds
    #[arg(long, default_value = "5")]
    probe_timeout_secs: u64,

    /// Timeout for the chat probe, in seconds
    #[arg(long, default_value = "30")]
    chat_timeout_secs: u64,

    /// Message sent to `/chat`
    #[arg(long, default_value = health_check::chat::SAMPLE_MESSAGE)]
    message: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Diagnostic run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let local_ip = detect_local_ip().to_string();
    let mut out = std::io::stdout();
    print_header(&mut out, &local_ip)?;

    let hosts = candidate_hosts(&local_ip, cli.host.as_deref());

    let settings = DiagnosticSettings {
        port: cli.port,
        probe_timeout: Duration::from_secs(cli.probe_timeout_secs),
        chat_timeout: Duration::from_secs(cli.chat_timeout_secs),
        message: cli.message,
    };

    let diagnostic = Diagnostic::new(ReqwestTransport::new()?, settings);

    let verdict = diagnostic.run(&hosts, &mut out).await?;
    print_verdict(&mut out, &verdict, cli.port, &local_ip)?;

    Ok(verdict.overall_success)
}
