use clap::{Parser, Subcommand};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "demo-cli")]
#[command(about = "Drive the resilience demo endpoints from the command line", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Send the request this many times in sequence.
    #[arg(short, long, default_value_t = 1)]
    repeat: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unprotected probabilistic call
    Test,
    /// Probabilistic call behind the circuit breaker
    Call,
    /// Parity-alternating call behind retry and circuit breaker
    CallSync,
    /// Future-based call
    CallAsync,
    /// Callback-based call
    Callback,
    /// Service status
    Health,
    /// Circuit breaker states
    Circuits,
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::Test => "/api/test",
            Commands::Call => "/api/call",
            Commands::CallSync => "/api/callSync",
            Commands::CallAsync => "/api/callAsync",
            Commands::Callback => "/api/callback",
            Commands::Health => "/health",
            Commands::Circuits => "/admin/circuit-breakers",
        }
    }

    fn is_json(&self) -> bool {
        matches!(self, Commands::Health | Commands::Circuits)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let url = format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path());

    for i in 1..=cli.repeat.max(1) {
        let start = Instant::now();
        let res = client.get(&url).send().await?;
        let status = res.status();
        let body = res.text().await?;
        let elapsed = start.elapsed();

        if cli.command.is_json() {
            let json: serde_json::Value = serde_json::from_str(&body)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            println!("[{:>3}] {} ({} ms) {}", i, status.as_u16(), elapsed.as_millis(), body);
        }

        if !status.is_success() && !matches!(cli.command, Commands::Test) {
            eprintln!("Error: {} returned status {}", url, status);
        }
    }

    Ok(())
}
