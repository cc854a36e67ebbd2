use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "indicator-cli")]
#[command(about = "Command-line client for the indicator document API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch any document path, e.g. `fred/gdp` or `articles`
    Get { path: String },
    /// Daily OHLC bars for a symbol
    Stock {
        symbol: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Add a newsletter subscription
    Subscribe {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Record the signup as opted in
        #[arg(long)]
        opt_in: bool,
    },
    /// Check service health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Get { path } => {
            let res = client
                .get(format!("{}/{}", base, path.trim_start_matches('/')))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Stock { symbol, from, to } => {
            let mut query = Vec::new();
            if let Some(from) = from {
                query.push(("from", from));
            }
            if let Some(to) = to {
                query.push(("to", to));
            }
            let res = client
                .get(format!("{}/stocks/daily_ohlc/{}", base, symbol))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Subscribe { name, email, opt_in } => {
            let res = client
                .post(format!("{}/subscribe", base))
                .json(&json!({ "name": name, "email": email, "subscribe": opt_in }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/healthz", base)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
