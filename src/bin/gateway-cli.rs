use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the transaction gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: Url,

    /// Correlation id to send; a random UUID is used when omitted.
    #[arg(short, long)]
    request_id: Option<String>,

    /// Must match `routes.health` of the gateway config.
    #[arg(long, default_value = "/health")]
    health_route: String,

    /// Must match `routes.broadcast` of the gateway config.
    #[arg(long, default_value = "/transactions")]
    broadcast_route: String,

    /// Must match `routes.status` of the gateway config.
    #[arg(long, default_value = "/transactions/{tx_hash}")]
    status_route: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// Broadcast a transaction and wait for its status
    Broadcast {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        price: u64,
        /// Unix seconds or milliseconds
        #[arg(long)]
        timestamp: u64,
    },
    /// Look up the current status of a transaction
    Status { tx_hash: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let request_id = cli
        .request_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut headers = HeaderMap::new();
    headers.insert("x-request-id", HeaderValue::from_str(&request_id)?);

    match cli.command {
        Commands::Health => {
            let res = client
                .get(endpoint(&cli.url, &cli.health_route, None)?)
                .send()
                .await?;
            let status = res.status();
            println!("{} {}", status, res.text().await?);
        }
        Commands::Broadcast {
            symbol,
            price,
            timestamp,
        } => {
            let res = client
                .post(endpoint(&cli.url, &cli.broadcast_route, None)?)
                .headers(headers)
                .json(&json!({ "symbol": symbol, "price": price, "timestamp": timestamp }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status { tx_hash } => {
            let res = client
                .get(endpoint(&cli.url, &cli.status_route, Some(&tx_hash))?)
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Join `route` onto `base`, filling the `{tx_hash}` segment with an escaped hash.
fn endpoint(base: &Url, route: &str, tx_hash: Option<&str>) -> Result<Url, String> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| format!("'{}' cannot be used as a base url", base))?;
        segments.pop_if_empty();
        for segment in route.split('/').filter(|s| !s.is_empty()) {
            match (segment, tx_hash) {
                ("{tx_hash}", Some(hash)) => segments.push(hash),
                ("{tx_hash}", None) => return Err(format!("route '{}' needs a tx_hash", route)),
                _ => segments.push(segment),
            };
        }
    }
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(id) = res.headers().get("x-request-id") {
        eprintln!("X-Request-ID: {}", id.to_str().unwrap_or("<non-ascii>"));
    }
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
