use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "flow-proxy-cli")]
#[command(about = "Management CLI for the flow-proxy sidecar", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register or update a service route
    Reconfigure {
        #[arg(long)]
        service_name: String,
        /// Comma-separated request paths
        #[arg(long)]
        service_path: Option<String>,
        /// Comma-separated domains
        #[arg(long)]
        service_domain: Option<String>,
        #[arg(long)]
        port: Option<String>,
        /// Replay the request on every sidecar replica
        #[arg(long)]
        distribute: bool,
    },
    /// Remove a service route
    Remove {
        #[arg(long)]
        service_name: String,
        #[arg(long)]
        distribute: bool,
    },
    /// Print the current rendered proxy configuration
    Config,
    /// Check sidecar liveness
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Reconfigure {
            service_name,
            service_path,
            service_domain,
            port,
            distribute,
        } => {
            let mut query = vec![("serviceName".to_string(), service_name)];
            if let Some(path) = service_path {
                query.push(("servicePath".to_string(), path));
            }
            if let Some(domain) = service_domain {
                query.push(("serviceDomain".to_string(), domain));
            }
            if let Some(port) = port {
                query.push(("port".to_string(), port));
            }
            if distribute {
                query.push(("distribute".to_string(), "true".to_string()));
            }
            let res = client
                .get(format!("{}/v1/flow-proxy/reconfigure", cli.url))
                .query(&query)
                .send()
                .await?;
            print_json_response(res).await?;
        }
        Commands::Remove {
            service_name,
            distribute,
        } => {
            let mut query = vec![("serviceName".to_string(), service_name)];
            if distribute {
                query.push(("distribute".to_string(), "true".to_string()));
            }
            let res = client
                .get(format!("{}/v1/flow-proxy/remove", cli.url))
                .query(&query)
                .send()
                .await?;
            print_json_response(res).await?;
        }
        Commands::Config => {
            let res = client
                .get(format!("{}/v1/flow-proxy/config", cli.url))
                .send()
                .await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: sidecar returned status {}", status);
                return Ok(());
            }
            println!("{}", res.text().await?);
        }
        Commands::Status => {
            let res = client.get(format!("{}/v1/test", cli.url)).send().await?;
            println!("{}", res.status());
        }
    }

    Ok(())
}

async fn print_json_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: sidecar returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
