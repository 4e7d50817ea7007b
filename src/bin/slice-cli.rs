use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "slice-cli")]
#[command(about = "Command-line client for the Slice API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the service banner
    Status,
    /// List all users
    Users,
    /// Show one user
    User { id: String },
    /// Exchange credentials for an access token
    Login { email: String, password: String },
    /// Show the user an access token belongs to
    Whoami { token: String },
    /// Revoke an access token
    Logout { token: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{base}/")).send().await?,
        Commands::Users => client.get(format!("{base}/users")).send().await?,
        Commands::User { id } => {
            client
                .get(format!("{base}/users/{}", urlencoding::encode(&id)))
                .send()
                .await?
        }
        Commands::Login { email, password } => {
            client
                .post(format!("{base}/access_tokens"))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?
        }
        Commands::Whoami { token } => {
            client
                .get(format!("{base}/access_tokens/{}", urlencoding::encode(&token)))
                .send()
                .await?
        }
        Commands::Logout { token } => {
            client
                .delete(format!("{base}/access_tokens/{}", urlencoding::encode(&token)))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        eprintln!("{}", text);
        std::process::exit(1);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
