pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use client::ApiClient;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(name = "jurnal")]
#[command(about = "Jurnal CLI - Command-line client for the Jurnal Digital API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "JURNAL_API_URL", default_value = DEFAULT_API_URL, help = "API base URL")]
    pub url: String,

    #[arg(long, global = true, env = "JURNAL_TOKEN", hide_env_values = true, help = "Bearer token for protected endpoints")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Check server health status from API /health endpoint")]
    Health,

    #[command(about = "Login and print a session token")]
    Login {
        #[arg(help = "Username or email")]
        username: String,
        #[arg(long, env = "JURNAL_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "List the 7 Kebiasaan Anak Indonesia Hebat")]
    Kebiasaan,

    #[command(about = "Student records")]
    Siswa {
        #[command(subcommand)]
        cmd: commands::siswa::SiswaCommands,
    },

    #[command(about = "Journal entries")]
    Jurnal {
        #[command(subcommand)]
        cmd: commands::jurnal::JurnalCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.url, cli.token.clone())?;

    match cli.command {
        Commands::Health => commands::server::health(&client, output_format).await,
        Commands::Login { username, password } => {
            commands::auth::login(&client, &username, &password, output_format).await
        }
        Commands::Kebiasaan => commands::jurnal::kebiasaan(&client, output_format).await,
        Commands::Siswa { cmd } => commands::siswa::handle(cmd, &client, output_format).await,
        Commands::Jurnal { cmd } => commands::jurnal::handle(cmd, &client, output_format).await,
    }
}
