use clap::{Args, Subcommand};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_json, output_page};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum JurnalCommands {
    #[command(about = "List journal entries, newest first")]
    List(JurnalListArgs),
}

#[derive(Args, Debug, Default)]
pub struct JurnalListArgs {
    #[arg(long, help = "Student id")]
    pub siswa_id: Option<String>,
    #[arg(long, help = "One of the 7 kebiasaan")]
    pub kebiasaan: Option<String>,
    #[arg(long, help = "Earliest date, YYYY-MM-DD")]
    pub from: Option<String>,
    #[arg(long, help = "Latest date, YYYY-MM-DD")]
    pub to: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
}

impl JurnalListArgs {
    /// Query pairs in the names the `/jurnal` endpoint reads.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                query.push((key, value));
            }
        };
        push("siswa_id", self.siswa_id.clone());
        push("kebiasaan", self.kebiasaan.clone());
        push("tanggal_mulai", self.from.clone());
        push("tanggal_selesai", self.to.clone());
        push("page", self.page.map(|p| p.to_string()));
        push("limit", self.limit.map(|l| l.to_string()));
        query
    }
}

pub async fn handle(cmd: JurnalCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        JurnalCommands::List(args) => {
            let body = client.get("/jurnal", &args.query()).await?;
            output_page(
                output_format,
                &body,
                "entries",
                "total_entries",
                &["tanggal", "nama_siswa", "kelas", "kebiasaan", "nilai_karakter", "status"],
            )
        }
    }
}

pub async fn kebiasaan(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = client.get("/jurnal/kebiasaan", &[]).await?;
    match output_format {
        OutputFormat::Json => output_json(&body),
        OutputFormat::Text => {
            let habits = body["data"]["kebiasaan"].as_array().cloned().unwrap_or_default();
            for (i, habit) in habits.iter().enumerate() {
                println!("{}. {}", i + 1, habit.as_str().unwrap_or("-"));
            }
            Ok(())
        }
    }
}
