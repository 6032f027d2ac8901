use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_page;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum SiswaCommands {
    #[command(about = "List students with optional filters")]
    List {
        #[arg(long)]
        kelas: Option<String>,
        #[arg(long)]
        jurusan: Option<String>,
        #[arg(long, help = "Match against name or NIS")]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
}

pub async fn handle(cmd: SiswaCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SiswaCommands::List {
            kelas,
            jurusan,
            search,
            page,
            limit,
        } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(kelas) = kelas {
                query.push(("kelas", kelas));
            }
            if let Some(jurusan) = jurusan {
                query.push(("jurusan", jurusan));
            }
            if let Some(search) = search {
                query.push(("search", search));
            }
            if let Some(page) = page {
                query.push(("page", page.to_string()));
            }
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }

            let body = client.get("/siswa", &query).await?;
            output_page(
                output_format,
                &body,
                "siswa",
                "total_students",
                &["id", "nis", "nama_lengkap", "kelas", "jurusan", "status"],
            )
        }
    }
}
