use crate::cli::client::ApiClient;
use crate::cli::utils::output_json;
use crate::cli::OutputFormat;

/// Report `/health`. A degraded server still prints its body, then fails.
pub async fn health(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let (status, body) = client.get_raw("/health").await?;
    let data = &body["data"];

    match output_format {
        OutputFormat::Json => output_json(&body)?,
        OutputFormat::Text => {
            println!("Service:  {}", data["service"].as_str().unwrap_or("-"));
            println!("Version:  {}", data["version"].as_str().unwrap_or("-"));
            println!("Status:   {}", data["status"].as_str().unwrap_or("unknown"));
            println!("Database: {}", data["database"].as_str().unwrap_or("-"));
        }
    }

    if status != 200 {
        anyhow::bail!("server is not healthy (HTTP {})", status);
    }
    Ok(())
}
