use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

pub async fn login(
    client: &ApiClient,
    username: &str,
    password: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let body = client
        .post("/auth/login", &json!({ "username": username, "password": password }))
        .await?;

    let data = &body["data"];
    let token = data["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("login response carried no token"))?;

    match output_format {
        OutputFormat::Json => output_success(output_format, "Login berhasil", Some(data.clone())),
        OutputFormat::Text => {
            eprintln!(
                "Logged in as {} ({})",
                data["user"]["username"].as_str().unwrap_or(username),
                data["user"]["role"].as_str().unwrap_or("-")
            );
            // stdout carries only the token so `export JURNAL_TOKEN=$(jurnal login ...)` works
            println!("{}", token);
            Ok(())
        }
    }
}
