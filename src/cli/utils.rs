use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print the raw envelope as JSON.
pub fn output_json(body: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

/// Left-aligned table of the given columns. Missing values print as `-`.
pub fn render_table(rows: &[Value], columns: &[&str]) -> String {
    let cell = |row: &Value, col: &str| -> String {
        match &row[col] {
            Value::Null => "-".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    };

    let widths: Vec<usize> = columns
        .iter()
        .map(|col| {
            rows.iter()
                .map(|row| cell(row, col).chars().count())
                .chain(std::iter::once(col.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(columns.iter().map(|c| c.to_uppercase()).collect())];
    for row in rows {
        out.push(line(columns.iter().map(|c| cell(row, c)).collect()));
    }
    out.join("\n")
}

/// `page 2/3 (25 total)` from a list response pagination block.
pub fn pagination_summary(pagination: &Value, total_key: &str) -> String {
    format!(
        "page {}/{} ({} total)",
        pagination["current_page"],
        pagination["total_pages"],
        pagination[total_key]
    )
}

/// Print one page of a list response in the appropriate format.
pub fn output_page(
    output_format: OutputFormat,
    body: &Value,
    items_key: &str,
    total_key: &str,
    columns: &[&str],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(body),
        OutputFormat::Text => {
            let data = &body["data"];
            let rows = data[items_key].as_array().cloned().unwrap_or_default();
            if rows.is_empty() {
                println!("No {} found", items_key);
            } else {
                println!("{}", render_table(&rows, columns));
            }
            println!("{}", pagination_summary(&data["pagination"], total_key));
            Ok(())
        }
    }
}
