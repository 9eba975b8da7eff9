use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::json;
use std::env;

// Usage: cargo run -p threat_analyst --example client -- <report.pdf> "<question>"
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let report_path = args.next().ok_or("usage: client <report.pdf> [question]")?;
    let question = args
        .next()
        .unwrap_or_else(|| "What IPs are mentioned?".to_string());

    let client = Client::new();
    let base_url = env::var("RELAY_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

    println!("Testing threat-intel relay at {}", base_url);

    println!("\nHealth Check:");
    let health_response = client
        .get(format!("{}/api/health", base_url))
        .send()
        .await?;
    println!("Status: {}", health_response.status());

    if let Ok(key) = env::var("OPENAI_API_KEY") {
        println!("\nUpdating API key:");
        let key_response = client
            .post(format!("{}/api/key", base_url))
            .json(&json!({ "key": key }))
            .send()
            .await?;
        println!("Status: {}", key_response.status());
    }

    println!("\nUploading {}:", report_path);
    let filename = std::path::Path::new(&report_path)
        .file_name()
        .ok_or("report path has no file name")?
        .to_string_lossy()
        .to_string();
    let bytes = tokio::fs::read(&report_path).await?;
    let form = Form::new().part(
        "file",
        Part::bytes(bytes)
            .file_name(filename.clone())
            .mime_str("application/pdf")?,
    );
    let upload_response = client
        .post(format!("{}/api/upload", base_url))
        .multipart(form)
        .send()
        .await?;
    println!("Status: {}", upload_response.status());
    let upload_json: serde_json::Value = upload_response.json().await?;
    println!("Response: {}", serde_json::to_string_pretty(&upload_json)?);

    println!("\nAnalyze:");
    let analyze_response = client
        .post(format!("{}/api/analyze", base_url))
        .json(&json!({ "query": question, "filename": filename }))
        .send()
        .await?;
    println!("Status: {}", analyze_response.status());
    let analyze_json: serde_json::Value = analyze_response.json().await?;
    println!("Response: {}", serde_json::to_string_pretty(&analyze_json)?);

    Ok(())
}
