//! Submit a single image file to the detection endpoint.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use detect_client::{DetectClient, DEFAULT_API_BASE_URL};
use env_logger::TimestampPrecision;

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    /// Image file to submit for detection
    image: PathBuf,

    /// Base URL of the detection API
    #[clap(long, default_value = DEFAULT_API_BASE_URL)]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let image = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("reading {}", args.image.display()))?;
    let filename = args
        .image
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.jpg")
        .to_owned();

    log::info!("Submitting {filename} ({} bytes)", image.len());

    let client = DetectClient::new(args.api_url);
    let result = client.detect(image, &filename).await;

    println!("{result}");

    Ok(())
}
