//! NrityaLens server binary.
//!
use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use clap::Parser;
use detect_client::{DetectClient, DEFAULT_API_BASE_URL};
use env_logger::TimestampPrecision;
use lens_server::{capture::CaptureController, endpoints, shutdown_signal, AppContext, ResultSlot};

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    /// Address to serve the dashboard on
    #[clap(long, default_value = "127.0.0.1:3000")]
    server_address: String,

    /// Base URL of the detection API
    #[clap(long, default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Video device used for live capture
    #[clap(long, default_value = "/dev/video0")]
    device: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logger
    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    log::info!("Using detection endpoint {}", &args.api_url);

    let client = DetectClient::new(args.api_url);
    let results = Arc::new(ResultSlot::new());
    let controller = CaptureController::new(args.device, client.clone(), Arc::clone(&results));
    let ctx = Arc::new(AppContext {
        controller,
        client,
        results,
    });

    // Build HTTP server with endpoints
    let app = endpoints::router(Arc::clone(&ctx));

    // Serve HTTP server
    let addr: SocketAddr = args.server_address.parse()?;
    log::info!("Serving dashboard on http://{addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the camera before exiting
    ctx.controller.stop().await;
    log::info!("Shut down");

    Ok(())
}
