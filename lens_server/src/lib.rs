//! NrityaLens dashboard server.
//!
//! Serves the landing and dashboard pages, owns the camera for live capture
//! sessions and forwards frames and uploaded images to the remote detection
//! endpoint.
pub mod capture;
pub mod endpoints;
pub mod pages;
pub mod sensors;

use std::{future::Future, io, sync::Arc};

use bytes::Bytes;
use common::protocol::DetectionResult;
use detect_client::DetectClient;
use tokio::sync::RwLock;

use crate::capture::CaptureController;

/// Shared state behind the HTTP handlers.
pub struct AppContext {
    pub controller: CaptureController,
    pub client: DetectClient,
    pub results: Arc<ResultSlot>,
}

/// Latest detection outcome.
///
/// Only one outcome is kept; each new result replaces the previous one.
#[derive(Default)]
pub struct ResultSlot {
    latest: RwLock<Option<DetectionResult>>,
}

impl ResultSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored outcome.
    pub async fn replace(&self, result: DetectionResult) {
        *self.latest.write().await = Some(result);
    }

    /// Clone of the stored outcome.
    pub async fn latest(&self) -> Option<DetectionResult> {
        self.latest.read().await.clone()
    }
}

/// Resolve once the process receives ctrl-c.
///
/// When no signal handler can be installed, the error is logged and the
/// future stays pending; the server then runs until killed.
pub async fn shutdown_signal() {
    wait_for_interrupt(tokio::signal::ctrl_c()).await
}

async fn wait_for_interrupt(ctrl_c: impl Future<Output = io::Result<()>>) {
    match ctrl_c.await {
        Ok(()) => log::info!("Shutdown requested"),
        Err(err) => {
            log::error!("Error installing shutdown signal handler: {err}");
            std::future::pending::<()>().await;
        }
    }
}

/// Wrap a JPEG so it forms one part of a `multipart/x-mixed-replace` stream.
pub fn as_jpeg_stream_item(jpeg: &[u8]) -> Bytes {
    Bytes::copy_from_slice(
        &[
            "--frame\r\nContent-Type: image/jpeg\r\n\r\n".as_bytes(),
            jpeg,
            "\r\n\r\n".as_bytes(),
        ]
        .concat(),
    )
}
