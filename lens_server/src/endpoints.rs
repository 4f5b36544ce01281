//! Endpoints of the dashboard HTTP server.
//!
use std::sync::Arc;

use axum::{
    body::StreamBody,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart},
    http::header,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Extension, Router,
};
use common::protocol::DetectionResult;
use tokio_stream::wrappers::BroadcastStream;

use crate::{pages, AppContext};

/// Build the application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/dash", get(dashboard))
        .route("/stream", get(live_stream))
        .route("/result", get(latest_result))
        .route("/record", post(toggle_record))
        .route("/upload", post(upload))
        .route("/healthcheck", get(healthcheck))
        // Uploads pass through at any size; validating them is left to the
        // detection endpoint
        .layer(DefaultBodyLimit::disable())
        .layer(Extension(ctx))
}

/// Health check endpoint.
pub async fn healthcheck() -> &'static str {
    "healthy"
}

async fn landing() -> Html<&'static str> {
    Html(pages::LANDING_HTML)
}

async fn dashboard(Extension(ctx): Extension<Arc<AppContext>>) -> Html<String> {
    let recording = ctx.controller.is_recording().await;
    Html(pages::dashboard_page(recording))
}

async fn latest_result(Extension(ctx): Extension<Arc<AppContext>>) -> Html<String> {
    let recording = ctx.controller.is_recording().await;
    let result = ctx.results.latest().await;
    Html(pages::result_fragment(recording, result.as_ref()))
}

/// Flip the recording session and return to the dashboard.
async fn toggle_record(Extension(ctx): Extension<Arc<AppContext>>) -> Redirect {
    let recording = ctx.controller.toggle().await;
    log::debug!(
        "Recording toggled, now {}",
        if recording { "on" } else { "off" }
    );
    Redirect::to("/dash")
}

/// Live view of the running capture session.
async fn live_stream(Extension(ctx): Extension<Arc<AppContext>>) -> impl IntoResponse {
    log::info!("Live stream requested");

    // Subscribe to the broadcasted view frames
    let rx = ctx.controller.subscribe_view();
    let stream = BroadcastStream::from(rx);

    // Set body and headers for multipart streaming
    let body = StreamBody::new(stream);
    let headers = [(
        header::CONTENT_TYPE,
        "multipart/x-mixed-replace; boundary=frame",
    )];

    (headers, body)
}

/// Receive one uploaded image, submit it for detection and return to the
/// dashboard showing the outcome.
async fn upload(
    Extension(ctx): Extension<Arc<AppContext>>,
    mut multipart: Multipart,
) -> Redirect {
    let outcome = match read_upload(&mut multipart).await {
        Ok(Some((filename, image))) => {
            log::info!("Upload received: {filename} ({} bytes)", image.len());
            ctx.client.detect(image, &filename).await
        }
        Ok(None) => {
            log::warn!("Upload request without a file field");
            DetectionResult::failure("No file uploaded")
        }
        Err(err) => {
            log::warn!("Error reading upload: {err}");
            DetectionResult::failure(err.to_string())
        }
    };

    ctx.results.replace(outcome).await;
    Redirect::to("/dash")
}

/// First `file` field of the form, if any.
async fn read_upload(
    multipart: &mut Multipart,
) -> Result<Option<(String, Vec<u8>)>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_owned)
            .unwrap_or_else(|| "upload.jpg".to_owned());
        let image = field.bytes().await?.to_vec();
        return Ok(Some((filename, image)));
    }

    Ok(None)
}
