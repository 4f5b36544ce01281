//! Thin client around the `/detect` endpoint.
//!
use common::protocol::{DetectResponse, DetectionResult};
use reqwest::multipart;

/// Base URL of the detection API used when no override is given.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

/// Client for the remote detection endpoint.
///
/// One call to [`DetectClient::detect`] issues exactly one request. Transport
/// errors, non-OK statuses and undecodable bodies are all folded into the
/// returned [`DetectionResult`]; the call never returns `Err`.
#[derive(Clone)]
pub struct DetectClient {
    http: reqwest::Client,
    base_url: String,
}

impl DetectClient {
    /// Create a new instance for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Submit one image for detection and normalize the outcome.
    pub async fn detect(&self, image: Vec<u8>, filename: &str) -> DetectionResult {
        let part = multipart::Part::bytes(image).file_name(filename.to_owned());
        let form = multipart::Form::new().part("file", part);
        let url = format!("{}/detect", &self.base_url);

        let resp = match self.http.post(&url).multipart(form).send().await {
            Ok(resp) => resp,
            Err(err) => {
                log::error!("Detect request to {url} failed: {err}");
                return DetectionResult::failure(err.to_string());
            }
        };

        let status = resp.status();
        if !status.is_success() {
            log::warn!("Detect endpoint answered {status}");
            return DetectionResult::failure(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            ));
        }

        match resp.bytes().await {
            Ok(body) => normalize_ok_body(&body),
            Err(err) => DetectionResult::failure(err.to_string()),
        }
    }
}

/// Decode an OK-status body and normalize it.
fn normalize_ok_body(body: &[u8]) -> DetectionResult {
    match serde_json::from_slice::<DetectResponse>(body) {
        Ok(decoded) => DetectionResult::from_response(decoded),
        Err(err) => DetectionResult::failure(err.to_string()),
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn ok_body_with_prediction_is_a_detection() {
        let body = br#"{"prediction":"Pataka","distance":0.25}"#;
        let result = normalize_ok_body(body);
        assert_eq!(result.prediction(), Some("Pataka"));
    }

    #[test]
    fn undecodable_body_surfaces_the_decoder_message() {
        let result = normalize_ok_body(b"{");
        assert!(!result.is_success());
        let error = result.error().unwrap();
        assert!(!error.is_empty());
    }
}
