//! Types exchanged with the mudra detection endpoint.
//!
use std::fmt;

use serde::Deserialize;

/// Body of a `/detect` response.
///
/// Every field is optional. Besides the regular prediction fields, the
/// endpoint answers plain message bodies such as `{"result": "No hand
/// detected"}` or `{"error": ...}` with status 200.
#[derive(Debug, Default, Deserialize)]
pub struct DetectResponse {
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Normalized outcome of one detection call.
///
/// A detection always carries a prediction; every other outcome is a failure
/// with a user-readable message.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectionResult {
    Detection {
        prediction: String,
        distance: Option<f64>,
        description: Option<String>,
    },
    Failure {
        error: String,
    },
}

impl DetectionResult {
    /// Failure with the given message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// Normalize a decoded response body.
    ///
    /// A body without a prediction is a failure; its message is taken from
    /// the `error` or `result` field when present.
    pub fn from_response(resp: DetectResponse) -> Self {
        match resp.prediction {
            Some(prediction) => Self::Detection {
                prediction,
                distance: resp.distance,
                description: resp.description,
            },
            None => {
                let error = resp
                    .error
                    .or(resp.result)
                    .unwrap_or_else(|| "response contained no prediction".to_owned());
                Self::Failure { error }
            }
        }
    }

    /// Whether this outcome carries a prediction.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Detection { .. })
    }

    /// Predicted label, if any.
    pub fn prediction(&self) -> Option<&str> {
        match self {
            Self::Detection { prediction, .. } => Some(prediction),
            Self::Failure { .. } => None,
        }
    }

    /// Error message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Detection { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Distance rendered to three decimal places.
    pub fn distance_display(&self) -> Option<String> {
        match self {
            Self::Detection {
                distance: Some(distance),
                ..
            } => Some(format!("{distance:.3}")),
            _ => None,
        }
    }
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detection {
                prediction,
                description,
                ..
            } => {
                write!(f, "{prediction}")?;
                if let Some(distance) = self.distance_display() {
                    write!(f, " (distance {distance})")?;
                }
                if let Some(description) = description {
                    write!(f, "\n{description}")?;
                }
                Ok(())
            }
            Self::Failure { error } => write!(f, "Error: {error}"),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::Error;

    #[test]
    fn response_with_prediction_normalizes_to_detection() -> Result<(), Error> {
        let body = r#"{"prediction":"Pataka","distance":0.1234567,"description":"The flag hand."}"#;
        let resp: DetectResponse = serde_json::from_str(body)?;

        let result = DetectionResult::from_response(resp);

        assert!(result.is_success());
        assert_eq!(result.prediction(), Some("Pataka"));
        assert_eq!(result.distance_display().as_deref(), Some("0.123"));
        assert_eq!(result.error(), None);

        Ok(())
    }

    #[test]
    fn message_bodies_normalize_to_failure() -> Result<(), Error> {
        let no_hand = r#"{"result":"No hand detected"}"#;
        let resp: DetectResponse = serde_json::from_str(no_hand)?;
        let result = DetectionResult::from_response(resp);
        assert_eq!(result.error(), Some("No hand detected"));

        let error_body = r#"{"error":"No file uploaded"}"#;
        let resp: DetectResponse = serde_json::from_str(error_body)?;
        let result = DetectionResult::from_response(resp);
        assert_eq!(result.error(), Some("No file uploaded"));

        let empty = "{}";
        let resp: DetectResponse = serde_json::from_str(empty)?;
        let result = DetectionResult::from_response(resp);
        assert!(!result.is_success());
        assert!(result.error().is_some());

        Ok(())
    }

    #[test]
    fn unknown_fields_are_tolerated() -> Result<(), Error> {
        let body = r#"{"prediction":"Ardhachandra","confidence":0.99,"frame_id":17}"#;
        let resp: DetectResponse = serde_json::from_str(body)?;

        let result = DetectionResult::from_response(resp);

        assert_eq!(result.prediction(), Some("Ardhachandra"));
        assert_eq!(result.distance_display(), None);

        Ok(())
    }

    #[test]
    fn distance_renders_three_decimals() {
        let zero = DetectionResult::Detection {
            prediction: "Pataka".to_owned(),
            distance: Some(0.0),
            description: None,
        };
        assert_eq!(zero.distance_display().as_deref(), Some("0.000"));

        let rounded = DetectionResult::Detection {
            prediction: "Pataka".to_owned(),
            distance: Some(1.0 / 3.0),
            description: None,
        };
        assert_eq!(rounded.distance_display().as_deref(), Some("0.333"));

        let failure = DetectionResult::failure("whatever");
        assert_eq!(failure.distance_display(), None);
    }

    #[test]
    fn display_formats_for_the_terminal() {
        let detection = DetectionResult::Detection {
            prediction: "Pataka".to_owned(),
            distance: Some(0.5),
            description: Some("The flag hand.".to_owned()),
        };
        let text = detection.to_string();
        assert!(text.contains("Pataka"));
        assert!(text.contains("0.500"));
        assert!(text.contains("The flag hand."));

        let failure = DetectionResult::failure("HTTP 500 - Internal Server Error");
        assert_eq!(failure.to_string(), "Error: HTTP 500 - Internal Server Error");
    }
}
