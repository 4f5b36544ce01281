//! Common code shared between `lens_server` and `detect_client`.
pub mod protocol;

/// Error type.
pub type Error = Box<dyn std::error::Error>;
