//! Client for the remote mudra detection endpoint.
pub mod client;

pub use client::{DetectClient, DEFAULT_API_BASE_URL};
