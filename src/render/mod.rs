//! Per-frame supervision, load-outcome caching and the session API.

/// Fingerprint-keyed cache of load outcomes.
pub mod cache;
/// Scene sessions: single frames and ranges.
pub mod session;
/// The per-frame error boundary.
pub mod supervisor;
