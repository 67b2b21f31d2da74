//! API request handlers.

/// Job submission, root and health handlers.
pub mod news;
/// Stored report handlers.
pub mod reports;
/// WebSocket progress handler.
pub mod status;
