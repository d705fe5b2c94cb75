//! Browser-side stand-ins for the Tokio pieces the dispatcher uses.
//!
//! The page event loop runs every spawned future on one thread.

pub mod cancellation_token;

pub use cancellation_token::CancellationToken;
