//! Request handler module
//!
//! Responsible for request routing dispatch and static media delivery.

pub mod media;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
