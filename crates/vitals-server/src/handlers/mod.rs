//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod explore;
pub mod health;
pub mod insights;
pub mod scores;

// Re-export all handlers for use in router
pub use explore::*;
pub use health::*;
pub use insights::*;
pub use scores::*;
