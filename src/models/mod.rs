//! Data Models
//!
//! Application-level data structures. Records shared with the remote
//! clients (`GeneratedImage`, `Post`, ...) live in `imagegen-core` and are
//! re-exported here.

pub mod response;
pub mod settings;

pub use imagegen_core::models::*;
pub use response::*;
pub use settings::*;
