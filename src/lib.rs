//! Component-oriented markup processing and AJAX partial-update responses.
//!
//! The workspace is split into focused crates; this package only re-exports
//! them under one roof for hosts that want a single dependency.

pub use ajax;
pub use markup;
pub use tools;
