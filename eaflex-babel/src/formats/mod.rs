//! Format implementations
//!
//! Each format converts between its XML text and the matching document model
//! in [`crate::ir`].

pub mod common;
pub mod eaf;
pub mod flextext;

pub use eaf::EafFormat;
pub use flextext::FlexTextFormat;
