//! Source acquisition and validation
//!
//! Everything that can reject input before a single token exists lives
//! here: size limits, UTF-8 validation and file I/O.

pub mod buffer;

pub use buffer::{decode, InputError, SourceBuffer};
