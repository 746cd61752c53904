//! # PK_OS Common
//!
//! Shared types, errors, and constants used across PK_OS components.
//!
//! ## Modules
//! - `types` - Mission model, file system nodes, themes, ROT13
//! - `error` - Common error types
//! - `constants` - Timer intervals, defaults, and store keys

pub mod constants;
pub mod error;
pub mod types;

pub use error::PkosError;
pub use types::*;
