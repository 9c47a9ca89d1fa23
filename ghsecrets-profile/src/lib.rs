#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![deny(clippy::pedantic)]
#![deny(clippy::get_unwrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Encoders for aggregated stack samples.

pub mod error;
pub mod folded;
pub mod format;
pub mod pprof;
pub mod stack;

pub use error::Error;
pub use format::{write_format, Format};
pub use stack::StackCounter;
