//! Types surfaced to engine consumers.

mod errors;

pub use errors::{EngineError, Result};
