//! Generation backends for the playground pipeline.
//!
//! - [`GenerationBackend`]: the seam the pipeline calls through
//! - [`OutputSchema`]: declared output shapes, rendered for the API and used for validation
//! - [`GeminiBackend`]: the hosted Gemini implementation

pub mod backend;
pub mod gemini;
pub mod schema;

pub use backend::GenerationBackend;
pub use gemini::{GeminiBackend, GeminiConfig};
pub use schema::{OutputSchema, SchemaType};
