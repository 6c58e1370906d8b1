//! Generation backend trait.

use async_trait::async_trait;
use serde_json::Value;

use playground_shared::Result;

use crate::schema::OutputSchema;

/// A hosted text-generation API.
///
/// Implementations make exactly one outbound request per call and never
/// retry. Failures are reported as `PlaygroundError::Generation`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Provider name for tracing.
    fn name(&self) -> &str;

    /// Model identifier in use.
    fn model(&self) -> &str;

    /// Schema-constrained generation: the backend is asked to return JSON
    /// matching `schema`. The caller still validates the result.
    async fn generate_object(&self, prompt: &str, schema: &OutputSchema) -> Result<Value>;

    /// Free-text generation.
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}
