//! End-to-end tool pipeline: form → validate → fetch → prompt → generate → normalize.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use playground_fetcher::DocumentFetcher;
use playground_generation::{GeminiBackend, GeminiConfig, GenerationBackend};
use playground_shared::{
    AppConfig, CompanyAnalysis, Conforming, DocumentLimits, ExtractedRecord, ExtractionMode,
    FetchedDocument, FormData, PipelineConfig, Result, ToolKind, ToolRequest, ToolResult,
};

use crate::deadline::{Stage, guarded};
use crate::input::ToolInput;
use crate::normalize;
use crate::prompt::{self, PromptSpec};
use crate::response::ToolResponse;

/// Runs tool requests against one fetcher and one generation backend.
///
/// Holds only read-only state, so a single instance can serve concurrent
/// requests.
pub struct Pipeline {
    config: PipelineConfig,
    fetcher: DocumentFetcher,
    backend: Arc<dyn GenerationBackend>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .field("model", &self.backend.model())
            .finish()
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig, backend: Arc<dyn GenerationBackend>) -> Result<Self> {
        let fetcher = DocumentFetcher::new(config.fetch.clone())?;
        Ok(Self {
            config,
            fetcher,
            backend,
        })
    }

    /// Build a pipeline backed by Gemini from the application config.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let backend = GeminiBackend::new(GeminiConfig::from_settings(&config.generation)?)?;
        Self::new(PipelineConfig::from(config), Arc::new(backend))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Structured extraction: `text` + comma-separated `fields`.
    pub async fn extract(&self, form: &FormData) -> ToolResponse {
        self.run(ToolKind::Extract, form).await
    }

    /// Social posts from the page at `url`.
    pub async fn repurpose(&self, form: &FormData) -> ToolResponse {
        self.run(ToolKind::Repurpose, form).await
    }

    /// Company analysis of the homepage at `url`.
    pub async fn scout(&self, form: &FormData) -> ToolResponse {
        self.run(ToolKind::Scout, form).await
    }

    /// Code from a request, or an explanation of code, selected by `mode`.
    pub async fn translate(&self, form: &FormData) -> ToolResponse {
        self.run(ToolKind::Translate, form).await
    }

    pub async fn run(&self, kind: ToolKind, form: &FormData) -> ToolResponse {
        self.run_with_cancel(kind, form, &CancellationToken::new()).await
    }

    /// Run one request. Never fails: every error becomes a failed [`ToolResponse`].
    pub async fn run_with_cancel(
        &self,
        kind: ToolKind,
        form: &FormData,
        token: &CancellationToken,
    ) -> ToolResponse {
        let request = ToolRequest::new(kind, form.clone());

        match self.execute(&request, token).await {
            Ok(data) => ToolResponse::ok(data),
            Err(err) => {
                warn!(
                    request_id = %request.id,
                    tool = %kind,
                    error_kind = %err.kind(),
                    error = %err,
                    "tool request failed"
                );
                ToolResponse::failure(kind, &err)
            }
        }
    }

    #[instrument(skip_all, fields(request_id = %request.id, tool = %request.kind))]
    async fn execute(&self, request: &ToolRequest, token: &CancellationToken) -> Result<ToolResult> {
        let start = Instant::now();
        let input = ToolInput::from_form(request.kind, &request.form)?;

        let result = match input {
            ToolInput::Extract { text, fields } => {
                ToolResult::Extraction(self.extract_records(&text, &fields, token).await?)
            }
            ToolInput::Repurpose { url } => {
                let doc = self.fetch(&url, &self.config.repurpose, token).await?;
                let spec = prompt::repurpose(&doc);
                ToolResult::Repurposed(self.generate_conforming(&spec, token).await?)
            }
            ToolInput::Scout { url } => {
                let doc = self.fetch(&url, &self.config.scout, token).await?;
                let spec = prompt::scout(&url, &doc);
                let analysis = self.generate_conforming::<CompanyAnalysis>(&spec, token).await?;
                debug!(rating = analysis.typed().rating, "company analyzed");
                ToolResult::Company(analysis)
            }
            ToolInput::Translate { input, mode } => {
                let spec = prompt::translation(&input, mode);
                ToolResult::Translation(self.generate_conforming(&spec, token).await?)
            }
        };

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "tool request completed"
        );

        Ok(result)
    }

    async fn fetch(
        &self,
        url: &Url,
        limits: &DocumentLimits,
        token: &CancellationToken,
    ) -> Result<FetchedDocument> {
        guarded(
            Stage::Fetch,
            limits.timeout,
            token,
            self.fetcher.fetch(url, limits),
        )
        .await
    }

    async fn extract_records(
        &self,
        text: &str,
        fields: &[String],
        token: &CancellationToken,
    ) -> Result<Vec<ExtractedRecord>> {
        let spec = prompt::extraction(text, fields);
        let deadline = self.config.generation_timeout;

        let value = match self.config.extraction_mode {
            ExtractionMode::Schema => {
                guarded(
                    Stage::Generation,
                    deadline,
                    token,
                    self.backend.generate_object(&spec.prompt, &spec.schema),
                )
                .await?
            }
            ExtractionMode::Text => {
                let raw = guarded(
                    Stage::Generation,
                    deadline,
                    token,
                    self.backend.generate_text(&spec.prompt),
                )
                .await?;
                normalize::extract_json_array(&raw)?
            }
        };

        let records = normalize::into_records(value, fields)?;
        debug!(records = records.len(), "extraction normalized");
        Ok(records)
    }

    async fn generate_conforming<T>(
        &self,
        spec: &PromptSpec,
        token: &CancellationToken,
    ) -> Result<Conforming<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = guarded(
            Stage::Generation,
            self.config.generation_timeout,
            token,
            self.backend.generate_object(&spec.prompt, &spec.schema),
        )
        .await?;

        normalize::conforming(&spec.schema, value)
    }
}
