//! Shared types, error model, and configuration for the playground pipeline.
//!
//! This crate is the foundation depended on by all other playground crates.
//! It provides:
//! - [`PlaygroundError`]: the unified error type and its [`ErrorKind`]
//! - Domain types ([`ToolKind`], [`FormData`], [`FetchedDocument`], [`ToolResult`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContactConfig, DocumentLimits, DocumentToolConfig, ExtractToolConfig,
    ExtractionMode, FetchConfig, GenerationConfig, PipelineConfig, ToolsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{ErrorKind, PlaygroundError, Result};
pub use types::{
    CodeTranslation, CompanyAnalysis, Conforming, ExtractedRecord, FetchedDocument, FormData,
    RepurposedContent, RequestId, ToolKind, ToolRequest, ToolResult,
};
