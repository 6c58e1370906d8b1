//! Tool pipeline orchestration and domain logic for the playground.
//!
//! This crate ties together input validation, document retrieval, prompt
//! composition, schema-constrained generation and result normalization
//! into one call per tool (see [`Pipeline`]). It also hosts the contact
//! relay ([`ContactRelay`]).

pub mod contact;
mod deadline;
pub mod input;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod response;

pub use contact::{ContactForm, ContactRelay, ContactState, InquiryType};
pub use input::{ToolInput, TranslateMode};
pub use pipeline::Pipeline;
pub use prompt::PromptSpec;
pub use response::{ToolResponse, user_message};
