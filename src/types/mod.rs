// Public modules
pub mod content;
pub mod generation_config;
pub mod message;
pub mod model;
pub mod request;
pub mod response;
pub mod role;

// Re-exports
pub use content::{Blob, CodeExecutionResult, Content, ExecutableCode, Part};
pub use generation_config::GenerationConfig;
pub use message::{FileRef, Message, MessageDraft, MessageId};
pub use model::{KnownModel, Model};
pub use request::{CodeExecution, GenerateContentRequest, Tool};
pub use response::{
    Candidate, FinishReason, GenerateContentResponse, PromptFeedback, UsageMetadata,
};
pub use role::Role;
