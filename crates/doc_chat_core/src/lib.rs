pub mod conversation;
pub mod domain;
pub mod extraction;
pub mod ports;
pub mod prompt;
pub mod session;

pub use conversation::ConversationHistory;
pub use domain::{
    CompletionResult, ConversationTurn, DocumentFormat, ExtractedText, GenerationSettings,
    LoadedDocument, Prompt, UploadedDocument,
};
pub use extraction::{DispatchOutcome, ExtractionDispatcher, UNSUPPORTED_FORMAT_MESSAGE};
pub use ports::{CompletionService, ExtractionError, PortError, PortResult, TextExtractor};
pub use prompt::{assemble_prompt, NoTruncation, PromptAssembler, RecentTurns, TruncationPolicy};
pub use session::{AskError, ChatSession, ReplacePolicy};
