//! Application layer for medbot
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ALL_ENDPOINTS, DIFFICULTIES, Endpoint, EndpointPaths, StudyDefaults};
pub use ports::{
    medbot_gateway::{ByteStream, GatewayError, MedbotGateway, MultipartUpload},
    progress::{NoProgress, ProgressNotifier},
    storage::{KeyValueStore, MemoryStore, StorageError},
    stream_renderer::{NoRenderer, StreamRenderer},
};
pub use use_cases::chat::{ChatError, ChatRequest, ChatUseCase};
pub use use_cases::conversations::{ConversationStore, HISTORY_KEY};
pub use use_cases::preferences::{THEME_KEY, ThemePreference};
pub use use_cases::stream_assembler::{StreamAssembler, StreamError, StreamOutcome, assemble};
pub use use_cases::study::{
    ExamFeedback, ExamRequest, ExamsUseCase, ExportOutcome, FeedbackRating, FlashcardRequest,
    FlashcardSource, FlashcardsUseCase, GeneratedDeck, PlanRequest, StudyError, StudyPlanUseCase,
};
