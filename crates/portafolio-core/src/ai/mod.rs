pub mod groq;
pub mod sse;

pub use groq::{
    build_messages, CompletionSettings, DeltaStream, GroqClient, GroqMessage, UpstreamError,
};
pub use sse::SseDecoder;
