pub mod ai;
pub mod config;
pub mod i18n;
pub mod locale;
pub mod prompt;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{GroqClient, GroqMessage, UpstreamError};
pub use config::{Config, ConfigLocaleStore};
pub use i18n::{Catalog, I18nState, Params, Translations};
pub use locale::Locale;
pub use session::{CancelToken, ChatSession, SubmitOutcome};
pub use state::{ChatMessage, ChatRequest, ChatRole};
