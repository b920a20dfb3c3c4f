use crate::locale::Locale;
use anyhow::{anyhow, Result};
use std::sync::Mutex;
use tracing::debug;

/// Somewhere the visitor's locale choice survives between sessions
pub trait LocaleStore: Send + Sync {
    /// The raw stored value, if any. Read failures count as "nothing stored".
    fn load(&self) -> Option<String>;

    fn save(&self, locale: Locale) -> Result<()>;
}

/// Where locale detection is running
pub enum DetectionContext<'a> {
    /// Non-interactive rendering: there is no visitor to detect anything from
    Server,
    Interactive {
        store: &'a dyn LocaleStore,
        /// Language reported by the runtime environment, e.g. `en-US`
        environment_language: Option<String>,
    },
}

impl<'a> DetectionContext<'a> {
    /// Interactive context using the operating system's language preference.
    pub fn interactive(store: &'a dyn LocaleStore) -> Self {
        DetectionContext::Interactive {
            store,
            environment_language: sys_locale::get_locale(),
        }
    }

    pub fn store(&self) -> Option<&'a dyn LocaleStore> {
        match self {
            DetectionContext::Server => None,
            DetectionContext::Interactive { store, .. } => Some(*store),
        }
    }
}

/// Previously stored locale. Only an exact supported code counts.
pub fn stored_locale(store: &dyn LocaleStore) -> Option<Locale> {
    let code = store.load()?;
    Locale::all().iter().copied().find(|locale| locale.as_str() == code)
}

/// Stored preference, then environment language, then the default.
pub fn detect_initial_locale(context: &DetectionContext<'_>) -> Locale {
    match context {
        DetectionContext::Server => Locale::DEFAULT,
        DetectionContext::Interactive {
            store,
            environment_language,
        } => stored_locale(*store)
            .or_else(|| environment_language.as_deref().and_then(Locale::from_code))
            .unwrap_or(Locale::DEFAULT),
    }
}

/// Persist the locale choice. Storage problems never reach the caller.
pub fn store_locale(store: &dyn LocaleStore, locale: Locale) {
    if let Err(e) = store.save(locale) {
        debug!(%locale, error = %e, "could not persist locale");
    }
}

/// In-process store, mostly useful for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryLocaleStore {
    value: Mutex<Option<String>>,
}

impl MemoryLocaleStore {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: Mutex::new(Some(value.to_string())),
        }
    }
}

impl LocaleStore for MemoryLocaleStore {
    fn load(&self) -> Option<String> {
        self.value.lock().ok().and_then(|v| v.clone())
    }

    fn save(&self, locale: Locale) -> Result<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| anyhow!("locale store lock poisoned"))?;
        *value = Some(locale.as_str().to_string());
        Ok(())
    }
}
