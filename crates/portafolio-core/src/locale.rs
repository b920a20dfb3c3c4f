use serde::{Deserialize, Serialize};
use std::fmt;

/// Key under which the chosen locale is persisted on the client
pub const STORAGE_KEY: &str = "portfolio-locale";

/// Languages the site is translated into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    pub const DEFAULT: Locale = Locale::Es;

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }

    /// Parse a language tag by its primary subtag (`en-US`, `es_CO`, `EN`).
    /// Returns `None` for anything outside the supported set.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .trim()
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "es" => Some(Locale::Es),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    pub fn all() -> &'static [Locale] {
        &[Locale::Es, Locale::En]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Locale::Es => "Español",
            Locale::En => "English",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
