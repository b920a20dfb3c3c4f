use super::detect::{detect_initial_locale, store_locale, DetectionContext, LocaleStore};
use super::resolve::{resolve, Params};
use super::{Catalog, Translations};
use crate::locale::Locale;
use std::sync::Arc;

/// Whether client-side locale detection has run yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    Unhydrated,
    Hydrated,
}

/// Snapshot of the active locale handed to everything that renders text.
///
/// The dictionary is always derived from the locale, so the two cannot drift.
/// Transitions return a new snapshot instead of mutating a shared one.
#[derive(Debug, Clone)]
pub struct I18nState {
    catalog: Arc<Catalog>,
    locale: Locale,
    hydration: Hydration,
    // An explicitly provided initial locale is never overridden by detection
    pinned: bool,
}

impl I18nState {
    /// Starts on the default locale so the first render is the same everywhere.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            locale: Locale::DEFAULT,
            hydration: Hydration::Unhydrated,
            pinned: false,
        }
    }

    pub fn with_initial_locale(catalog: Arc<Catalog>, locale: Locale) -> Self {
        Self {
            catalog,
            locale,
            hydration: Hydration::Unhydrated,
            pinned: true,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn translations(&self) -> &Translations {
        self.catalog.load_translations(self.locale)
    }

    pub fn hydration(&self) -> Hydration {
        self.hydration
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydration == Hydration::Hydrated
    }

    /// Run detection once after the first render. Later calls are no-ops.
    #[must_use]
    pub fn hydrate(&self, context: &DetectionContext<'_>) -> Self {
        if self.is_hydrated() {
            return self.clone();
        }

        let locale = if self.pinned {
            self.locale
        } else {
            detect_initial_locale(context)
        };
        if let Some(store) = context.store() {
            store_locale(store, locale);
        }

        Self {
            locale,
            hydration: Hydration::Hydrated,
            ..self.clone()
        }
    }

    /// Explicit locale selection. Persisted once hydrated.
    #[must_use]
    pub fn set_locale(&self, locale: Locale, store: Option<&dyn LocaleStore>) -> Self {
        if self.is_hydrated() {
            if let Some(store) = store {
                store_locale(store, locale);
            }
        }
        Self {
            locale,
            ..self.clone()
        }
    }

    /// Like [`set_locale`](Self::set_locale) for a raw code; unsupported codes are ignored.
    #[must_use]
    pub fn set_locale_code(&self, code: &str, store: Option<&dyn LocaleStore>) -> Self {
        match Locale::from_code(code) {
            Some(locale) => self.set_locale(locale, store),
            None => self.clone(),
        }
    }

    /// Translate a dotted key in the active locale
    pub fn t(&self, key: &str) -> String {
        resolve(self.translations(), key, None)
    }

    pub fn t_with(&self, key: &str, params: &Params) -> String {
        resolve(self.translations(), key, Some(params))
    }
}
