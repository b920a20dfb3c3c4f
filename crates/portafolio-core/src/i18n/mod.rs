//! Localization: embedded dictionaries, dotted-key resolution, locale
//! detection and the hydration-aware locale snapshot.

mod context;
mod detect;
mod resolve;
mod translations;

pub use context::{Hydration, I18nState};
pub use detect::{
    detect_initial_locale, store_locale, stored_locale, DetectionContext, LocaleStore,
    MemoryLocaleStore,
};
pub use resolve::{replace_placeholders, resolve, Params};
pub use translations::{Catalog, CatalogError, Translations};
