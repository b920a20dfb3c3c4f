use crate::locale::Locale;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(RustEmbed)]
#[folder = "locales/"]
struct LocaleAssets;

/// A translation dictionary: string leaves under nested string-keyed maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Translations {
    Text(String),
    Map(BTreeMap<String, Translations>),
}

static EMPTY: Translations = Translations::Map(BTreeMap::new());

impl Translations {
    /// Walk a dotted path. Returns `None` when a segment is missing or the
    /// value at the end is not a string.
    pub fn lookup(&self, dotted_key: &str) -> Option<&str> {
        let mut node = self;
        for segment in dotted_key.split('.') {
            match node {
                Translations::Map(children) => node = children.get(segment)?,
                Translations::Text(_) => return None,
            }
        }
        match node {
            Translations::Text(text) => Some(text),
            Translations::Map(_) => None,
        }
    }

    /// Every leaf path in dotted form, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(self, String::new(), &mut keys);
        keys
    }
}

fn collect_keys(node: &Translations, prefix: String, out: &mut Vec<String>) {
    match node {
        Translations::Text(_) => out.push(prefix),
        Translations::Map(children) => {
            for (key, child) in children {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect_keys(child, path, out);
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no translation file embedded for locale '{0}'")]
    Missing(Locale),
    #[error("invalid translation file for locale '{locale}': {source}")]
    Invalid {
        locale: Locale,
        #[source]
        source: serde_json::Error,
    },
}

/// All locale dictionaries, loaded wholesale and immutable afterwards
#[derive(Debug, Clone)]
pub struct Catalog {
    dictionaries: HashMap<Locale, Translations>,
}

impl Catalog {
    /// Load the dictionaries embedded in the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        let mut sources = Vec::new();
        for &locale in Locale::all() {
            let file = LocaleAssets::get(&format!("{}.json", locale.as_str()))
                .ok_or(CatalogError::Missing(locale))?;
            sources.push((locale, String::from_utf8_lossy(file.data.as_ref()).into_owned()));
        }
        Self::from_sources(sources.iter().map(|(locale, json)| (*locale, json.as_str())))
    }

    /// Build a catalog from JSON documents. Every supported locale must be present.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (Locale, &'a str)>,
    ) -> Result<Self, CatalogError> {
        let mut dictionaries = HashMap::new();
        for (locale, json) in sources {
            let dictionary: Translations = serde_json::from_str(json)
                .map_err(|source| CatalogError::Invalid { locale, source })?;
            dictionaries.insert(locale, dictionary);
        }

        if let Some(&missing) = Locale::all().iter().find(|l| !dictionaries.contains_key(l)) {
            return Err(CatalogError::Missing(missing));
        }

        Ok(Self { dictionaries })
    }

    /// Dictionary for `locale`, falling back to the default locale's.
    pub fn load_translations(&self, locale: Locale) -> &Translations {
        self.dictionaries
            .get(&locale)
            .or_else(|| self.dictionaries.get(&Locale::DEFAULT))
            .unwrap_or(&EMPTY)
    }

    /// Dictionary for a raw language code; unsupported codes get the default.
    pub fn load_translations_for_code(&self, code: &str) -> &Translations {
        self.load_translations(Locale::from_code(code).unwrap_or_default())
    }

    /// Every loaded dictionary, keyed by locale
    pub fn preload_translations(&self) -> &HashMap<Locale, Translations> {
        &self.dictionaries
    }
}
