use super::Translations;

/// Named values substituted into `{name}` placeholders, applied in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.entries.push((name.into(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a dotted key against a dictionary.
///
/// A missing key resolves to the key itself, so gaps show up on screen
/// instead of failing.
pub fn resolve(dictionary: &Translations, dotted_key: &str, params: Option<&Params>) -> String {
    let text = dictionary.lookup(dotted_key).unwrap_or(dotted_key);
    match params {
        Some(params) => replace_placeholders(text, params),
        None => text.to_string(),
    }
}

/// Replace every `{name}` with its value; placeholders without a value stay.
pub fn replace_placeholders(text: &str, params: &Params) -> String {
    params
        .entries
        .iter()
        .fold(text.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), value)
        })
}
