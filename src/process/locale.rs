use std::env;

/// Languages whose decimal separator is a comma, so lists use `;`.
const SEMICOLON_LANGS: [&str; 24] = [
    "bg", "ca", "cs", "da", "de", "el", "es", "et", "fi", "fr", "hr", "hu", "id", "it", "lt",
    "lv", "nb", "nl", "pl", "pt", "ro", "ru", "sv", "tr",
];

/// Source of the column delimiter for the comma-separated format.
pub trait ListSeparator {
    fn list_separator(&self) -> String;
}

impl<F: Fn() -> String> ListSeparator for F {
    fn list_separator(&self) -> String {
        self()
    }
}

/// Always the given character.
#[derive(Debug, Clone, Copy)]
pub struct FixedSeparator(pub char);

impl ListSeparator for FixedSeparator {
    fn list_separator(&self) -> String {
        self.0.to_string()
    }
}

/// Reads `DSV_LIST_SEPARATOR`, then falls back to the POSIX locale
/// variables (`LC_ALL`, `LC_NUMERIC`, `LANG`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocale;

impl ListSeparator for SystemLocale {
    fn list_separator(&self) -> String {
        resolve_separator(|key| env::var(key).ok())
    }
}

/// Separator lookup over an arbitrary variable source: a non-empty
/// `DSV_LIST_SEPARATOR` wins, otherwise the first non-empty locale variable.
pub fn resolve_separator(get: impl Fn(&str) -> Option<String>) -> String {
    if let Some(sep) = get("DSV_LIST_SEPARATOR").filter(|s| !s.is_empty()) {
        return sep;
    }
    let tag = ["LC_ALL", "LC_NUMERIC", "LANG"]
        .iter()
        .filter_map(|k| get(*k))
        .find(|v| !v.is_empty())
        .unwrap_or_default();
    separator_for_locale(&tag).to_string()
}

/// `de_DE.UTF-8` → `;`, `en_US.UTF-8` → `,`, `C`/`POSIX`/empty → `,`.
pub fn separator_for_locale(tag: &str) -> &'static str {
    let lang = tag
        .split(|c: char| matches!(c, '_' | '-' | '.' | '@'))
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    if SEMICOLON_LANGS.contains(&lang.as_str()) {
        ";"
    } else {
        ","
    }
}
