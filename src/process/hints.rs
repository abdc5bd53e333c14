use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::trace;

/// Optional leading whitespace, an asterisk, then the annotation body.
/// The body ends at the first line break of a multi-line quoted cell.
static HINT_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\*(.*)").unwrap());

pub type Hints = BTreeMap<String, String>;

/// True when `cell` is shaped like a hint annotation.
pub fn is_hint_cell(cell: &str) -> bool {
    HINT_CELL.is_match(cell)
}

/// Parse `*key: value; flag; other: value` into a key/value map.
///
/// Segments are split on `;` and trimmed, empty ones dropped. `key: value`
/// yields the trimmed value, a bare `key` yields `"true"`, and a segment
/// with more than one `:` is ignored. Cells that are not hints give an
/// empty map.
pub fn parse_hints(cell: &str) -> Hints {
    let mut out = Hints::new();
    let Some(body) = HINT_CELL.captures(cell).and_then(|c| c.get(1)) else {
        return out;
    };

    for segment in body.as_str().split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let parts: Vec<&str> = segment.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [key, value] => {
                out.insert(key.to_string(), value.to_string());
            }
            [flag] => {
                out.insert(flag.to_string(), "true".to_string());
            }
            _ => trace!(segment, "ignoring malformed hint segment"),
        }
    }
    out
}
