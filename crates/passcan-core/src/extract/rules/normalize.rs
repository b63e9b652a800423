//! Text cleanup applied before any pattern runs.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Word characters are Unicode-aware, so Cyrillic and Kazakh letters survive.
    static ref DISALLOWED: Regex = Regex::new(r"[^\w\s.,:<>()/\-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapse whitespace, replace characters outside the whitelist with a
/// space, and trim.
pub fn normalize_text(text: &str) -> String {
    let stripped = DISALLOWED.replace_all(text, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}
