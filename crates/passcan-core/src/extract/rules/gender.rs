//! Gender normalization.

use crate::models::document::Gender;

use super::first_accepted;
use super::patterns::DocumentField;

const MALE_TOKENS: &[&str] = &["m", "male", "м", "муж", "мужской", "ер"];
const FEMALE_TOKENS: &[&str] = &["f", "female", "ж", "жен", "женский", "әйел"];

/// Map a recognized token to a gender code. Unknown tokens give `None`.
pub fn normalize_gender(token: &str) -> Option<Gender> {
    let token = token.trim().to_lowercase();
    if MALE_TOKENS.contains(&token.as_str()) {
        Some(Gender::Male)
    } else if FEMALE_TOKENS.contains(&token.as_str()) {
        Some(Gender::Female)
    } else {
        None
    }
}

/// Find a gender label and normalize the token that follows it.
pub fn extract_gender(text: &str) -> Option<Gender> {
    first_accepted(DocumentField::Gender.rules(), text, normalize_gender)
}
