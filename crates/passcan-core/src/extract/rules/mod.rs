//! Rule-based field extractors for passports and ID cards.

pub mod dates;
pub mod gender;
pub mod iin;
pub mod normalize;
pub mod patterns;

pub use dates::{
    ChronologicalOrder, DateCandidate, DateDisambiguator, DateExtractor, DateShape, assign_dates,
    classify_context,
};
pub use gender::{extract_gender, normalize_gender};
pub use iin::{IinExtractor, extract_iin, validate_iin};
pub use normalize::normalize_text;
pub use patterns::DocumentField;

use regex::{Captures, Regex};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// One entry of a field cascade: a pattern and the capture group holding
/// the value.
///
/// A rule may also name a `skip_group`: matches where that group took part
/// are passed over and the scan continues with the next match.
#[derive(Debug)]
pub struct FieldRule {
    pub pattern: Regex,
    pub group: usize,
    pub skip_group: Option<usize>,
}

impl FieldRule {
    /// Rule whose value is the given capture group.
    pub fn new(pattern: &str, group: usize) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            group,
            skip_group: None,
        }
    }

    /// Rule that ignores every match in which `skip_group` participated.
    pub fn excluding(pattern: &str, group: usize, skip_group: usize) -> Self {
        Self {
            skip_group: Some(skip_group),
            ..Self::new(pattern, group)
        }
    }

    /// Rule whose value is the whole match.
    pub fn whole(pattern: &str) -> Self {
        Self::new(pattern, 0)
    }

    /// Apply the rule, returning the trimmed value if it is non-empty.
    pub fn apply<'t>(&self, text: &'t str) -> Option<&'t str> {
        match self.skip_group {
            None => self.pattern.captures(text).and_then(|caps| self.value(&caps)),
            Some(skip) => self
                .pattern
                .captures_iter(text)
                .filter(|caps| caps.get(skip).is_none())
                .find_map(|caps| self.value(&caps)),
        }
    }

    fn value<'t>(&self, caps: &Captures<'t>) -> Option<&'t str> {
        caps.get(self.group)
            .map(|m| m.as_str().trim())
            .filter(|v| !v.is_empty())
    }
}

/// Try `rules` in order and return the first value found.
pub fn first_match<'t>(rules: &[FieldRule], text: &'t str) -> Option<&'t str> {
    rules.iter().find_map(|rule| rule.apply(text))
}

/// Like [`first_match`], but a candidate only counts if `accept` maps it to
/// a value. Rejected candidates let the cascade continue.
pub fn first_accepted<T>(
    rules: &[FieldRule],
    text: &str,
    accept: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    rules
        .iter()
        .filter_map(|rule| rule.apply(text))
        .find_map(accept)
}
