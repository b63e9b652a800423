//! Date extraction and birth/issue/expiry disambiguation.
//!
//! Dates are kept as the text that matched. A date is classified by the
//! keyword nearest to it in a window of surrounding characters; dates left
//! over are handed to a [`DateDisambiguator`], by default
//! [`ChronologicalOrder`].

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};

use super::FieldExtractor;
use super::patterns::{
    BIRTH_KEYWORDS, DATE_DAY_MONTH_NAME, DATE_DMY, DATE_YMD, EXPIRY_KEYWORDS, ISSUE_KEYWORDS,
};
use crate::error::ExtractionError;
use crate::models::document::{DateRole, DocumentDataBuilder};

/// Shape of a matched date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// `DD.MM.YYYY`, `DD/MM/YYYY` or `DD-MM-YYYY`.
    DayMonthYear,
    /// `YYYY.MM.DD`, `YYYY/MM/DD` or `YYYY-MM-DD`.
    YearMonthDay,
    /// `DD Mon YYYY` with an English month abbreviation.
    DayMonthNameYear,
}

/// A date-shaped string found in the text, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCandidate {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub shape: DateShape,
    year: String,
    month: String,
    day: String,
}

impl DateCandidate {
    fn from_captures(caps: &regex::Captures<'_>, shape: DateShape) -> Option<Self> {
        let whole = caps.get(0)?;
        let (day, month, year) = match shape {
            DateShape::DayMonthYear | DateShape::DayMonthNameYear => (&caps[1], &caps[2], &caps[3]),
            DateShape::YearMonthDay => (&caps[3], &caps[2], &caps[1]),
        };

        Some(Self {
            text: whole.as_str().to_string(),
            start: whole.start(),
            end: whole.end(),
            shape,
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
        })
    }

    /// Calendar date for chronological comparison.
    pub fn to_date(&self) -> Result<NaiveDate, ExtractionError> {
        let parse_err = || ExtractionError::Parse {
            field: "date".to_string(),
            value: self.text.clone(),
        };

        let year: i32 = self.year.parse().map_err(|_| parse_err())?;
        let day: u32 = self.day.parse().map_err(|_| parse_err())?;
        let month: u32 = match self.shape {
            DateShape::DayMonthNameYear => month_abbrev_to_number(&self.month)?,
            _ => self.month.parse().map_err(|_| parse_err())?,
        };

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(parse_err)
    }

    /// Sortable `YYYY-MM-DD` form.
    pub fn sortable(&self) -> Result<String, ExtractionError> {
        Ok(self.to_date()?.format("%Y-%m-%d").to_string())
    }
}

/// Scans text for all three date shapes.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = DateCandidate;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// All date candidates in document order. Overlapping matches keep the
    /// earlier one.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let shapes: [(&Regex, DateShape); 3] = [
            (&*DATE_DMY, DateShape::DayMonthYear),
            (&*DATE_YMD, DateShape::YearMonthDay),
            (&*DATE_DAY_MONTH_NAME, DateShape::DayMonthNameYear),
        ];

        let mut found: Vec<DateCandidate> = shapes
            .into_iter()
            .flat_map(|(pattern, shape)| {
                pattern
                    .captures_iter(text)
                    .filter_map(move |caps| DateCandidate::from_captures(&caps, shape))
            })
            .collect();

        found.sort_by_key(|c| c.start);

        let mut results: Vec<DateCandidate> = Vec::with_capacity(found.len());
        for candidate in found {
            if results.last().is_some_and(|prev| candidate.start < prev.end) {
                continue;
            }
            results.push(candidate);
        }

        results
    }
}

fn keywords(role: DateRole) -> &'static Regex {
    match role {
        DateRole::Birth => &*BIRTH_KEYWORDS,
        DateRole::Issue => &*ISSUE_KEYWORDS,
        DateRole::Expiry => &*EXPIRY_KEYWORDS,
    }
}

/// Up to `window` characters immediately before `start` and after `end`.
fn context_window(text: &str, start: usize, end: usize, window: usize) -> (&str, &str) {
    let before = &text[..start];
    let before_start = before
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);

    let after = &text[end..];
    let after_end = after
        .char_indices()
        .nth(window)
        .map(|(i, _)| i)
        .unwrap_or(after.len());

    (&before[before_start..], &after[..after_end])
}

/// Classify a date by the keywords around it.
///
/// The keyword closest to the date before it decides; if nothing precedes
/// the date, the closest keyword after it decides.
pub fn classify_context(before: &str, after: &str) -> Option<DateRole> {
    let preceding = DateRole::ALL
        .iter()
        .filter_map(|&role| {
            keywords(role)
                .find_iter(before)
                .last()
                .map(|m| (before.len() - m.end(), role))
        })
        .min_by_key(|(distance, _)| *distance);

    if let Some((_, role)) = preceding {
        return Some(role);
    }

    DateRole::ALL
        .iter()
        .filter_map(|&role| keywords(role).find(after).map(|m| (m.start(), role)))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, role)| role)
}

/// Strategy for dates that context keywords did not place.
///
/// Implementations only fill roles that are still empty in the builder.
pub trait DateDisambiguator: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Assign dates from `candidates` (document order) to empty roles.
    fn assign(
        &self,
        candidates: &[DateCandidate],
        builder: &mut DocumentDataBuilder,
    ) -> Result<(), ExtractionError>;
}

/// Assigns dates by calendar order: earliest is birth, next is issue,
/// latest is expiry.
///
/// This is a best-effort heuristic. Dates that are not real calendar dates
/// (`00.00.0000`, `31.02.2015`) are skipped. With exactly two remaining
/// dates the earlier one becomes birth and the later one issue; expiry is
/// never guessed from two dates. With fewer than two nothing is assigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronologicalOrder;

impl DateDisambiguator for ChronologicalOrder {
    fn name(&self) -> &'static str {
        "chronological"
    }

    fn assign(
        &self,
        candidates: &[DateCandidate],
        builder: &mut DocumentDataBuilder,
    ) -> Result<(), ExtractionError> {
        if candidates.len() < 2 || DateRole::ALL.iter().all(|r| builder.has_date(*r)) {
            return Ok(());
        }

        let mut dated: Vec<(NaiveDate, &DateCandidate)> = candidates
            .iter()
            .filter_map(|c| match c.to_date() {
                Ok(date) => Some((date, c)),
                Err(e) => {
                    warn!("Ignoring date {} for chronological order: {}", c.text, e);
                    None
                }
            })
            .collect();

        if dated.len() < 2 {
            return Ok(());
        }

        // Stable: equal dates keep document order.
        dated.sort_by_key(|(date, _)| *date);

        let earliest = dated[0].1;
        let next = dated[1].1;
        let latest = dated[dated.len() - 1].1;

        if builder.date(DateRole::Birth, &earliest.text) {
            debug!("Assigned birth date by chronology: {}", earliest.text);
        }
        if builder.date(DateRole::Issue, &next.text) {
            debug!("Assigned issue date by chronology: {}", next.text);
        }
        if dated.len() >= 3 && builder.date(DateRole::Expiry, &latest.text) {
            debug!("Assigned expiry date by chronology: {}", latest.text);
        }

        Ok(())
    }
}

/// Find all dates in normalized text and assign birth, issue and expiry.
///
/// Context keywords are applied first; the first date classified for a role
/// keeps it. A failing `fallback` is logged and leaves the context results
/// in place. Returns the candidates that were found.
pub fn assign_dates(
    text: &str,
    builder: &mut DocumentDataBuilder,
    window: usize,
    fallback: Option<&dyn DateDisambiguator>,
) -> Vec<DateCandidate> {
    let candidates = DateExtractor::new().extract_all(text);
    debug!(
        "Found {} date candidates: {:?}",
        candidates.len(),
        candidates.iter().map(|c| c.text.as_str()).collect::<Vec<_>>()
    );

    for candidate in &candidates {
        let (before, after) = context_window(text, candidate.start, candidate.end, window);
        if let Some(role) = classify_context(before, after) {
            if builder.date(role, &candidate.text) {
                debug!("Assigned {:?} date by context: {}", role, candidate.text);
            }
        }
    }

    if let Some(strategy) = fallback {
        if let Err(e) = strategy.assign(&candidates, builder) {
            warn!("{} date fallback skipped: {}", strategy.name(), e);
        }
    }

    candidates
}

fn month_abbrev_to_number(month: &str) -> Result<u32, ExtractionError> {
    let abbrev: String = month.chars().take(3).collect::<String>().to_lowercase();
    let n = match abbrev.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return Err(ExtractionError::UnknownMonth(month.to_string())),
    };
    Ok(n)
}
