//! IIN (Kazakhstan Individual Identification Number) extraction and
//! validation.

use super::patterns::DocumentField;
use super::FieldExtractor;

/// IIN field extractor.
pub struct IinExtractor {
    validate: bool,
}

impl IinExtractor {
    /// Create a new IIN extractor. Check digits are not verified by default.
    pub fn new() -> Self {
        Self { validate: false }
    }

    /// Set whether to validate the IIN check digit.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for IinExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IinExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DocumentField::Iin
            .rules()
            .iter()
            .flat_map(|rule| rule.pattern.find_iter(text))
            .map(|m| m.as_str().to_string())
            .filter(|iin| !self.validate || validate_iin(iin))
            .collect()
    }
}

/// Extract the first 12-digit sequence from text.
pub fn extract_iin(text: &str) -> Option<String> {
    IinExtractor::new().extract(text)
}

/// Validate an IIN using the two-pass check digit algorithm.
///
/// First pass weights are 1..=11. If the remainder is 10 a second pass with
/// weights 3..=11, 1, 2 is used; a second remainder of 10 makes the number
/// invalid.
pub fn validate_iin(iin: &str) -> bool {
    let digits: Vec<u32> = iin.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 12 || iin.chars().count() != 12 {
        return false;
    }

    let weighted = |weights: &[u32]| -> u32 {
        digits
            .iter()
            .take(11)
            .zip(weights.iter())
            .map(|(d, w)| d * w)
            .sum::<u32>()
            % 11
    };

    let mut checksum = weighted(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    if checksum == 10 {
        checksum = weighted(&[3, 4, 5, 6, 7, 8, 9, 10, 11, 1, 2]);
        if checksum == 10 {
            return false;
        }
    }

    checksum == digits[11]
}
