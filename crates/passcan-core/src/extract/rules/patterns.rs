//! Pattern tables for identity document fields.
//!
//! Each field maps to an ordered cascade of label variants in English,
//! Russian and Kazakh. Patterns run against normalized text, so `№`, quotes
//! and other symbols are already gone and line breaks are single spaces.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::{first_match, FieldRule};

/// A word in Latin or Cyrillic script (Kazakh letters included).
const WORD: &str = r"[\p{Latin}\p{Cyrillic}]+";

/// A capitalized word: one uppercase letter followed by lowercase ones.
const CAPITALIZED: &str = r"\p{Lu}\p{Ll}+";

/// Words that turn a following `name` into a surname label.
const SURNAME_PREFIX: &str = r"last|family|sur";

/// Logical fields recognized by the pattern cascades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentField {
    PassportNumber,
    Iin,
    Name,
    Surname,
    Gender,
    Nationality,
    Citizenship,
    BirthPlace,
    IdNumber,
}

impl DocumentField {
    /// Labeled cascade for this field, in priority order.
    pub fn rules(self) -> &'static [FieldRule] {
        FIELD_RULES.get(&self).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Second-chance rules tried when the labeled cascade finds nothing.
    pub fn generic_rules(self) -> &'static [FieldRule] {
        GENERIC_RULES.get(&self).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Run the labeled cascade.
    pub fn extract(self, text: &str) -> Option<String> {
        first_match(self.rules(), text).map(str::to_string)
    }

    /// Run the labeled cascade, then the generic rules.
    pub fn extract_with_fallback(self, text: &str) -> Option<String> {
        self.extract(text)
            .or_else(|| first_match(self.generic_rules(), text).map(str::to_string))
    }
}

fn labeled(labels: &str, value: &str) -> FieldRule {
    FieldRule::new(&format!(r"(?i)\b(?:{})\b[:\s]+({})", labels, value), 1)
}

lazy_static! {
    /// Field name to ordered cascade.
    pub static ref FIELD_RULES: HashMap<DocumentField, Vec<FieldRule>> = {
        let mut m = HashMap::new();

        m.insert(DocumentField::PassportNumber, vec![
            // Bare shape: one uppercase letter and eight digits, no label.
            FieldRule::whole(r"\b[A-Z]\d{8}\b"),
            FieldRule::new(r"(?i)\bPassport\s+No\.?:?\s*([A-Z0-9]{7,9})\b", 1),
            FieldRule::new(r"(?i)\bDocument\s+No\.?:?\s*([A-Z0-9]{7,9})\b", 1),
            FieldRule::new(r"(?i)\bПаспорт\s*(?:No\.?)?:?\s*([A-Z0-9]{7,9})\b", 1),
            FieldRule::new(r"(?i)\bномер\s*(?:паспорта|документа)?:?\s*([A-Z0-9]{7,9})\b", 1),
            FieldRule::new(r"(?i)\bқұжат\s+нөмірі:?\s*([A-Z0-9]{7,9})\b", 1),
        ]);

        m.insert(DocumentField::Iin, vec![
            FieldRule::whole(r"\b\d{12}\b"),
        ]);

        m.insert(DocumentField::Name, vec![
            labeled(r"given\s+names?|first\s+name", WORD),
            // Bare `name`, unless it is the tail of a surname label.
            FieldRule::excluding(
                &format!(r"(?i)\b(?:({})\s*)?name\b[:\s]+({})", SURNAME_PREFIX, WORD),
                2,
                1,
            ),
            labeled(r"имя|имена", WORD),
            labeled(r"аты", WORD),
        ]);

        m.insert(DocumentField::Surname, vec![
            labeled(r"surname|last\s+name|family\s+name", WORD),
            labeled(r"фамилия", WORD),
            labeled(r"тегі", WORD),
        ]);

        m.insert(DocumentField::Gender, vec![
            labeled(r"gender|sex", r"\p{L}+"),
            labeled(r"пол", r"\p{L}+"),
            labeled(r"жынысы", r"\p{L}+"),
        ]);

        m.insert(DocumentField::Nationality, vec![
            labeled(r"nationality", WORD),
            labeled(r"национальность", WORD),
            labeled(r"ұлты", WORD),
        ]);

        m.insert(DocumentField::Citizenship, vec![
            labeled(r"citizenship|nationality", WORD),
            labeled(r"citizen\s+of|country", WORD),
            labeled(r"гражданство", WORD),
            labeled(r"азаматтығы", WORD),
        ]);

        // Place names may span several words; the value ends at the next
        // digit or comma.
        let place = r"[\p{Latin}\p{Cyrillic}][\p{Latin}\p{Cyrillic}\s]*?";
        m.insert(DocumentField::BirthPlace, vec![
            FieldRule::new(&format!(r"(?i)\b(?:place\s+of\s+birth|birth\s+place)\b[:\s]+({})\s*(?:\d|,)", place), 1),
            FieldRule::new(&format!(r"(?i)\bborn\s+(?:in|at)\b[:\s]+({})\s*(?:\d|,)", place), 1),
            FieldRule::new(&format!(r"(?i)\bместо\s+рождения\b[:\s]+({})\s*(?:\d|,)", place), 1),
            FieldRule::new(&format!(r"(?i)\bтуған\s+жері\b[:\s]+({})\s*(?:\d|,)", place), 1),
        ]);

        m.insert(DocumentField::IdNumber, vec![
            FieldRule::new(r"(?i)\b(?:ID\s+Number|ID\s+card\s+no\.?|Identity\s+card|ID)\b[:\s]*(\d{9})\b", 1),
            FieldRule::new(r"(?i)\b(?:удостоверени[ея]\s+личности|личное\s+удостоверение|удостоверения)\b[:\s]*(\d{9})\b", 1),
            FieldRule::new(r"(?i)\bжеке\s+куәлік\b[:\s]*(\d{9})\b", 1),
            FieldRule::whole(r"\b\d{9}\b"),
        ]);

        m
    };

    /// Broader keyword sets followed by a capitalized word.
    pub static ref GENERIC_RULES: HashMap<DocumentField, Vec<FieldRule>> = {
        let mut m = HashMap::new();
        m.insert(DocumentField::Name, vec![
            FieldRule::excluding(
                &format!(
                    r"(?i:\b(?:({})\s*)?(?:name|first|given|имя|имена|аты))[:\s]+({})",
                    SURNAME_PREFIX, CAPITALIZED
                ),
                2,
                1,
            ),
        ]);
        m.insert(DocumentField::Surname, vec![
            FieldRule::new(&format!(r"(?i:\b(?:surname|family|last|фамилия|тегі))[:\s]+({})", CAPITALIZED), 1),
        ]);
        m
    };

    /// Context keywords around a date, per role.
    pub static ref BIRTH_KEYWORDS: Regex = Regex::new(
        r"(?i)birth|born|рожд|туған|туылған"
    ).unwrap();

    pub static ref ISSUE_KEYWORDS: Regex = Regex::new(
        r"(?i)issue|выда|берілген|берілді"
    ).unwrap();

    pub static ref EXPIRY_KEYWORDS: Regex = Regex::new(
        r"(?i)expir|valid\s+until|действ|годен\s+до|жарамд"
    ).unwrap();

    // Date shapes
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{2})[./\-](\d{2})[./\-](\d{4})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{2})[./\-](\d{2})\b"
    ).unwrap();

    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(\d{2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{4})\b"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_rules() {
        for field in [
            DocumentField::PassportNumber,
            DocumentField::Iin,
            DocumentField::Name,
            DocumentField::Surname,
            DocumentField::Gender,
            DocumentField::Nationality,
            DocumentField::Citizenship,
            DocumentField::BirthPlace,
            DocumentField::IdNumber,
        ] {
            assert!(!field.rules().is_empty(), "{:?} has no rules", field);
        }
    }

    #[test]
    fn test_passport_number_bare_shape_first() {
        let text = "Passport No: AB1234567 N12345678";
        assert_eq!(
            DocumentField::PassportNumber.extract(text),
            Some("N12345678".to_string())
        );
    }

    #[test]
    fn test_passport_number_labeled() {
        assert_eq!(
            DocumentField::PassportNumber.extract("Passport No. AB1234567"),
            Some("AB1234567".to_string())
        );
        assert_eq!(
            DocumentField::PassportNumber.extract("Паспорт 12345678"),
            Some("12345678".to_string())
        );
        assert_eq!(
            DocumentField::PassportNumber.extract("номер паспорта: KZ1234567"),
            Some("KZ1234567".to_string())
        );
    }

    #[test]
    fn test_name_label_inside_surname_is_ignored() {
        let text = "Surname: IVANOV Given names: IVAN";
        assert_eq!(DocumentField::Name.extract(text), Some("IVAN".to_string()));
        assert_eq!(DocumentField::Surname.extract(text), Some("IVANOV".to_string()));
    }

    #[test]
    fn test_name_label_after_surname_prefix_is_ignored() {
        assert_eq!(
            DocumentField::Name.extract("Last name: SMITH First name: JOHN"),
            Some("JOHN".to_string())
        );
        assert_eq!(
            DocumentField::Name.extract("Family name: SMITH Name: JOHN"),
            Some("JOHN".to_string())
        );
        assert_eq!(DocumentField::Name.extract("Sur name: SMITH"), None);
        assert_eq!(
            DocumentField::Name.extract_with_fallback("Last name: Smith"),
            None
        );
    }

    #[test]
    fn test_name_labels_in_three_languages() {
        assert_eq!(DocumentField::Name.extract("Name: ASEL"), Some("ASEL".to_string()));
        assert_eq!(DocumentField::Name.extract("Имя: АСЕЛЬ"), Some("АСЕЛЬ".to_string()));
        assert_eq!(DocumentField::Name.extract("Аты: ӘСЕЛ"), Some("ӘСЕЛ".to_string()));
    }

    #[test]
    fn test_surname_labels_in_three_languages() {
        assert_eq!(DocumentField::Surname.extract("Last name: Smith"), Some("Smith".to_string()));
        assert_eq!(DocumentField::Surname.extract("ФАМИЛИЯ: ПЕТРОВ"), Some("ПЕТРОВ".to_string()));
        assert_eq!(DocumentField::Surname.extract("Тегі: ҚАЙРАТОВ"), Some("ҚАЙРАТОВ".to_string()));
    }

    #[test]
    fn test_generic_name_requires_capitalized_word() {
        assert_eq!(DocumentField::Name.extract("first: Ivan"), None);
        assert_eq!(
            DocumentField::Name.extract_with_fallback("first: Ivan"),
            Some("Ivan".to_string())
        );
        assert_eq!(DocumentField::Name.extract_with_fallback("first: ivan"), None);
    }

    #[test]
    fn test_generic_surname() {
        assert_eq!(
            DocumentField::Surname.extract_with_fallback("family: Petrova"),
            Some("Petrova".to_string())
        );
    }

    #[test]
    fn test_birth_place_stops_at_digit_or_comma() {
        assert_eq!(
            DocumentField::BirthPlace.extract("Place of birth: ALMATY KAZ 01.01.1990"),
            Some("ALMATY KAZ".to_string())
        );
        assert_eq!(
            DocumentField::BirthPlace.extract("Место рождения: г Алматы, Казахстан"),
            Some("г Алматы".to_string())
        );
        assert_eq!(DocumentField::BirthPlace.extract("Place of birth: ALMATY"), None);
    }

    #[test]
    fn test_citizenship_and_nationality() {
        let text = "Citizenship: KAZAKHSTAN Ұлты: ҚАЗАҚ";
        assert_eq!(
            DocumentField::Citizenship.extract(text),
            Some("KAZAKHSTAN".to_string())
        );
        assert_eq!(DocumentField::Nationality.extract(text), Some("ҚАЗАҚ".to_string()));
    }

    #[test]
    fn test_id_number() {
        assert_eq!(
            DocumentField::IdNumber.extract("ID card no: 012345678"),
            Some("012345678".to_string())
        );
        assert_eq!(
            DocumentField::IdNumber.extract("Жеке куәлік 987654321"),
            Some("987654321".to_string())
        );
        assert_eq!(
            DocumentField::IdNumber.extract("card 123456789 issued"),
            Some("123456789".to_string())
        );
        assert_eq!(DocumentField::IdNumber.extract("900101300126"), None);
    }
}
