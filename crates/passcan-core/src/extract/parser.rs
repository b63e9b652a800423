//! Passport and ID card parser built on the rule cascades.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::document::{DateRole, DocumentDataBuilder, ExtractedDocumentData};

use super::rules::{
    ChronologicalOrder, DateDisambiguator, DocumentField, FieldExtractor, IinExtractor,
    assign_dates, extract_gender, normalize_text,
};

/// Result of field extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted document data. `raw_text` holds the text as given.
    pub data: ExtractedDocumentData,
    /// Fields that could not be extracted.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Turns recognized text into structured document data.
///
/// Parsing is total: missing fields are left unset, never reported as an
/// error.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Rule-based parser for Kazakhstan passports and ID cards.
pub struct PassportParser {
    /// Whether to validate IIN check digits.
    validate_iin: bool,
    /// Characters inspected on each side of a date.
    date_context_window: usize,
    /// Strategy for dates without context keywords.
    date_fallback: Option<Box<dyn DateDisambiguator>>,
}

impl PassportParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self {
            validate_iin: false,
            date_context_window: 50,
            date_fallback: Some(Box::new(ChronologicalOrder)),
        }
    }

    /// Create a parser from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let parser = Self::new()
            .with_iin_validation(config.validate_iin)
            .with_date_context_window(config.date_context_window);

        if config.chronological_fallback {
            parser
        } else {
            parser.with_date_fallback(None)
        }
    }

    /// Set IIN check digit validation.
    pub fn with_iin_validation(mut self, validate: bool) -> Self {
        self.validate_iin = validate;
        self
    }

    /// Set the date context window in characters.
    pub fn with_date_context_window(mut self, window: usize) -> Self {
        self.date_context_window = window;
        self
    }

    /// Replace the date fallback strategy. `None` disables it.
    pub fn with_date_fallback(mut self, strategy: Option<Box<dyn DateDisambiguator>>) -> Self {
        self.date_fallback = strategy;
        self
    }

    fn extract_names(&self, text: &str, builder: &mut DocumentDataBuilder) {
        builder
            .surname(DocumentField::Surname.extract_with_fallback(text))
            .name(DocumentField::Name.extract_with_fallback(text));
    }

    fn extract_identifiers(&self, text: &str, builder: &mut DocumentDataBuilder) {
        let iin = IinExtractor::new()
            .with_validation(self.validate_iin)
            .extract(text);

        builder
            .passport_number(DocumentField::PassportNumber.extract(text))
            .iin(iin)
            .id_number(DocumentField::IdNumber.extract(text));
    }

    fn extract_personal(&self, text: &str, builder: &mut DocumentDataBuilder) {
        builder
            .gender(extract_gender(text))
            .nationality(DocumentField::Nationality.extract(text))
            .citizenship(DocumentField::Citizenship.extract(text))
            .birth_place(DocumentField::BirthPlace.extract(text));
    }
}

impl Default for PassportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for PassportParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let normalized = normalize_text(text);

        info!("Parsing document from {} characters of text", normalized.len());

        let mut builder = DocumentDataBuilder::new();
        self.extract_names(&normalized, &mut builder);
        self.extract_identifiers(&normalized, &mut builder);
        self.extract_personal(&normalized, &mut builder);
        assign_dates(
            &normalized,
            &mut builder,
            self.date_context_window,
            self.date_fallback.as_deref(),
        );

        let mut warnings = Vec::new();
        if !builder.has_surname() {
            warnings.push("Could not extract surname".to_string());
        }
        if !builder.has_name() {
            warnings.push("Could not extract name".to_string());
        }
        if !builder.has_date(DateRole::Birth) {
            warnings.push("Could not extract date of birth".to_string());
        }

        let data = builder.build(text);
        if data.passport_number.is_none() {
            warnings.push("Could not extract passport number".to_string());
        }
        if data.iin.is_none() {
            warnings.push("Could not extract IIN".to_string());
        }

        debug!("Extracted fields: {:?}", data.populated_fields());

        ExtractionResult {
            data,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Gender;
    use pretty_assertions::assert_eq;

    const SAMPLE_PASSPORT: &str = r#"
REPUBLIC OF KAZAKHSTAN / ҚАЗАҚСТАН РЕСПУБЛИКАСЫ
PASSPORT  N12345678
Тегі / Фамилия / Surname: ZHAKSYBEKOV
Аты / Имя / Given names: ARMAN
Жынысы / Пол / Sex: M
Туған күні / Дата рождения / Date of birth: 14.03.1988
Туған жері / Место рождения / Place of birth: ALMATY, KAZ
Азаматтығы / Гражданство / Citizenship: KAZAKHSTAN
ЖСН / ИИН: 880314300125
Берілген күні / Дата выдачи / Date of issue: 02.09.2016
Жарамдылық мерзімі / Срок действия / Date of expiry: 01.09.2026
"#;

    #[test]
    fn test_parse_sample_passport() {
        let result = PassportParser::new().parse(SAMPLE_PASSPORT);
        let data = result.data;

        assert_eq!(data.surname.as_deref(), Some("ZHAKSYBEKOV"));
        assert_eq!(data.name.as_deref(), Some("ARMAN"));
        assert_eq!(data.gender, Some(Gender::Male));
        assert_eq!(data.passport_number.as_deref(), Some("N12345678"));
        assert_eq!(data.iin.as_deref(), Some("880314300125"));
        assert_eq!(data.citizenship.as_deref(), Some("KAZAKHSTAN"));
        assert_eq!(data.birth_place.as_deref(), Some("ALMATY"));
        assert_eq!(data.date_of_birth.as_deref(), Some("14.03.1988"));
        assert_eq!(data.passport_issue_date.as_deref(), Some("02.09.2016"));
        assert_eq!(data.passport_expiry_date.as_deref(), Some("01.09.2026"));
        assert_eq!(data.raw_text.as_deref(), Some(SAMPLE_PASSPORT));
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_thirteen_digits_do_not_make_an_iin() {
        let text = "Surname: IVANOV\nGiven names: IVAN\n1234567890123\nN12345678";
        let data = PassportParser::new().parse(text).data;

        assert_eq!(data.surname.as_deref(), Some("IVANOV"));
        assert_eq!(data.name.as_deref(), Some("IVAN"));
        assert_eq!(data.passport_number.as_deref(), Some("N12345678"));
        assert_eq!(data.iin, None);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = PassportParser::new();
        let first = parser.parse(SAMPLE_PASSPORT);
        let second = parser.parse(SAMPLE_PASSPORT);
        assert_eq!(first.data, second.data);
        assert_eq!(first.warnings, second.warnings);
    }

    #[test]
    fn test_label_language_does_not_change_result() {
        let parser = PassportParser::new();
        let english = parser.parse("Surname: PETROV Name: PETR Sex: M").data;
        let russian = parser.parse("Фамилия: PETROV Имя: PETR Пол: М").data;
        let kazakh = parser.parse("Тегі: PETROV Аты: PETR Жынысы: ер").data;

        for data in [&english, &russian, &kazakh] {
            assert_eq!(data.surname.as_deref(), Some("PETROV"));
            assert_eq!(data.name.as_deref(), Some("PETR"));
            assert_eq!(data.gender, Some(Gender::Male));
        }
    }

    #[test]
    fn test_surname_labels_ending_in_name() {
        let parser = PassportParser::new();
        let russian = parser.parse("Фамилия: SMITH Имя: JOHN").data;

        for text in [
            "Last name: SMITH First name: JOHN",
            "Family name: SMITH Given name: JOHN",
            "Last name: SMITH Name: JOHN",
        ] {
            let english = parser.parse(text).data;
            assert_eq!(english.surname.as_deref(), Some("SMITH"), "{}", text);
            assert_eq!(english.name, russian.name, "{}", text);
        }
        assert_eq!(russian.name.as_deref(), Some("JOHN"));
    }

    #[test]
    fn test_unmatched_text_keeps_raw_text_only() {
        let text = "lorem ipsum dolor sit amet";
        let result = PassportParser::new().parse(text);

        assert!(!result.data.has_identity_anchor());
        assert!(result.data.populated_fields().is_empty());
        assert_eq!(result.data.raw_text.as_deref(), Some(text));
        assert!(result.warnings.contains(&"Could not extract IIN".to_string()));
    }

    #[test]
    fn test_generic_name_fallback() {
        let data = PassportParser::new().parse("first: Aigerim family: Nurlanova").data;
        assert_eq!(data.name.as_deref(), Some("Aigerim"));
        assert_eq!(data.surname.as_deref(), Some("Nurlanova"));
    }

    #[test]
    fn test_chronological_fallback_can_be_disabled() {
        let text = "20.06.2025 12.05.1985 20.06.2015";

        let data = PassportParser::new().parse(text).data;
        assert_eq!(data.date_of_birth.as_deref(), Some("12.05.1985"));

        let config = ExtractionConfig {
            chronological_fallback: false,
            ..Default::default()
        };
        let data = PassportParser::from_config(&config).parse(text).data;
        assert_eq!(data.date_of_birth, None);
        assert_eq!(data.passport_expiry_date, None);
    }

    #[test]
    fn test_iin_validation_from_config() {
        let text = "ИИН 880314300123";
        let config = ExtractionConfig {
            validate_iin: true,
            ..Default::default()
        };

        assert_eq!(
            PassportParser::new().parse(text).data.iin.as_deref(),
            Some("880314300123")
        );
        assert_eq!(PassportParser::from_config(&config).parse(text).data.iin, None);
    }
}
