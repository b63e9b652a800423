//! Structured identity document data produced by field extraction.

use serde::{Deserialize, Serialize};

/// Fields extracted from a passport or ID card.
///
/// Every field except `raw_text` is optional. An unset field means the
/// matching pattern did not fire; it never carries a sentinel value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocumentData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,

    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub citizenship: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_issue_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_expiry_date: Option<String>,

    /// Individual Identification Number (12 digits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iin: Option<String>,

    /// Local ID card number (9 digits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,

    /// Recognized text as returned by the engine, or a diagnostic message
    /// when recognition did not produce usable text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl ExtractedDocumentData {
    /// Record carrying only a diagnostic message.
    pub fn diagnostic(message: impl Into<String>) -> Self {
        Self {
            raw_text: Some(message.into()),
            ..Self::default()
        }
    }

    /// Whether any of the three identity anchors (name, passport number,
    /// IIN) was found.
    pub fn has_identity_anchor(&self) -> bool {
        self.name.is_some() || self.passport_number.is_some() || self.iin.is_some()
    }

    /// Names of the populated fields, excluding `rawText`.
    pub fn populated_fields(&self) -> Vec<&'static str> {
        let fields: [(&'static str, bool); 12] = [
            ("surname", self.surname.is_some()),
            ("name", self.name.is_some()),
            ("dateOfBirth", self.date_of_birth.is_some()),
            ("citizenship", self.citizenship.is_some()),
            ("passportNumber", self.passport_number.is_some()),
            ("passportIssueDate", self.passport_issue_date.is_some()),
            ("passportExpiryDate", self.passport_expiry_date.is_some()),
            ("iin", self.iin.is_some()),
            ("idNumber", self.id_number.is_some()),
            ("gender", self.gender.is_some()),
            ("nationality", self.nationality.is_some()),
            ("birthPlace", self.birth_place.is_some()),
        ];

        fields
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Gender normalized to a binary code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// The single-letter code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

/// Role a date plays on an identity document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateRole {
    Birth,
    Issue,
    Expiry,
}

impl DateRole {
    pub const ALL: [DateRole; 3] = [Self::Birth, Self::Issue, Self::Expiry];
}

/// Builder for [`ExtractedDocumentData`].
///
/// Every setter is set-if-absent: the first value written to a field wins
/// and later writes are ignored. `None` values are no-ops.
#[derive(Debug, Default)]
pub struct DocumentDataBuilder {
    data: ExtractedDocumentData,
}

macro_rules! first_wins {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(&mut self, value: Option<String>) -> &mut Self {
                if self.data.$field.is_none() {
                    self.data.$field = value;
                }
                self
            }
        )*
    };
}

impl DocumentDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    first_wins! {
        surname => surname,
        name => name,
        citizenship => citizenship,
        passport_number => passport_number,
        iin => iin,
        id_number => id_number,
        nationality => nationality,
        birth_place => birth_place,
    }

    pub fn gender(&mut self, value: Option<Gender>) -> &mut Self {
        if self.data.gender.is_none() {
            self.data.gender = value;
        }
        self
    }

    /// Assign a date to a role unless that role already has one.
    ///
    /// Returns `true` if the value was stored.
    pub fn date(&mut self, role: DateRole, value: &str) -> bool {
        let slot = self.date_slot(role);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value.to_string());
        true
    }

    /// Whether a role already has a date.
    pub fn has_date(&self, role: DateRole) -> bool {
        match role {
            DateRole::Birth => self.data.date_of_birth.is_some(),
            DateRole::Issue => self.data.passport_issue_date.is_some(),
            DateRole::Expiry => self.data.passport_expiry_date.is_some(),
        }
    }

    pub fn has_name(&self) -> bool {
        self.data.name.is_some()
    }

    pub fn has_surname(&self) -> bool {
        self.data.surname.is_some()
    }

    /// Finish the record, attaching the recognized text.
    pub fn build(self, raw_text: &str) -> ExtractedDocumentData {
        ExtractedDocumentData {
            raw_text: Some(raw_text.to_string()),
            ..self.data
        }
    }

    fn date_slot(&mut self, role: DateRole) -> &mut Option<String> {
        match role {
            DateRole::Birth => &mut self.data.date_of_birth,
            DateRole::Issue => &mut self.data.passport_issue_date,
            DateRole::Expiry => &mut self.data.passport_expiry_date,
        }
    }
}

/// Outcome tag of one extraction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStatus {
    /// At least one identity anchor was found.
    Ok,
    /// Text was recognized but no name, passport number or IIN matched.
    Degraded,
    /// Recognition produced empty or whitespace-only text.
    NoText,
    /// Recognition or input handling failed; `rawText` holds the reason.
    Failed,
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Degraded => "degraded",
            Self::NoText => "no-text",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Value returned by the extraction pipeline. Always present, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    pub status: ExtractionStatus,
    pub data: ExtractedDocumentData,
    /// Fields that could not be extracted, and other notes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
}

impl ExtractionOutcome {
    pub fn new(status: ExtractionStatus, data: ExtractedDocumentData) -> Self {
        Self {
            status,
            data,
            warnings: Vec::new(),
            processing_time_ms: 0,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_processing_time(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }
}
