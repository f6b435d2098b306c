use serde::{Deserialize, Serialize};
use validator::Validate;

/// One historical interview round carried by an import row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRound {
    pub interviewer_email: String,
    pub result: String,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCandidateRow {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub resume_link: Option<String>,
    pub current_role: Option<String>,
    #[serde(default)]
    pub rounds: Vec<ImportRound>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ImportPayload {
    #[validate(length(min = 1, max = 5000))]
    pub rows: Vec<ImportCandidateRow>,
}

/// Header names for one round's columns in an uploaded CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundColumns {
    pub interviewer_email: String,
    pub result: String,
    pub feedback: Option<String>,
}

/// Maps CSV headers onto candidate fields, as produced by the upload wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub resume_link: Option<String>,
    pub current_role: Option<String>,
    #[serde(default)]
    pub rounds: Vec<RoundColumns>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CsvImportPayload {
    #[validate(length(min = 1))]
    pub csv: String,
    pub mapping: ColumnMapping,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped_duplicates: usize,
    pub interviews_created: usize,
    pub warnings: Vec<String>,
}
