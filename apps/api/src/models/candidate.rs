use thiserror::Error;

/// Filename recorded for parts uploaded without one.
pub const MISSING_FILENAME: &str = "N/A";

// Dictionary keys the model is instructed to return. They double as the
// report's column headers.
pub const NAME_KEY: &str = "NAME";
pub const YEARS_KEY: &str = "YEARS OF EXPERIENCE";
pub const STRENGTHS_KEY: &str = "KEY STRENGTHS";
pub const SUMMARY_KEY: &str = "SUMMARY";
pub const FIT_KEY: &str = "SUITABLE FOR MY REQUIREMENT (Y/N)";
pub const OVERFIT_KEY: &str = "OVERFIT (Y/N)";

/// Structured extraction for one resume, as returned by the model.
///
/// Values are stored exactly as the model gave them; `fit` and `overfit`
/// are expected to be "Y"/"N" but are not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub name: String,
    pub years_of_experience: String,
    pub key_strengths: Vec<String>,
    pub summary: String,
    pub fit: String,
    pub overfit: String,
}

/// Row-level failure. The `Display` text is what lands in the report's
/// ERROR column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Invalid file type")]
    InvalidFileType,

    #[error("File uploaded without a filename")]
    MissingFilename,

    #[error("Failed to read file")]
    Unreadable,

    #[error("Empty file")]
    EmptyFile,

    #[error("LLM API call failed")]
    LlmCallFailed,

    #[error("Could not parse LLM response")]
    UnparseableResponse,
}

/// One report row per uploaded file: either the extracted record or the
/// reason extraction failed, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub filename: String,
    pub outcome: Result<CandidateRecord, RowError>,
}

impl ResultRow {
    pub fn success(filename: impl Into<String>, record: CandidateRecord) -> Self {
        Self {
            filename: filename.into(),
            outcome: Ok(record),
        }
    }

    pub fn failure(filename: impl Into<String>, error: RowError) -> Self {
        Self {
            filename: filename.into(),
            outcome: Err(error),
        }
    }

    pub fn error(&self) -> Option<RowError> {
        self.outcome.as_ref().err().copied()
    }

    pub fn fields(&self) -> Option<&CandidateRecord> {
        self.outcome.as_ref().ok()
    }
}
