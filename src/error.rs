use thiserror::Error;

use crate::steps::WizardStep;

/// Recoverable failures of draft editing. None of these mutate the draft.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("{step} is incomplete, missing: {}", .missing.join(", "))]
    Incomplete {
        step: WizardStep,
        missing: Vec<&'static str>,
    },

    #[error("You can add at most {max} custom assessment questions")]
    QuestionLimit { max: usize },

    #[error("no {list} entry #{}", .index + 1)]
    NoSuchEntry { list: &'static str, index: usize },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("draft is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("draft must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Service(#[from] crate::service::ServiceError),
}
