//! Crate error type.

/// Errors surfaced by the trail engine.
///
/// Device configuration inconsistencies are hard failures at construction
/// time since they indicate an invalid device properties file.
#[derive(Debug, thiserror::Error)]
pub enum HistoError {
    #[error("suite trail '{trail}' declared as the default trail of '{item}'")]
    SuiteDefaultTrail { item: String, trail: &'static str },

    #[error("transition amount evaluation is not implemented (settlement '{0}')")]
    TransitionAmountUnsupported(String),

    #[error("template i/o failed: {0}")]
    TemplateIo(#[from] std::io::Error),

    #[error("template content is not valid: {0}")]
    TemplateFormat(#[from] serde_json::Error),
}
