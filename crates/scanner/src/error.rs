use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("No symbols were given to scan")]
    NoSymbols,

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for ScannerError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        ScannerError::ProgressBarTemplate(error.to_string())
    }
}
