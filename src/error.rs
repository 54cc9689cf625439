use thiserror::Error;

use crate::report::Severity;

/// Everything a generator run can report as a failure.
///
/// Rule errors abort a run before any geometry exists. The remaining variants
/// are softer: an unbalanced `]` is skipped and interpretation continues, and
/// an empty result simply means the sink is never called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlantGenError {
    #[error("rule format incorrect in {0:?}, use 'Symbol:Replacement'")]
    MalformedRule(String),
    #[error("rule symbol {0:?} must be exactly one character")]
    InvalidSymbol(String),
    #[error("duplicate rule for symbol '{0}'")]
    DuplicateRule(char),
    #[error("no L-System rules given")]
    EmptyRules,
    #[error("L-System stack empty, unbalanced ']'")]
    UnbalancedBranch,
    #[error("{0} resulted in no geometry")]
    EmptyResult(&'static str),
}

impl PlantGenError {
    /// How the error is surfaced to the user.
    pub fn severity(&self) -> Severity {
        match self {
            PlantGenError::MalformedRule(_)
            | PlantGenError::InvalidSymbol(_)
            | PlantGenError::DuplicateRule(_)
            | PlantGenError::EmptyRules => Severity::Error,
            PlantGenError::UnbalancedBranch | PlantGenError::EmptyResult(_) => Severity::Warning,
        }
    }
}
