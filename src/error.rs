use thiserror::Error;

/// Errors surfaced by report lookups.
///
/// An unknown key means the caller and the report disagree about the metric
/// schema, so lookups fail loudly instead of defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoutError {
    #[error("unknown ability `{0}`")]
    UnknownAbility(String),

    #[error("unknown count `{0}`")]
    UnknownCount(String),
}
