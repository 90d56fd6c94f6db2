use thiserror::Error;

pub type AxisResult<T> = Result<T, AxisError>;

#[derive(Debug, Error)]
pub enum AxisError {
    #[error("invalid value for `{property}`: {reason}")]
    InvalidArgument {
        property: &'static str,
        reason: String,
    },

    #[error("label format error: {0}")]
    Format(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AxisError {
    pub(crate) fn invalid(property: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            property,
            reason: reason.into(),
        }
    }
}
