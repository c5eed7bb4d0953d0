//! Argument resolution errors

use thiserror::Error;

/// Errors raised while turning command-line text into typed options
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// A value could not be converted to its declared type
    #[error("{value} : {type_tag}")]
    TypeCast {
        /// The raw value as supplied
        value: String,
        /// The type tag the value was cast to
        type_tag: String,
    },

    /// The option name is not part of the resolved schema
    #[error("unknown option '{0}'")]
    UnknownOption(String),
}

impl ArgError {
    pub(crate) fn type_cast(value: &str, type_tag: impl Into<String>) -> Self {
        ArgError::TypeCast {
            value: value.to_string(),
            type_tag: type_tag.into(),
        }
    }
}

/// Result type for argument resolution
pub type Result<T> = std::result::Result<T, ArgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_cast_display() {
        let error = ArgError::type_cast("abc", "int");
        assert_eq!(error.to_string(), "abc : int");
    }

    #[test]
    fn test_unknown_option_display() {
        let error = ArgError::UnknownOption("bogus".to_string());
        assert_eq!(error.to_string(), "unknown option 'bogus'");
    }
}
