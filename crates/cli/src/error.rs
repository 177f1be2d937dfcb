//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map `DeclarationError` and `KeyError` to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.

use confdecl_declaration::{DeclarationError, KeyError};

/// Structured exit codes for confdecl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unreadable config file, I/O failure, or anything unclassified.
    GeneralError = 1,

    /// Validation error - bad pattern, unknown format, invalid payload or configuration.
    ///
    /// Scripts should fix the input and not retry the same invocation.
    ValidationError = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&DeclarationError> for ExitCode {
    fn from(err: &DeclarationError) -> Self {
        match err {
            DeclarationError::InvalidKey(_)
            | DeclarationError::UnknownFormat { .. }
            | DeclarationError::InvalidPayload { .. }
            | DeclarationError::UnsupportedVersion(_)
            | DeclarationError::InvalidConfiguration { .. } => ExitCode::ValidationError,

            DeclarationError::AlreadyDeclared(_)
            | DeclarationError::Sealed { .. }
            | DeclarationError::UnexpectedInput { .. }
            | DeclarationError::CoreSchema(_)
            | DeclarationError::Json(_)
            | DeclarationError::Yaml(_)
            | DeclarationError::Toml(_) => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if no declaration error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(err) = cause.downcast_ref::<DeclarationError>() {
                return ExitCode::from(err);
            }
            if cause.downcast_ref::<KeyError>().is_some() {
                return ExitCode::ValidationError;
            }
        }
        ExitCode::GeneralError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_code_as_i32() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::ValidationError.as_i32(), 5);
    }

    #[test]
    fn test_unknown_format_is_validation_error() {
        let err = DeclarationError::UnknownFormat {
            kind: "describe",
            name: "xml".to_string(),
            available: vec!["dict".to_string()],
        };
        assert_eq!(ExitCode::from(&err), ExitCode::ValidationError);
    }

    #[test]
    fn test_sealed_is_general_error() {
        let err = DeclarationError::Sealed {
            action: "declare",
            target: "a".to_string(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::GeneralError);
    }

    #[test]
    fn test_exit_code_found_in_context_chain() {
        let err: anyhow::Error = Err::<(), _>(KeyError::EmptySegment("a..b".to_string()))
            .context("Invalid search pattern")
            .unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::ValidationError);

        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
    }
}
