use thiserror::Error;

#[derive(Error, Debug)]
pub enum IgnitionError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Module '{name}' is already registered")]
    DuplicateModule { name: String },

    #[error("Module '{name}' is not registered")]
    UnknownModule { name: String },

    #[error("Invalid {kind} '{value}': must start with a letter or underscore and contain only alphanumerics and underscores")]
    InvalidIdentifier { kind: String, value: String },

    #[error("Duplicated id '{future_id}' found in module")]
    DuplicateFutureId { future_id: String },

    #[error("Handle '{future_id}' belongs to a different deployment context")]
    ForeignHandle { future_id: String },

    #[error("Artifact for contract '{contract}' not found")]
    ArtifactNotFound { contract: String },

    #[error("Artifact for contract '{contract}' is invalid: {reason}")]
    ArtifactInvalid { contract: String, reason: String },

    #[error("The constructor of the contract '{contract}' expects {expected} arguments but {given} were given")]
    ConstructorArity {
        contract: String,
        expected: usize,
        given: usize,
    },

    #[error("Value sent to the constructor of '{contract}' but it is not payable")]
    NonPayableValue { contract: String },

    #[error("Deployment of '{future_id}' failed: {message}")]
    ExecutionFailed { future_id: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Declaration,
    Artifact,
    Execution,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IgnitionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IgnitionError::IoError(_) | IgnitionError::SerializationError(_) => ErrorCategory::Io,
            IgnitionError::ConfigError { .. }
            | IgnitionError::ConfigValidationError { .. }
            | IgnitionError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            IgnitionError::DuplicateModule { .. }
            | IgnitionError::UnknownModule { .. }
            | IgnitionError::InvalidIdentifier { .. }
            | IgnitionError::DuplicateFutureId { .. }
            | IgnitionError::ForeignHandle { .. } => ErrorCategory::Declaration,
            IgnitionError::ArtifactNotFound { .. }
            | IgnitionError::ArtifactInvalid { .. }
            | IgnitionError::ConstructorArity { .. }
            | IgnitionError::NonPayableValue { .. } => ErrorCategory::Artifact,
            IgnitionError::ExecutionFailed { .. } => ErrorCategory::Execution,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Config | ErrorCategory::Declaration | ErrorCategory::Artifact => {
                ErrorSeverity::High
            }
            ErrorCategory::Execution => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            IgnitionError::ArtifactNotFound { contract } => format!(
                "Compile the project and make sure an artifact named '{}.json' exists under the artifacts directory",
                contract
            ),
            IgnitionError::ArtifactInvalid { .. } => {
                "Recompile the contracts; abstract contracts and interfaces cannot be deployed".to_string()
            }
            IgnitionError::ConstructorArity { .. } => {
                "Pass one argument per constructor parameter in the module declaration".to_string()
            }
            IgnitionError::NonPayableValue { .. } => {
                "Remove the value option or mark the constructor as payable".to_string()
            }
            IgnitionError::DuplicateModule { .. } | IgnitionError::DuplicateFutureId { .. } => {
                "Give each module and each contract within a module a unique id".to_string()
            }
            IgnitionError::UnknownModule { .. } => {
                "Run the 'list' command to see the registered modules".to_string()
            }
            IgnitionError::ForeignHandle { .. } => {
                "Only use handles returned by the same module's context".to_string()
            }
            IgnitionError::InvalidIdentifier { .. } => {
                "Use identifiers made of letters, digits and underscores".to_string()
            }
            IgnitionError::ExecutionFailed { .. } => {
                "Inspect the executor logs and retry the deployment".to_string()
            }
            IgnitionError::ConfigError { .. }
            | IgnitionError::ConfigValidationError { .. }
            | IgnitionError::InvalidConfigValueError { .. } => {
                "Check the deployment configuration file and command line flags".to_string()
            }
            IgnitionError::IoError(_) | IgnitionError::SerializationError(_) => {
                "Check file permissions and that JSON files are well formed".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Declaration => format!("Module declaration rejected: {}", self),
            ErrorCategory::Artifact => format!("Planning failed, nothing was deployed: {}", self),
            ErrorCategory::Execution => format!("Deployment aborted: {}", self),
            ErrorCategory::Io => format!("File system error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, IgnitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_errors_are_high_severity() {
        let err = IgnitionError::ArtifactNotFound {
            contract: "EventOrganizer".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Artifact);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("EventOrganizer.json"));
        assert!(err.user_friendly_message().starts_with("Planning failed"));
    }

    #[test]
    fn test_constructor_arity_message() {
        let err = IgnitionError::ConstructorArity {
            contract: "Token".to_string(),
            expected: 2,
            given: 0,
        };
        assert_eq!(
            err.to_string(),
            "The constructor of the contract 'Token' expects 2 arguments but 0 were given"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: IgnitionError = io.into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
