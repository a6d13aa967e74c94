use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimpError {
    #[error("Input file '{path}' does not exist")]
    InputNotFound { path: String },

    #[error("Could not read '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output file '{path}' could not be created: {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed LDIF input at line {line}: {message}")]
    LdifParseError { line: usize, message: String },

    #[error("Could not determine Base DN, please specify using -b")]
    BaseDnNotFound,

    #[error("No user or group records found, is base DN '{base_dn}' valid?")]
    NoMatchingEntries { base_dn: String },

    #[error("Configuration error in '{path}': {message}")]
    ConfigParseError { path: String, message: String },

    #[error("'{rule}' is not a valid hostname or regex")]
    InvalidRuleError { rule: String },

    #[error("'{rule}' is not a valid hostname or regex: {reason}")]
    InvalidRegexError { rule: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    #[error("You must pass the FQDN of the host as the first argument")]
    MissingHostnameError,

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Output,
    Configuration,
    Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    High,
    Critical,
}

impl SimpError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimpError::InputNotFound { .. } | SimpError::ReadError { .. } => ErrorCategory::Input,
            SimpError::LdifParseError { .. }
            | SimpError::BaseDnNotFound
            | SimpError::NoMatchingEntries { .. } => ErrorCategory::Data,
            SimpError::WriteError { .. } | SimpError::SerializationError(_) => {
                ErrorCategory::Output
            }
            SimpError::ConfigParseError { .. }
            | SimpError::InvalidRuleError { .. }
            | SimpError::InvalidRegexError { .. }
            | SimpError::ConfigValidationError { .. }
            | SimpError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SimpError::MissingHostnameError => ErrorCategory::Usage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Output => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Every failure of these one-shot tools maps to exit status 1.
    pub fn exit_code(&self) -> i32 {
        1
    }

    pub fn user_friendly_message(&self) -> String {
        format!("ERROR: {}", self)
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SimpError::InputNotFound { .. } => {
                "Check the input path, or pass the slapcat dump with -i"
            }
            SimpError::ReadError { .. } => "Check the file permissions",
            SimpError::WriteError { .. } => {
                "Make sure the output directory exists and is writable"
            }
            SimpError::LdifParseError { .. } => {
                "Regenerate the dump with `slapcat` and make sure it was not truncated"
            }
            SimpError::BaseDnNotFound => "Pass the base DN explicitly with -b",
            SimpError::NoMatchingEntries { .. } => {
                "Check the spelling of the base DN given with -b"
            }
            SimpError::ConfigParseError { .. } => "Fix the syntax of the configuration file",
            SimpError::InvalidRuleError { .. } | SimpError::InvalidRegexError { .. } => {
                "Regex rules must be wrapped in '/' on both sides, e.g. /worker\\d+/"
            }
            SimpError::SerializationError(_) => "Report this as a bug",
            SimpError::MissingHostnameError => "Invoke as: set-environment <fqdn>",
            SimpError::ConfigValidationError { .. }
            | SimpError::InvalidConfigValueError { .. } => {
                "Correct the reported configuration value"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SimpError>;
