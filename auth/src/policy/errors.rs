use thiserror::Error;

/// Error type for access policy configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Path pattern must start with '/': {0}")]
    MissingLeadingSlash(String),

    #[error("Path pattern contains an empty segment: {0}")]
    EmptySegment(String),

    #[error("Invalid segment '{segment}' in path pattern {pattern}")]
    InvalidSegment { pattern: String, segment: String },

    #[error("'**' is only allowed as the last segment: {0}")]
    MisplacedCatchAll(String),

    #[error("Path variable '{variable}' is captured twice in {pattern}")]
    DuplicateVariable { pattern: String, variable: String },

    #[error("Rule for {pattern} requires path variable '{variable}' which the pattern does not capture")]
    UnknownVariable { pattern: String, variable: String },

    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),
}
