use std::fmt;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ParseFailed,
    UnknownProfile,
    NodeOutOfRange,
    InvalidMapping,
    EmptyKeepSet,
    OwnerOverrideLength,
    MutationStalled,
    IoFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ParseFailed => "E1001",
            Self::UnknownProfile => "E1002",
            Self::NodeOutOfRange => "E2001",
            Self::InvalidMapping => "E2002",
            Self::EmptyKeepSet => "E2003",
            Self::OwnerOverrideLength => "E2004",
            Self::MutationStalled => "E3001",
            Self::IoFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ParseFailed => "Malformed pgsolver input",
            Self::UnknownProfile => "Unknown mutation profile",
            Self::NodeOutOfRange => "Node id out of range",
            Self::InvalidMapping => "Mapping is not a permutation",
            Self::EmptyKeepSet => "Subgame would have no nodes",
            Self::OwnerOverrideLength => "Owner override length mismatch",
            Self::MutationStalled => "Mutation made no progress",
            Self::IoFailed => "I/O failure",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ParseFailed => Some("Check the `parity <max_id>;` header and that every node line ends with `;`."),
            Self::UnknownProfile => Some("Use profile 0 (remove-only), 1 (rewire) or 2 (full)."),
            Self::MutationStalled => Some("Raise `max_draws` or pick a profile with more applicable actions."),
            Self::IoFailed => Some("Check that the input exists and the output location is writable."),
            Self::NodeOutOfRange
            | Self::InvalidMapping
            | Self::EmptyKeepSet
            | Self::OwnerOverrideLength => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by game construction, restructuring and mutation.
///
/// Precondition failures of individual mutation actions are not errors;
/// the mutator retries those silently.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unknown mutation profile {0}")]
    UnknownProfile(String),

    #[error("node {node} out of range for a game with {n_nodes} nodes")]
    NodeOutOfRange { node: usize, n_nodes: usize },

    #[error("mapping is not a permutation of 0..{n_nodes}: {reason}")]
    InvalidMapping { n_nodes: usize, reason: String },

    #[error("cannot extract a subgame from an empty node set")]
    EmptyKeepSet,

    #[error("owner override has {actual} entries, source game has {expected} nodes")]
    OwnerOverrideLength { expected: usize, actual: usize },

    #[error("no mutation applied after {draws} draws ({remaining} edits still pending)")]
    MutationStalled { draws: u64, remaining: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GameError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// The stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { .. } => ErrorCode::ParseFailed,
            Self::UnknownProfile(_) => ErrorCode::UnknownProfile,
            Self::NodeOutOfRange { .. } => ErrorCode::NodeOutOfRange,
            Self::InvalidMapping { .. } => ErrorCode::InvalidMapping,
            Self::EmptyKeepSet => ErrorCode::EmptyKeepSet,
            Self::OwnerOverrideLength { .. } => ErrorCode::OwnerOverrideLength,
            Self::MutationStalled { .. } => ErrorCode::MutationStalled,
            Self::Io(_) => ErrorCode::IoFailed,
        }
    }
}

pub type Result<T, E = GameError> = std::result::Result<T, E>;
