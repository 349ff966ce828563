/// Result alias for fallible configuration and evaluator operations.
pub type MotionResult<T> = Result<T, MotionError>;

/// General error for configuration, animation parameters and session plumbing.
#[derive(thiserror::Error, Debug)]
pub enum MotionError {
    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid animation parameters (ranges, spring configs).
    #[error("animation error: {0}")]
    Animation(String),

    /// Failure while evaluating a frame outside the supervised render path.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MotionError {
    /// Build a [`MotionError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MotionError::Animation`].
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`MotionError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`MotionError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Stable label for each failure class, carried by diagnostic scenes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Blacklisted construct found before execution. The code never ran.
    ValidationRejected,
    /// Syntax error or missing entry symbol at load time.
    CompileError,
    /// Failure raised while the scene code was executing.
    RuntimeError,
}

impl ErrorKind {
    /// Snake-case label used in diagnostic output.
    pub fn label(self) -> &'static str {
        match self {
            Self::ValidationRejected => "validation_rejected",
            Self::CompileError => "compile_error",
            Self::RuntimeError => "runtime_error",
        }
    }
}

/// Sub-kind of a load-time compile failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileErrorKind {
    /// The source failed to parse (includes references to unknown variables).
    Syntax,
    /// The source parsed but does not define the entry symbol with the expected arity.
    MissingExport,
}

/// Failure to turn a scene source into a scene factory. Terminal for that source.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The pattern validator matched a blacklisted signature.
    #[error("scene rejected: forbidden pattern `{pattern}` at line {line}: {excerpt}")]
    ValidationRejected {
        /// Label of the blacklist entry that matched.
        pattern: String,
        /// Bounded excerpt of the offending source text.
        excerpt: String,
        /// 1-based line of the match.
        line: usize,
    },

    /// The source could not be compiled or lacks the entry symbol.
    #[error("compile error ({kind:?}): {message}")]
    Compile {
        /// Syntax failure or missing entry symbol.
        kind: CompileErrorKind,
        /// Bounded, display-safe message.
        message: String,
    },

    /// The one-time evaluation of the top-level body raised an error.
    #[error("runtime error during load: {message}")]
    Runtime {
        /// Bounded, display-safe message.
        message: String,
    },
}

impl LoadError {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationRejected { .. } => ErrorKind::ValidationRejected,
            Self::Compile { .. } => ErrorKind::CompileError,
            Self::Runtime { .. } => ErrorKind::RuntimeError,
        }
    }
}

/// Failure of a single render invocation. Never outlives the frame it happened on.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Scene code raised an error (thrown value, unknown function, budget exceeded...).
    #[error("frame {frame}: {message}")]
    Runtime {
        /// Frame being rendered.
        frame: u64,
        /// Bounded, display-safe message.
        message: String,
    },

    /// A native capability panicked while serving the call.
    #[error("frame {frame}: capability panicked: {message}")]
    Panicked {
        /// Frame being rendered.
        frame: u64,
        /// Bounded, display-safe message.
        message: String,
    },

    /// The entry returned a value that is not a representable visual tree.
    #[error("frame {frame}: invalid visual tree: {message}")]
    Conversion {
        /// Frame being rendered.
        frame: u64,
        /// Bounded, display-safe message.
        message: String,
    },
}

impl RenderError {
    /// Frame this error belongs to.
    pub fn frame(&self) -> u64 {
        match self {
            Self::Runtime { frame, .. }
            | Self::Panicked { frame, .. }
            | Self::Conversion { frame, .. } => *frame,
        }
    }

    /// Message without the frame prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Runtime { message, .. }
            | Self::Panicked { message, .. }
            | Self::Conversion { message, .. } => message,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
