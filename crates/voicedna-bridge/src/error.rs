//! Error types for the VoiceDNA bridge.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Fallback message when the engine fails during block processing without saying why.
pub const PROCESS_FAILED_MESSAGE: &str = "External engine process failed";

/// Fallback message when the engine fails a birth without saying why.
pub const BIRTH_FAILED_MESSAGE: &str = "Birth process failed";

/// Errors from writing a block to a WAV file.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The target file could not be created or written.
    #[error("Failed to write WAV file {path}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Channel count or sample rate cannot be represented in the container.
    #[error("Unsupported WAV format: {reason}")]
    UnsupportedFormat { reason: String },
}

/// Errors from reading a WAV file back into a block.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file does not exist.
    #[error("WAV file not found: {path}")]
    NotFound { path: PathBuf },

    /// The header or body is malformed or uses an unsupported encoding.
    #[error("Unreadable WAV file {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// The file decoded to zero samples.
    #[error("WAV file {path} contains no samples")]
    EmptyResult { path: PathBuf },
}

/// The executable could not be started.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The OS refused to spawn the process (missing, not executable, ...).
    #[error("Failed to launch '{executable}': {source}")]
    SpawnFailed {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse error taxonomy, used by callers to pick a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing required input, detected before any I/O.
    Validation,
    /// File create/read/write failure.
    Io,
    /// The engine could not be started.
    Launch,
    /// The engine exceeded its deadline and was terminated.
    Timeout,
    /// The engine ran and reported failure through its exit code.
    ExternalFailure,
}

/// Errors returned by the streaming and synthesis bridges.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No VoiceDNA file configured.
    #[error("No VoiceDNA file selected")]
    NoCredentialedData,

    /// Writing the temporary input WAV failed.
    #[error("Failed writing temporary input WAV: {0}")]
    EncodeFailed(#[source] EncodeError),

    /// The engine produced no readable output WAV.
    #[error("Engine produced unreadable WAV output: {0}")]
    DecodeFailed(#[source] DecodeError),

    /// The per-call scratch directory could not be created.
    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// The engine could not be launched.
    #[error("{0}")]
    Launch(#[from] LaunchError),

    /// The engine script could not be located.
    #[error("Engine script not found at: {path}")]
    ScriptNotFound { path: PathBuf },

    /// No interpreter could be resolved to run the engine script.
    #[error("Engine interpreter not found. Install python3 or set VOICEDNA_PYTHON")]
    InterpreterNotFound,

    /// The engine exceeded its deadline and was terminated.
    #[error("Engine timed out after {} ms{}", .deadline.as_millis(), suffix(.captured_text))]
    Timeout {
        deadline: Duration,
        captured_text: String,
    },

    /// The engine exited non-zero while processing a block.
    #[error("{captured_text}")]
    ExternalProcessFailed {
        exit_code: Option<i32>,
        captured_text: String,
    },

    /// The engine exited non-zero during a voice birth.
    #[error("{message}")]
    SynthesisFailed {
        exit_code: Option<i32>,
        message: String,
    },

    /// The bridge configuration could not be loaded.
    #[error("Invalid bridge configuration {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },
}

fn suffix(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        String::new()
    } else {
        format!(": {}", text)
    }
}

impl BridgeError {
    /// Creates a block-processing failure, substituting a canned message for empty output.
    pub fn process_failed(exit_code: Option<i32>, captured_text: impl Into<String>) -> Self {
        Self::ExternalProcessFailed {
            exit_code,
            captured_text: non_empty_or(captured_text.into(), PROCESS_FAILED_MESSAGE),
        }
    }

    /// Creates a birth failure, substituting a canned message for empty output.
    pub fn synthesis_failed(exit_code: Option<i32>, captured_text: impl Into<String>) -> Self {
        Self::SynthesisFailed {
            exit_code,
            message: non_empty_or(captured_text.into(), BIRTH_FAILED_MESSAGE),
        }
    }

    pub fn timeout(deadline: Duration, captured_text: impl Into<String>) -> Self {
        Self::Timeout {
            deadline,
            captured_text: captured_text.into(),
        }
    }

    /// Returns the taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::NoCredentialedData => ErrorKind::Validation,
            BridgeError::EncodeFailed(_)
            | BridgeError::DecodeFailed(_)
            | BridgeError::Scratch(_)
            | BridgeError::ConfigInvalid { .. } => ErrorKind::Io,
            BridgeError::Launch(_)
            | BridgeError::ScriptNotFound { .. }
            | BridgeError::InterpreterNotFound => ErrorKind::Launch,
            BridgeError::Timeout { .. } => ErrorKind::Timeout,
            BridgeError::ExternalProcessFailed { .. } | BridgeError::SynthesisFailed { .. } => {
                ErrorKind::ExternalFailure
            }
        }
    }

    /// Returns a stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::NoCredentialedData => "BRIDGE_001",
            BridgeError::EncodeFailed(_) => "BRIDGE_002",
            BridgeError::DecodeFailed(_) => "BRIDGE_003",
            BridgeError::Scratch(_) => "BRIDGE_004",
            BridgeError::Launch(_) => "BRIDGE_005",
            BridgeError::ScriptNotFound { .. } => "BRIDGE_006",
            BridgeError::InterpreterNotFound => "BRIDGE_007",
            BridgeError::Timeout { .. } => "BRIDGE_008",
            BridgeError::ExternalProcessFailed { .. } => "BRIDGE_009",
            BridgeError::SynthesisFailed { .. } => "BRIDGE_010",
            BridgeError::ConfigInvalid { .. } => "BRIDGE_011",
        }
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
