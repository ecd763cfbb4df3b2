//! Shared host-side state: credentials in, status messages out.
//!
//! A host keeps one [`SessionState`] shared between its UI and its audio
//! code. The bridges never see it; they receive snapshots taken under the
//! lock and hand back results that are recorded here for display.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::error::BridgeError;
use crate::request::{
    BirthRequest, StreamingRequest, DEFAULT_BASE_MODEL, DEFAULT_INHERIT, DEFAULT_RANDOMNESS,
};

pub const PROCESS_OK_STATUS: &str = "Bridge process ok";

/// Reasons a birth request is rejected before reaching the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Select both parent audio files")]
    MissingParents,
    #[error("Enter a child user name")]
    MissingChildName,
    #[error("Choose an output path for the child voice")]
    MissingOutputPath,
    #[error("Enter the VoiceDNA password")]
    MissingPassword,
}

/// Last reported bridge status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub ok: bool,
    pub message: String,
}

/// User-supplied birth parameters; the password comes from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct BirthParams {
    pub parent_a: PathBuf,
    pub parent_b: PathBuf,
    pub child_user_name: String,
    pub inherit_a: f32,
    pub inherit_b: f32,
    pub randomness: f32,
    pub output_path: PathBuf,
}

impl Default for BirthParams {
    fn default() -> Self {
        Self {
            parent_a: PathBuf::new(),
            parent_b: PathBuf::new(),
            child_user_name: String::new(),
            inherit_a: DEFAULT_INHERIT,
            inherit_b: DEFAULT_INHERIT,
            randomness: DEFAULT_RANDOMNESS,
            output_path: PathBuf::new(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    dna_path: PathBuf,
    password: String,
    base_model: String,
    status: Status,
}

/// Lock-guarded credentials and status shared between UI and audio code.
#[derive(Debug)]
pub struct SessionState {
    inner: Mutex<Inner>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                dna_path: PathBuf::new(),
                password: String::new(),
                base_model: DEFAULT_BASE_MODEL.to_string(),
                status: Status {
                    ok: true,
                    message: "Idle".to_string(),
                },
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_dna(&self, dna_path: impl Into<PathBuf>, password: impl Into<String>) {
        let mut inner = self.lock();
        inner.dna_path = dna_path.into();
        inner.password = password.into();
    }

    pub fn set_base_model(&self, base_model: impl Into<String>) {
        self.lock().base_model = base_model.into();
    }

    /// Snapshots the credentials together with the per-block parameters.
    pub fn streaming_request(&self, force_age: f32, imprint_strength: f32) -> StreamingRequest {
        let inner = self.lock();
        StreamingRequest {
            dna_path: inner.dna_path.clone(),
            password: inner.password.clone(),
            force_age,
            imprint_strength,
            base_model: inner.base_model.clone(),
        }
    }

    /// Validates `params` and combines them with the session password.
    pub fn birth_request(&self, params: BirthParams) -> Result<BirthRequest, SessionError> {
        if params.parent_a.as_os_str().is_empty() || params.parent_b.as_os_str().is_empty() {
            return Err(SessionError::MissingParents);
        }
        if params.child_user_name.trim().is_empty() {
            return Err(SessionError::MissingChildName);
        }
        if params.output_path.as_os_str().is_empty() {
            return Err(SessionError::MissingOutputPath);
        }
        let password = self.lock().password.clone();
        if password.is_empty() {
            return Err(SessionError::MissingPassword);
        }

        Ok(BirthRequest {
            parent_a: params.parent_a,
            parent_b: params.parent_b,
            child_user_name: params.child_user_name,
            inherit_a: params.inherit_a,
            inherit_b: params.inherit_b,
            randomness: params.randomness,
            output_path: params.output_path,
            password,
        })
    }

    pub fn record_process(&self, result: &Result<(), BridgeError>) {
        let status = match result {
            Ok(()) => Status {
                ok: true,
                message: PROCESS_OK_STATUS.to_string(),
            },
            Err(e) => Status {
                ok: false,
                message: format!("Bridge error: {}", e),
            },
        };
        self.lock().status = status;
    }

    pub fn record_birth(&self, result: &Result<String, BridgeError>) {
        let status = match result {
            Ok(message) => Status {
                ok: true,
                message: message.clone(),
            },
            Err(e) => Status {
                ok: false,
                message: format!("Birth error: {}", e),
            },
        };
        self.lock().status = status;
    }

    /// Records a request rejected before it reached the bridge.
    pub fn record_rejection(&self, err: &SessionError) {
        self.lock().status = Status {
            ok: false,
            message: err.to_string(),
        };
    }

    pub fn last_status(&self) -> Status {
        self.lock().status.clone()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
