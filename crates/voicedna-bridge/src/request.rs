//! Request snapshots handed to the bridges.
//!
//! Both request types carry a password. Their `Debug` output redacts it so a
//! stray `{:?}` in a log line cannot leak the credential.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FORCE_AGE: f32 = 12.0;
pub const DEFAULT_IMPRINT_STRENGTH: f32 = 0.68;
pub const DEFAULT_BASE_MODEL: &str = "vst3_reaper";

pub const DEFAULT_INHERIT: f32 = 50.0;
pub const DEFAULT_RANDOMNESS: f32 = 10.0;

/// Per-block processing parameters.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingRequest {
    /// Encrypted VoiceDNA file. Empty means nothing can be processed.
    pub dna_path: PathBuf,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub force_age: f32,
    pub imprint_strength: f32,
    pub base_model: String,
}

impl StreamingRequest {
    pub fn new(dna_path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self {
            dna_path: dna_path.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn force_age(mut self, years: f32) -> Self {
        self.force_age = years;
        self
    }

    pub fn imprint_strength(mut self, strength: f32) -> Self {
        self.imprint_strength = strength;
        self
    }

    pub fn base_model(mut self, model: impl Into<String>) -> Self {
        self.base_model = model.into();
        self
    }
}

impl Default for StreamingRequest {
    fn default() -> Self {
        Self {
            dna_path: PathBuf::new(),
            password: String::new(),
            force_age: DEFAULT_FORCE_AGE,
            imprint_strength: DEFAULT_IMPRINT_STRENGTH,
            base_model: DEFAULT_BASE_MODEL.to_string(),
        }
    }
}

impl fmt::Debug for StreamingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingRequest")
            .field("dna_path", &self.dna_path)
            .field("password", &"<redacted>")
            .field("force_age", &self.force_age)
            .field("imprint_strength", &self.imprint_strength)
            .field("base_model", &self.base_model)
            .finish()
    }
}

/// A request to derive a child voice from two parent recordings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthRequest {
    pub parent_a: PathBuf,
    pub parent_b: PathBuf,
    pub child_user_name: String,
    /// Weight of parent A, 0-100 by convention.
    pub inherit_a: f32,
    /// Weight of parent B, 0-100 by convention. Need not sum to 100 with `inherit_a`.
    pub inherit_b: f32,
    /// Jitter applied on top of the blend, 0-100.
    pub randomness: f32,
    pub output_path: PathBuf,
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl BirthRequest {
    pub fn new(
        parent_a: impl Into<PathBuf>,
        parent_b: impl Into<PathBuf>,
        child_user_name: impl Into<String>,
        output_path: impl Into<PathBuf>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            parent_a: parent_a.into(),
            parent_b: parent_b.into(),
            child_user_name: child_user_name.into(),
            inherit_a: DEFAULT_INHERIT,
            inherit_b: DEFAULT_INHERIT,
            randomness: DEFAULT_RANDOMNESS,
            output_path: output_path.into(),
            password: password.into(),
        }
    }

    pub fn inheritance(mut self, inherit_a: f32, inherit_b: f32) -> Self {
        self.inherit_a = inherit_a;
        self.inherit_b = inherit_b;
        self
    }

    pub fn randomness(mut self, randomness: f32) -> Self {
        self.randomness = randomness;
        self
    }
}

impl fmt::Debug for BirthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BirthRequest")
            .field("parent_a", &self.parent_a)
            .field("parent_b", &self.parent_b)
            .field("child_user_name", &self.child_user_name)
            .field("inherit_a", &self.inherit_a)
            .field("inherit_b", &self.inherit_b)
            .field("randomness", &self.randomness)
            .field("output_path", &self.output_path)
            .field("password", &"<redacted>")
            .finish()
    }
}
