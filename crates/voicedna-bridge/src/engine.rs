//! The external engine seam.
//!
//! Bridges talk to the engine only through [`Engine`], so tests can swap in
//! an in-process fake. [`SubprocessEngine`] is the production implementation:
//!
//! ```text
//! <interpreter> <script> process --dna-path <p> --password <pw> --input-wav <in> --output-wav <out> \
//!     --base-model <m> --force-age <2dp> --imprint-strength <3dp>
//! <interpreter> <script> birth --parent-a <a> --parent-b <b> --child-user <u> --inherit-a <2dp> \
//!     --inherit-b <2dp> --randomness <2dp> --out <path> --password <pw>
//! ```
//!
//! Exit code 0 means success. Stdout carries a status line either way.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::BridgeConfig;
use crate::error::{BridgeResult, LaunchError};
use crate::invoker::{ProcessInvoker, ProcessOutcome};
use crate::request::{BirthRequest, StreamingRequest};

/// Engine operation selector, passed as the first argument after the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// Transform one audio block.
    Process,
    /// Derive a new voice from two parents.
    Birth,
}

impl EngineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMode::Process => "process",
            EngineMode::Birth => "birth",
        }
    }
}

/// Files and parameters for one block-processing run.
#[derive(Debug, Clone, Copy)]
pub struct ProcessJob<'a> {
    pub request: &'a StreamingRequest,
    /// WAV the engine reads.
    pub input_path: &'a Path,
    /// WAV the engine must write before exiting 0.
    pub output_path: &'a Path,
}

/// An external processing engine.
pub trait Engine {
    /// Transforms the WAV at `job.input_path` into `job.output_path`.
    fn process(&self, job: &ProcessJob<'_>, deadline: Duration)
        -> Result<ProcessOutcome, LaunchError>;

    /// Creates a child voice at `request.output_path`.
    fn birth(&self, request: &BirthRequest, deadline: Duration)
        -> Result<ProcessOutcome, LaunchError>;
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn process(
        &self,
        job: &ProcessJob<'_>,
        deadline: Duration,
    ) -> Result<ProcessOutcome, LaunchError> {
        (**self).process(job, deadline)
    }

    fn birth(
        &self,
        request: &BirthRequest,
        deadline: Duration,
    ) -> Result<ProcessOutcome, LaunchError> {
        (**self).birth(request, deadline)
    }
}

/// Builds the argument vector for [`EngineMode::Process`], mode first.
pub fn process_args(job: &ProcessJob<'_>) -> Vec<String> {
    let req = job.request;
    vec![
        EngineMode::Process.as_str().to_string(),
        "--dna-path".to_string(),
        req.dna_path.to_string_lossy().into_owned(),
        "--password".to_string(),
        req.password.clone(),
        "--input-wav".to_string(),
        job.input_path.to_string_lossy().into_owned(),
        "--output-wav".to_string(),
        job.output_path.to_string_lossy().into_owned(),
        "--base-model".to_string(),
        req.base_model.clone(),
        "--force-age".to_string(),
        format!("{:.2}", req.force_age),
        "--imprint-strength".to_string(),
        format!("{:.3}", req.imprint_strength),
    ]
}

/// Builds the argument vector for [`EngineMode::Birth`], mode first.
pub fn birth_args(req: &BirthRequest) -> Vec<String> {
    vec![
        EngineMode::Birth.as_str().to_string(),
        "--parent-a".to_string(),
        req.parent_a.to_string_lossy().into_owned(),
        "--parent-b".to_string(),
        req.parent_b.to_string_lossy().into_owned(),
        "--child-user".to_string(),
        req.child_user_name.clone(),
        "--inherit-a".to_string(),
        format!("{:.2}", req.inherit_a),
        "--inherit-b".to_string(),
        format!("{:.2}", req.inherit_b),
        "--randomness".to_string(),
        format!("{:.2}", req.randomness),
        "--out".to_string(),
        req.output_path.to_string_lossy().into_owned(),
        "--password".to_string(),
        req.password.clone(),
    ]
}

/// Runs the engine as `<interpreter> <script> <mode> [--flag value]...`.
#[derive(Debug, Clone)]
pub struct SubprocessEngine {
    interpreter: PathBuf,
    script: PathBuf,
    invoker: ProcessInvoker,
}

impl SubprocessEngine {
    pub fn new(interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            invoker: ProcessInvoker::new(),
        }
    }

    /// Resolves interpreter and script from `config`.
    pub fn from_config(config: &BridgeConfig) -> BridgeResult<Self> {
        let interpreter = config.resolve_interpreter()?;
        let script = config.resolve_script()?;
        tracing::debug!(
            interpreter = %interpreter.display(),
            script = %script.display(),
            "resolved engine"
        );
        Ok(Self::new(interpreter, script)
            .with_invoker(ProcessInvoker::new().output_cap(config.output_cap_bytes)))
    }

    pub fn with_invoker(mut self, invoker: ProcessInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    fn invoke(&self, mode_args: Vec<String>, deadline: Duration) -> Result<ProcessOutcome, LaunchError> {
        let mut args = Vec::with_capacity(mode_args.len() + 1);
        args.push(self.script.to_string_lossy().into_owned());
        args.extend(mode_args);
        self.invoker.run(&self.interpreter, &args, deadline)
    }
}

impl Engine for SubprocessEngine {
    fn process(
        &self,
        job: &ProcessJob<'_>,
        deadline: Duration,
    ) -> Result<ProcessOutcome, LaunchError> {
        self.invoke(process_args(job), deadline)
    }

    fn birth(
        &self,
        request: &BirthRequest,
        deadline: Duration,
    ) -> Result<ProcessOutcome, LaunchError> {
        self.invoke(birth_args(request), deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engine_mode_as_str() {
        assert_eq!(EngineMode::Process.as_str(), "process");
        assert_eq!(EngineMode::Birth.as_str(), "birth");
    }

    #[test]
    fn test_process_args_layout_and_precision() {
        let request = StreamingRequest::new("/data/my voice.dna", "p@ss \"word\"")
            .force_age(7.456)
            .imprint_strength(0.68);
        let job = ProcessJob {
            request: &request,
            input_path: Path::new("/tmp/in.wav"),
            output_path: Path::new("/tmp/out.wav"),
        };

        assert_eq!(
            process_args(&job),
            vec![
                "process",
                "--dna-path",
                "/data/my voice.dna",
                "--password",
                "p@ss \"word\"",
                "--input-wav",
                "/tmp/in.wav",
                "--output-wav",
                "/tmp/out.wav",
                "--base-model",
                "vst3_reaper",
                "--force-age",
                "7.46",
                "--imprint-strength",
                "0.680",
            ]
        );
    }

    #[test]
    fn test_birth_args_layout_and_precision() {
        let request = BirthRequest::new("a.wav", "b.wav", "kid one", "out/child", "")
            .inheritance(66.666, 33.3)
            .randomness(5.0);

        assert_eq!(
            birth_args(&request),
            vec![
                "birth",
                "--parent-a",
                "a.wav",
                "--parent-b",
                "b.wav",
                "--child-user",
                "kid one",
                "--inherit-a",
                "66.67",
                "--inherit-b",
                "33.30",
                "--randomness",
                "5.00",
                "--out",
                "out/child",
                "--password",
                "",
            ]
        );
    }

    #[test]
    fn test_from_config_resolves_engine() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("engine.py");
        std::fs::write(&script, "").unwrap();
        let interpreter = std::env::current_exe().unwrap();

        let config = BridgeConfig::default()
            .interpreter(&interpreter)
            .script_path(&script);
        let engine = SubprocessEngine::from_config(&config).unwrap();

        assert_eq!(engine.interpreter(), interpreter.as_path());
        assert_eq!(engine.script(), script.as_path());
    }

    #[test]
    #[cfg(unix)]
    fn test_subprocess_engine_passes_script_then_mode() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("engine.sh");
        std::fs::write(&script, "printf '%s ' \"$1\" \"$3\"\n").unwrap();

        let engine = SubprocessEngine::new("/bin/sh", &script);
        let request = BirthRequest::new("a.wav", "b.wav", "kid", "out", "pw");
        let outcome = engine.birth(&request, Duration::from_secs(5)).unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.captured_text, "birth a.wav ");
    }
}
