//! Bridge configuration and engine location.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};
use crate::invoker::DEFAULT_OUTPUT_CAP;

/// Default deadline for one streamed block (1.2 seconds).
pub const DEFAULT_STREAMING_DEADLINE_MS: u64 = 1200;

/// Default deadline for a voice birth (15 seconds).
pub const DEFAULT_SYNTHESIS_DEADLINE_MS: u64 = 15_000;

/// Engine script location relative to the repository root.
pub const ENGINE_SCRIPT_RELATIVE: &str = "vst3/bridge_runtime.py";

/// Environment variable overriding the interpreter.
pub const ENV_PYTHON: &str = "VOICEDNA_PYTHON";

/// Environment variable overriding the engine script.
pub const ENV_SCRIPT: &str = "VOICEDNA_BRIDGE_SCRIPT";

/// Configuration shared by both bridges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Interpreter used to run the engine script.
    pub interpreter: Option<PathBuf>,
    /// Explicit engine script; otherwise derived from `repo_root`.
    pub script_path: Option<PathBuf>,
    /// Root of the VoiceDNA checkout.
    pub repo_root: PathBuf,
    pub streaming_deadline_ms: u64,
    pub synthesis_deadline_ms: u64,
    /// Capture limit per output stream, in bytes.
    pub output_cap_bytes: usize,
    /// Parent of per-call scratch directories. Defaults to the OS temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            script_path: None,
            repo_root: PathBuf::from("."),
            streaming_deadline_ms: DEFAULT_STREAMING_DEADLINE_MS,
            synthesis_deadline_ms: DEFAULT_SYNTHESIS_DEADLINE_MS,
            output_cap_bytes: DEFAULT_OUTPUT_CAP,
            temp_dir: None,
        }
    }
}

impl BridgeConfig {
    /// Creates a config rooted at the given repository checkout.
    pub fn with_repo_root(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            ..Default::default()
        }
    }

    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> BridgeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BridgeError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| BridgeError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn interpreter(mut self, path: impl Into<PathBuf>) -> Self {
        self.interpreter = Some(path.into());
        self
    }

    pub fn script_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.script_path = Some(path.into());
        self
    }

    pub fn streaming_deadline(mut self, deadline: Duration) -> Self {
        self.streaming_deadline_ms = deadline.as_millis() as u64;
        self
    }

    pub fn synthesis_deadline(mut self, deadline: Duration) -> Self {
        self.synthesis_deadline_ms = deadline.as_millis() as u64;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn streaming_deadline_duration(&self) -> Duration {
        Duration::from_millis(self.streaming_deadline_ms)
    }

    pub fn synthesis_deadline_duration(&self) -> Duration {
        Duration::from_millis(self.synthesis_deadline_ms)
    }

    /// Directory under which per-call scratch directories are created.
    pub fn scratch_parent(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Finds the interpreter executable.
    ///
    /// Order: config override, `VOICEDNA_PYTHON`, `python3` on PATH, `python` on PATH.
    pub fn resolve_interpreter(&self) -> BridgeResult<PathBuf> {
        if let Some(ref path) = self.interpreter {
            if path.exists() {
                return Ok(path.clone());
            }
            // Bare names like "python3.11" are looked up on PATH.
            if let Ok(found) = which::which(path) {
                return Ok(found);
            }
        }

        if let Ok(path) = std::env::var(ENV_PYTHON) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        for name in ["python3", "python"] {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        Err(BridgeError::InterpreterNotFound)
    }

    /// Finds the engine script.
    ///
    /// Order: config override, `VOICEDNA_BRIDGE_SCRIPT`, `<repo_root>/vst3/bridge_runtime.py`.
    pub fn resolve_script(&self) -> BridgeResult<PathBuf> {
        if let Some(ref path) = self.script_path {
            if path.is_file() {
                return Ok(path.clone());
            }
            return Err(BridgeError::ScriptNotFound { path: path.clone() });
        }

        if let Ok(path) = std::env::var(ENV_SCRIPT) {
            let path = PathBuf::from(path);
            if path.is_file() {
                return Ok(path);
            }
            return Err(BridgeError::ScriptNotFound { path });
        }

        let path = self.repo_root.join(ENGINE_SCRIPT_RELATIVE);
        if path.is_file() {
            Ok(path)
        } else {
            Err(BridgeError::ScriptNotFound { path })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.streaming_deadline_duration(), Duration::from_millis(1200));
        assert_eq!(config.synthesis_deadline_duration(), Duration::from_secs(15));
        assert_eq!(config.output_cap_bytes, 64 * 1024);
        assert!(config.synthesis_deadline_ms >= 10 * config.streaming_deadline_ms);
    }

    #[test]
    fn test_builder() {
        let config = BridgeConfig::with_repo_root("/opt/voicedna")
            .interpreter("/usr/bin/python3")
            .streaming_deadline(Duration::from_millis(500))
            .synthesis_deadline(Duration::from_secs(30));

        assert_eq!(config.repo_root, PathBuf::from("/opt/voicedna"));
        assert_eq!(config.interpreter, Some(PathBuf::from("/usr/bin/python3")));
        assert_eq!(config.streaming_deadline_ms, 500);
        assert_eq!(config.synthesis_deadline_ms, 30_000);
    }

    #[test]
    fn test_from_json_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        std::fs::write(&path, r#"{ "repo_root": "/srv/vdna", "streaming_deadline_ms": 800 }"#)
            .unwrap();

        let config = BridgeConfig::from_json_file(&path).unwrap();
        assert_eq!(config.repo_root, PathBuf::from("/srv/vdna"));
        assert_eq!(config.streaming_deadline_ms, 800);
        assert_eq!(config.synthesis_deadline_ms, DEFAULT_SYNTHESIS_DEADLINE_MS);
    }

    #[test]
    fn test_from_json_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = BridgeConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, BridgeError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_resolve_script_from_repo_root() {
        if std::env::var_os(ENV_SCRIPT).is_some() {
            eprintln!("{} is set; skipping repo-root resolution test", ENV_SCRIPT);
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::with_repo_root(dir.path());
        assert!(matches!(
            config.resolve_script(),
            Err(BridgeError::ScriptNotFound { .. })
        ));

        std::fs::create_dir_all(dir.path().join("vst3")).unwrap();
        std::fs::write(dir.path().join(ENGINE_SCRIPT_RELATIVE), "").unwrap();
        assert_eq!(
            config.resolve_script().unwrap(),
            dir.path().join(ENGINE_SCRIPT_RELATIVE)
        );
    }

    #[test]
    fn test_explicit_script_wins() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("engine.py");
        std::fs::write(&script, "").unwrap();
        let config = BridgeConfig::with_repo_root("/nonexistent").script_path(&script);
        assert_eq!(config.resolve_script().unwrap(), script);

        let missing = BridgeConfig::default().script_path(dir.path().join("gone.py"));
        assert!(matches!(
            missing.resolve_script(),
            Err(BridgeError::ScriptNotFound { .. })
        ));
    }

    #[test]
    fn test_explicit_interpreter_wins() {
        let config = BridgeConfig::default().interpreter("/bin/sh");
        if cfg!(unix) {
            assert_eq!(config.resolve_interpreter().unwrap(), PathBuf::from("/bin/sh"));
        }
    }
}
