//! One-shot voice birth through the external engine.
//!
//! The engine reads both parents and writes the child itself, so this bridge
//! owns no files and has nothing to clean up.

use std::time::Duration;

use crate::config::BridgeConfig;
use crate::engine::Engine;
use crate::error::{BridgeError, BridgeResult};
use crate::request::BirthRequest;

/// Status returned when the engine succeeds without printing anything.
pub const BIRTH_COMPLETED_MESSAGE: &str = "Voice birth completed";

/// Runs voice births through an [`Engine`].
#[derive(Debug, Clone)]
pub struct SynthesisBridge<E> {
    engine: E,
    deadline: Duration,
}

impl<E: Engine> SynthesisBridge<E> {
    /// Creates a bridge using the synthesis deadline from `config`.
    pub fn new(engine: E, config: &BridgeConfig) -> Self {
        Self {
            engine,
            deadline: config.synthesis_deadline_duration(),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Births a child voice and returns the engine's status message.
    pub fn birth(&self, request: &BirthRequest) -> BridgeResult<String> {
        tracing::debug!(
            child = %request.child_user_name,
            out = %request.output_path.display(),
            "starting voice birth"
        );

        let outcome = self.engine.birth(request, self.deadline)?;

        if outcome.timed_out {
            return Err(BridgeError::timeout(self.deadline, outcome.captured_text));
        }
        if !outcome.success() {
            tracing::warn!(exit_code = ?outcome.exit_code, "voice birth failed");
            return Err(BridgeError::synthesis_failed(
                outcome.exit_code,
                outcome.captured_text,
            ));
        }

        let message = outcome.captured_text.trim();
        tracing::info!(
            child = %request.child_user_name,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "voice birth completed"
        );
        Ok(if message.is_empty() {
            BIRTH_COMPLETED_MESSAGE.to_string()
        } else {
            message.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProcessJob;
    use crate::error::{ErrorKind, LaunchError, BIRTH_FAILED_MESSAGE};
    use crate::invoker::ProcessOutcome;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Replays a canned outcome and remembers the deadline it was given.
    struct CannedEngine {
        outcome: ProcessOutcome,
        deadline: Mutex<Option<Duration>>,
    }

    impl CannedEngine {
        fn new(exit_code: Option<i32>, text: &str, timed_out: bool) -> Self {
            Self {
                outcome: ProcessOutcome {
                    exit_code,
                    captured_text: text.to_string(),
                    timed_out,
                    elapsed: Duration::from_millis(3),
                },
                deadline: Mutex::new(None),
            }
        }
    }

    impl Engine for CannedEngine {
        fn process(
            &self,
            _job: &ProcessJob<'_>,
            _deadline: Duration,
        ) -> Result<ProcessOutcome, LaunchError> {
            unreachable!("synthesis tests never process blocks")
        }

        fn birth(
            &self,
            _request: &BirthRequest,
            deadline: Duration,
        ) -> Result<ProcessOutcome, LaunchError> {
            *self.deadline.lock().unwrap() = Some(deadline);
            Ok(self.outcome.clone())
        }
    }

    fn request() -> BirthRequest {
        BirthRequest::new("a.wav", "b.wav", "kid", "out/kid.voicedna.enc", "pw")
    }

    #[test]
    fn test_success_returns_trimmed_text() {
        let bridge = SynthesisBridge::new(
            CannedEngine::new(Some(0), "  synced\n", false),
            &BridgeConfig::default(),
        );
        assert_eq!(bridge.birth(&request()).unwrap(), "synced");
    }

    #[test]
    fn test_success_without_text_uses_default_message() {
        let bridge = SynthesisBridge::new(
            CannedEngine::new(Some(0), "\n", false),
            &BridgeConfig::default(),
        );
        assert_eq!(bridge.birth(&request()).unwrap(), BIRTH_COMPLETED_MESSAGE);
    }

    #[test]
    fn test_failure_carries_engine_text() {
        let bridge = SynthesisBridge::new(
            CannedEngine::new(Some(1), "parent_b.wav: no such file", false),
            &BridgeConfig::default(),
        );
        let err = bridge.birth(&request()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExternalFailure);
        assert_eq!(err.to_string(), "parent_b.wav: no such file");
    }

    #[test]
    fn test_silent_failure_gets_canned_message() {
        let bridge = SynthesisBridge::new(
            CannedEngine::new(Some(3), "", false),
            &BridgeConfig::default(),
        );
        let err = bridge.birth(&request()).unwrap_err();
        assert_eq!(err.to_string(), BIRTH_FAILED_MESSAGE);
    }

    #[test]
    fn test_timeout_is_typed() {
        let bridge = SynthesisBridge::new(
            CannedEngine::new(None, "", true),
            &BridgeConfig::default(),
        );
        let err = bridge.birth(&request()).unwrap_err();
        assert!(matches!(err, BridgeError::Timeout { .. }));
    }

    #[test]
    fn test_uses_synthesis_deadline() {
        let config = BridgeConfig::default();
        let bridge = SynthesisBridge::new(CannedEngine::new(Some(0), "ok", false), &config);
        bridge.birth(&request()).unwrap();
        assert_eq!(
            *bridge.engine().deadline.lock().unwrap(),
            Some(config.synthesis_deadline_duration())
        );
    }
}
