//! Block-by-block processing through the external engine.
//!
//! One call runs `validate -> encode -> invoke -> decode -> merge`. All
//! temporary files live in a per-call scratch directory with a random name,
//! which is removed before the call returns on every path.
//!
//! Calls block for up to the configured deadline. Do not call
//! [`StreamingBridge::process_block`] from a real-time audio callback unless a
//! stall of that length is acceptable.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::block::AudioBlock;
use crate::codec;
use crate::config::BridgeConfig;
use crate::engine::{Engine, ProcessJob};
use crate::error::{BridgeError, BridgeResult};
use crate::request::StreamingRequest;

/// Name of the block written for the engine inside the scratch directory.
pub const INPUT_FILE: &str = "vdna_in.wav";

/// Name of the block the engine writes back inside the scratch directory.
pub const OUTPUT_FILE: &str = "vdna_out.wav";

const SCRATCH_PREFIX: &str = "vdna_";

/// Runs audio blocks through an [`Engine`].
#[derive(Debug, Clone)]
pub struct StreamingBridge<E> {
    engine: E,
    deadline: Duration,
    scratch_parent: PathBuf,
}

impl<E: Engine> StreamingBridge<E> {
    /// Creates a bridge using the streaming deadline and temp dir from `config`.
    pub fn new(engine: E, config: &BridgeConfig) -> Self {
        Self {
            engine,
            deadline: config.streaming_deadline_duration(),
            scratch_parent: config.scratch_parent(),
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

    /// Processes `buffer` in place.
    ///
    /// On success the overlapping channels/samples of the engine output are
    /// copied into `buffer`; the rest of `buffer` is left as it was. On any
    /// error `buffer` is untouched.
    pub fn process_block(
        &self,
        buffer: &mut AudioBlock,
        request: &StreamingRequest,
    ) -> BridgeResult<()> {
        if request.dna_path.as_os_str().is_empty() {
            return Err(BridgeError::NoCredentialedData);
        }

        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&self.scratch_parent)
            .map_err(BridgeError::Scratch)?;

        let start = Instant::now();
        let result = self.run_in(scratch.path(), buffer, request);

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::warn!(
                path = %scratch_path.display(),
                error = %e,
                "failed to remove scratch directory"
            );
        }

        tracing::debug!(
            channels = buffer.num_channels(),
            samples = buffer.num_samples(),
            ok = result.is_ok(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "processed block"
        );
        result
    }

    fn run_in(
        &self,
        dir: &Path,
        buffer: &mut AudioBlock,
        request: &StreamingRequest,
    ) -> BridgeResult<()> {
        let input_path = dir.join(INPUT_FILE);
        let output_path = dir.join(OUTPUT_FILE);

        codec::encode(buffer, &input_path).map_err(BridgeError::EncodeFailed)?;

        let job = ProcessJob {
            request,
            input_path: &input_path,
            output_path: &output_path,
        };
        let outcome = self.engine.process(&job, self.deadline)?;

        if outcome.timed_out {
            return Err(BridgeError::timeout(self.deadline, outcome.captured_text));
        }
        if !outcome.success() {
            tracing::warn!(exit_code = ?outcome.exit_code, "engine failed to process block");
            return Err(BridgeError::process_failed(
                outcome.exit_code,
                outcome.captured_text,
            ));
        }

        let decoded = codec::decode(&output_path, buffer.num_channels(), buffer.num_samples())
            .map_err(BridgeError::DecodeFailed)?;
        buffer.merge_overlap(&decoded);
        Ok(())
    }
}
