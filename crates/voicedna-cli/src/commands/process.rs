//! Process command implementation
//!
//! Runs a WAV file through the engine block by block, the way a host
//! plugin feeds its audio callback buffers to the bridge.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use voicedna_bridge::{
    codec, AudioBlock, BridgeConfig, BridgeError, Engine, SessionState, StreamingBridge,
    SubprocessEngine,
};

/// Options for the process command.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dna: PathBuf,
    pub password: String,
    pub force_age: f32,
    pub imprint_strength: f32,
    pub base_model: String,
    /// Samples per block; 0 sends the whole file as one block.
    pub block_size: usize,
}

/// A block the engine rejected.
#[derive(Debug)]
pub struct BlockFailure {
    pub index: usize,
    pub error: BridgeError,
}

/// Run the process command
///
/// # Returns
/// Exit code: 0 on success, 1 if any block fails
pub fn run(config: &BridgeConfig, opts: &ProcessOptions) -> Result<ExitCode> {
    let audio = codec::decode(&opts.input, 0, 0)
        .with_context(|| format!("Failed to read input WAV '{}'", opts.input.display()))?;

    let engine = SubprocessEngine::from_config(config)?;
    let bridge = StreamingBridge::new(engine, config);

    let session = SessionState::new();
    session.set_dna(&opts.dna, opts.password.clone());
    session.set_base_model(opts.base_model.clone());

    let processed = match process_in_blocks(
        &bridge,
        &session,
        &audio,
        opts.block_size,
        opts.force_age,
        opts.imprint_strength,
    ) {
        Ok(block) => block,
        Err(failure) => {
            eprintln!(
                "{} block {} failed [{}]: {}",
                "!!".red(),
                failure.index,
                failure.error.code(),
                session.last_status().message
            );
            return Ok(ExitCode::from(1));
        }
    };

    codec::encode(&processed, &opts.output)
        .with_context(|| format!("Failed to write output WAV '{}'", opts.output.display()))?;

    println!(
        "{} {} ({} ch, {} samples @ {} Hz)",
        "ok".green(),
        opts.output.display(),
        processed.num_channels(),
        processed.num_samples(),
        processed.sample_rate()
    );
    Ok(ExitCode::SUCCESS)
}

/// Feeds `audio` through `bridge` in blocks of `block_size` samples.
///
/// Each block takes a fresh request snapshot from `session` and records its
/// status there. Stops at the first failing block.
pub fn process_in_blocks<E: Engine>(
    bridge: &StreamingBridge<E>,
    session: &SessionState,
    audio: &AudioBlock,
    block_size: usize,
    force_age: f32,
    imprint_strength: f32,
) -> Result<AudioBlock, BlockFailure> {
    let total = audio.num_samples();
    let size = if block_size == 0 { total.max(1) } else { block_size };

    let mut out = AudioBlock::silence(audio.num_channels(), 0, audio.sample_rate());
    for (index, start) in (0..total).step_by(size).enumerate() {
        let mut block = audio.slice(start, size);
        let request = session.streaming_request(force_age, imprint_strength);

        let result = bridge.process_block(&mut block, &request);
        session.record_process(&result);
        if let Err(error) = result {
            return Err(BlockFailure { index, error });
        }
        out.append(&block);
    }
    Ok(out)
}
