//! VoiceDNA Engine Bridge
//!
//! This crate lets a real-time audio host hand audio to the external VoiceDNA
//! engine and get results back. It also recovers cleanly when the engine is
//! slow, missing, or fails.
//!
//! # Overview
//!
//! There are two operations:
//!
//! - **Block processing** ([`StreamingBridge::process_block`]) - encode a block
//!   to a temporary WAV, run the engine in `process` mode, decode its output WAV
//!   and merge it back into the caller's buffer
//! - **Voice birth** ([`SynthesisBridge::birth`]) - run the engine in `birth`
//!   mode on two parent recordings and return its status line
//!
//! # Architecture
//!
//! 1. **Rust bridge** - validates input, owns temporary files, enforces deadlines
//! 2. **Engine** - a separate process that does the real work (normally
//!    `python3 vst3/bridge_runtime.py`), reached through the [`Engine`] trait
//!
//! Communication is through argv, exit code, stdout and WAV files:
//! - every flag value is a discrete argument, never a shell string
//! - exit code 0 is success; stdout carries a status or error message
//! - block audio travels as 16-bit PCM WAV in a per-call scratch directory
//!
//! # Deadlines
//!
//! | Operation | Default deadline |
//! |-----------|------------------|
//! | Block processing | 1.2 s |
//! | Voice birth | 15 s |
//!
//! An engine still running at its deadline is killed and the call fails with
//! [`BridgeError::Timeout`]. Calls block their thread for up to the deadline,
//! so do not call them directly from an audio callback.
//!
//! # Example
//!
//! ```ignore
//! use voicedna_bridge::{AudioBlock, BridgeConfig, StreamingBridge, StreamingRequest, SubprocessEngine};
//!
//! let config = BridgeConfig::with_repo_root("/opt/voicedna");
//! let engine = SubprocessEngine::from_config(&config)?;
//! let bridge = StreamingBridge::new(engine, &config);
//!
//! let mut block = AudioBlock::silence(2, 512, 48000.0);
//! bridge.process_block(&mut block, &StreamingRequest::new("me.voicedna.enc", "secret"))?;
//! ```
//!
//! # Crate Structure
//!
//! - [`block`] - In-memory audio buffers
//! - [`codec`] - WAV encode/decode
//! - [`invoker`] - Deadline-bounded subprocess execution
//! - [`engine`] - The engine seam and its argv protocol
//! - [`streaming`] - Block processing
//! - [`synthesis`] - Voice birth
//! - [`session`] - Shared credentials and status for hosts
//! - [`report`] - Engine JSON status lines
//! - [`config`] - Configuration and engine discovery
//! - [`error`] - Error types

pub mod block;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod invoker;
pub mod report;
pub mod request;
pub mod session;
pub mod streaming;
pub mod synthesis;

// Re-export main types at crate root
pub use block::AudioBlock;
pub use config::BridgeConfig;
pub use engine::{Engine, EngineMode, ProcessJob, SubprocessEngine};
pub use error::{BridgeError, BridgeResult, DecodeError, EncodeError, ErrorKind, LaunchError};
pub use invoker::{ProcessInvoker, ProcessOutcome};
pub use report::EngineReport;
pub use request::{BirthRequest, StreamingRequest};
pub use session::{BirthParams, SessionError, SessionState, Status};
pub use streaming::StreamingBridge;
pub use synthesis::{SynthesisBridge, BIRTH_COMPLETED_MESSAGE};
