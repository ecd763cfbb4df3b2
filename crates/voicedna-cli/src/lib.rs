//! VoiceDNA CLI library.
//!
//! Command implementations for the `voicedna` binary. The binary plays the
//! role of a host: it owns a [`voicedna_bridge::SessionState`], feeds audio
//! through the bridges and prints the resulting status.

pub mod commands;
pub mod logging;
