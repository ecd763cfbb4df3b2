//! Birth command implementation
//!
//! Derives a child VoiceDNA from two parent recordings.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use voicedna_bridge::{
    BirthParams, BridgeConfig, EngineReport, SessionState, SubprocessEngine, SynthesisBridge,
};

/// Options for the birth command.
#[derive(Debug, Clone)]
pub struct BirthOptions {
    pub parent_a: PathBuf,
    pub parent_b: PathBuf,
    pub child_user: String,
    pub out: PathBuf,
    pub inherit_a: f32,
    pub inherit_b: f32,
    pub randomness: f32,
    pub password: String,
}

/// Run the birth command
///
/// # Returns
/// Exit code: 0 if the engine reports success, 1 otherwise
pub fn run(config: &BridgeConfig, opts: &BirthOptions) -> Result<ExitCode> {
    let session = SessionState::new();
    session.set_dna(PathBuf::new(), opts.password.clone());

    let request = match session.birth_request(BirthParams {
        parent_a: opts.parent_a.clone(),
        parent_b: opts.parent_b.clone(),
        child_user_name: opts.child_user.clone(),
        inherit_a: opts.inherit_a,
        inherit_b: opts.inherit_b,
        randomness: opts.randomness,
        output_path: opts.out.clone(),
    }) {
        Ok(request) => request,
        Err(e) => {
            session.record_rejection(&e);
            eprintln!("{} {}", "!!".red(), session.last_status().message);
            return Ok(ExitCode::from(1));
        }
    };

    let engine = SubprocessEngine::from_config(config)?;
    let bridge = SynthesisBridge::new(engine, config);

    let result = bridge.birth(&request);
    session.record_birth(&result);
    let status = session.last_status();

    if let Err(e) = result {
        eprintln!("{} [{}] {}", "!!".red(), e.code(), status.message);
        return Ok(ExitCode::from(1));
    }

    match EngineReport::parse(&status.message) {
        Some(report) => {
            println!("{} Voice birth {}", "ok".green(), report.status);
            if let Some(child_id) = report.child_id {
                println!("  {} child id: {}", "->".green(), child_id);
            }
            if let Some(out) = report.out {
                println!("  {} written to: {}", "->".green(), out);
            }
        }
        None => println!("{} {}", "ok".green(), status.message),
    }
    Ok(ExitCode::SUCCESS)
}
