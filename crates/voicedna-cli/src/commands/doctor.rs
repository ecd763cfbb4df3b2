//! Doctor command implementation
//!
//! Checks that the engine can be found and launched.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;
use voicedna_bridge::{BridgeConfig, SubprocessEngine};

/// Run the doctor command
///
/// Checks:
/// - Engine interpreter
/// - Engine script
/// - Scratch directory permissions
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(config: &BridgeConfig) -> Result<ExitCode> {
    println!("{}", "VoiceDNA Doctor".cyan().bold());
    println!("{}", "===============".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} voicedna-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Engine:".bold());
    match config.resolve_interpreter() {
        Ok(path) => println!("  {} interpreter {}", "ok".green(), path.display()),
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            all_ok = false;
        }
    }
    match config.resolve_script() {
        Ok(path) => println!("  {} script {}", "ok".green(), path.display()),
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            println!(
                "     {}",
                "Pass --repo-root or --script, or set VOICEDNA_BRIDGE_SCRIPT.".dimmed()
            );
            all_ok = false;
        }
    }
    if all_ok {
        let engine = SubprocessEngine::from_config(config)?;
        println!(
            "  {} command: {} {}",
            "->".green(),
            engine.interpreter().display(),
            engine.script().display()
        );
    }
    println!(
        "  {} deadlines: block {} ms, birth {} ms",
        "->".green(),
        config.streaming_deadline_ms,
        config.synthesis_deadline_ms
    );
    println!();

    println!("{}", "Permissions:".bold());
    let parent = config.scratch_parent();
    match tempfile::Builder::new().prefix("vdna_").tempdir_in(&parent) {
        Ok(dir) => {
            let _ = dir.close();
            println!(
                "  {} Scratch directory is writable ({})",
                "ok".green(),
                parent.display()
            );
        }
        Err(e) => {
            println!(
                "  {} Cannot write to scratch directory {}: {}",
                "!!".red(),
                parent.display(),
                e
            );
            all_ok = false;
        }
    }
    println!();

    if all_ok {
        println!("{}", "All checks passed.".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", "Some checks failed.".red().bold());
        Ok(ExitCode::from(1))
    }
}
