//! VoiceDNA CLI - Command-line host for the VoiceDNA engine bridge
//!
//! This binary runs audio through the external VoiceDNA engine, births new
//! voices from parent recordings, and checks the engine installation.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use voicedna_bridge::request::{
    DEFAULT_BASE_MODEL, DEFAULT_FORCE_AGE, DEFAULT_IMPRINT_STRENGTH, DEFAULT_INHERIT,
    DEFAULT_RANDOMNESS,
};
use voicedna_bridge::BridgeConfig;
use voicedna_cli::commands;

/// VoiceDNA - External engine bridge
#[derive(Parser)]
#[command(name = "voicedna")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Bridge configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// VoiceDNA repository root containing vst3/bridge_runtime.py
    #[arg(long, global = true)]
    repo_root: Option<PathBuf>,

    /// Interpreter used to run the engine script
    #[arg(long, global = true)]
    python: Option<PathBuf>,

    /// Engine script (overrides --repo-root)
    #[arg(long, global = true)]
    script: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a WAV file through the engine block by block
    Process {
        /// Input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Encrypted VoiceDNA file
        #[arg(long)]
        dna: PathBuf,

        /// VoiceDNA password
        #[arg(long, env = "VOICEDNA_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,

        /// Target voice age in years
        #[arg(long, default_value_t = DEFAULT_FORCE_AGE)]
        force_age: f32,

        /// Imprint strength (0-1)
        #[arg(long, default_value_t = DEFAULT_IMPRINT_STRENGTH)]
        imprint_strength: f32,

        /// Engine base model
        #[arg(long, default_value = DEFAULT_BASE_MODEL)]
        base_model: String,

        /// Samples per block (0 = whole file)
        #[arg(long, default_value_t = 0)]
        block_size: usize,
    },

    /// Derive a child VoiceDNA from two parent recordings
    Birth {
        /// First parent audio file
        #[arg(long)]
        parent_a: PathBuf,

        /// Second parent audio file
        #[arg(long)]
        parent_b: PathBuf,

        /// User name for the child voice
        #[arg(long)]
        child_user: String,

        /// Output path for the child VoiceDNA
        #[arg(long)]
        out: PathBuf,

        /// Inheritance from parent A (0-100)
        #[arg(long, default_value_t = DEFAULT_INHERIT)]
        inherit_a: f32,

        /// Inheritance from parent B (0-100)
        #[arg(long, default_value_t = DEFAULT_INHERIT)]
        inherit_b: f32,

        /// Randomness (0-100)
        #[arg(long, default_value_t = DEFAULT_RANDOMNESS)]
        randomness: f32,

        /// Password for the child VoiceDNA
        #[arg(long, env = "VOICEDNA_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
    },

    /// Check engine installation and configuration
    Doctor,
}

fn load_config(cli: &Cli) -> anyhow::Result<BridgeConfig> {
    let mut config = match cli.config {
        Some(ref path) => BridgeConfig::from_json_file(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(ref root) = cli.repo_root {
        config.repo_root = root.clone();
    }
    if let Some(ref python) = cli.python {
        config.interpreter = Some(python.clone());
    }
    if let Some(ref script) = cli.script {
        config.script_path = Some(script.clone());
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    voicedna_cli::logging::init(cli.verbose);

    let result = load_config(&cli).and_then(|config| match cli.command {
        Commands::Process {
            input,
            output,
            dna,
            password,
            force_age,
            imprint_strength,
            base_model,
            block_size,
        } => commands::process::run(
            &config,
            &commands::process::ProcessOptions {
                input,
                output,
                dna,
                password,
                force_age,
                imprint_strength,
                base_model,
                block_size,
            },
        ),
        Commands::Birth {
            parent_a,
            parent_b,
            child_user,
            out,
            inherit_a,
            inherit_b,
            randomness,
            password,
        } => commands::birth::run(
            &config,
            &commands::birth::BirthOptions {
                parent_a,
                parent_b,
                child_user,
                out,
                inherit_a,
                inherit_b,
                randomness,
                password,
            },
        ),
        Commands::Doctor => commands::doctor::run(&config),
    });

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red(), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_process_defaults() {
        let cli = Cli::try_parse_from([
            "voicedna", "process", "-i", "in.wav", "-o", "out.wav", "--dna", "me.dna",
        ])
        .unwrap();
        match cli.command {
            Commands::Process {
                force_age,
                imprint_strength,
                base_model,
                block_size,
                ..
            } => {
                assert_eq!(force_age, 12.0);
                assert_eq!(imprint_strength, 0.68);
                assert_eq!(base_model, "vst3_reaper");
                assert_eq!(block_size, 0);
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_cli_parses_birth() {
        let cli = Cli::try_parse_from([
            "voicedna",
            "birth",
            "--parent-a",
            "a.wav",
            "--parent-b",
            "b.wav",
            "--child-user",
            "kid",
            "--out",
            "kid.voicedna.enc",
            "--inherit-a",
            "70",
            "--repo-root",
            "/opt/voicedna",
        ])
        .unwrap();
        assert_eq!(cli.repo_root, Some(PathBuf::from("/opt/voicedna")));
        match cli.command {
            Commands::Birth {
                inherit_a,
                inherit_b,
                randomness,
                ..
            } => {
                assert_eq!(inherit_a, 70.0);
                assert_eq!(inherit_b, 50.0);
                assert_eq!(randomness, 10.0);
            }
            _ => panic!("expected birth command"),
        }
    }

    #[test]
    fn test_global_overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "voicedna", "doctor", "--python", "/usr/bin/python3", "--script", "engine.py",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.interpreter, Some(PathBuf::from("/usr/bin/python3")));
        assert_eq!(config.script_path, Some(PathBuf::from("engine.py")));
    }
}
