use std::fs;
use std::io::{self, BufRead, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use pf_harness::cli::{self, CliRequest};
use pf_harness::dispatch::{self, INPUT_LINE_MAX};
use pf_harness::{conf, config, ActivationSet, DescriptorTable, HarnessConfig};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("pulsefuzz: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    eprintln!("pulsefuzz, a one-shot fuzzing harness for the pulse protocol decoders");

    let (config_path, options) = match cli::parse_args(std::env::args_os())? {
        CliRequest::Help(text) => {
            print!("{text}");
            return Ok(ExitCode::SUCCESS);
        }
        CliRequest::Run {
            config_path,
            options,
        } => (config_path, options),
    };

    let table = DescriptorTable::builtin();
    let mut cfg = HarnessConfig::default();
    let mut set = ActivationSet::new();

    // Config text first, flags second, so flags win on conflicts.
    if let Some(path) = config_path {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config file {}", path.display()))?;
        for option in conf::parse_conf_text(&raw)? {
            config::apply_option(&mut cfg, &table, &mut set, &option)?;
        }
    }
    for option in &options {
        config::apply_option(&mut cfg, &table, &mut set, option)?;
    }
    config::finalize_activation(&cfg, &table, &mut set)?;

    eprintln!("Reading test data from stdin");
    let mut buf = Vec::new();
    let read = io::stdin()
        .lock()
        .take(INPUT_LINE_MAX as u64)
        .read_until(b'\n', &mut buf)
        .context("failed reading test data")?;
    if read == 0 {
        return Ok(ExitCode::SUCCESS);
    }
    let line = String::from_utf8_lossy(&buf);
    let line = line.trim_end_matches(['\r', '\n']);

    match dispatch::process_test_line(&cfg, &set, line) {
        Ok(events) => {
            for event in &events {
                println!(
                    "{}",
                    serde_json::to_string(event).context("failed serializing event")?
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
