//! Command-line front-end. Flags mirror the config-text keywords; the
//! activation directives (`-R`, `-G`) and rate/frequency settings are
//! order-sensitive, so the parsed matches are flattened back into one
//! stream of normalized options sorted by argv index.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::config::ConfOption;

#[derive(Debug)]
pub enum CliRequest {
    Run {
        config_path: Option<PathBuf>,
        options: Vec<ConfOption>,
    },
    /// `-h`/`--help`: rendered text to print on stdout before exiting 0.
    Help(String),
}

pub fn command() -> Command {
    Command::new("pulsefuzz")
        .about("One-shot fuzzing harness for the pulse protocol decoders")
        .disable_version_flag(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Keyword configuration file, applied before the other flags"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Increase verbosity"),
        )
        .arg(
            Arg::new("frequency")
                .short('f')
                .action(ArgAction::Append)
                .value_name("FREQ")
                .help("Receive frequency, metric suffixes allowed (repeatable)"),
        )
        .arg(
            Arg::new("sample_rate")
                .short('s')
                .action(ArgAction::Append)
                .value_name("RATE")
                .help("Sample rate, metric suffixes allowed"),
        )
        .arg(
            Arg::new("protocol")
                .short('R')
                .action(ArgAction::Append)
                .value_name("N[:PARAMS]")
                .allow_hyphen_values(true)
                .help("Activate protocol N, deactivate -N, or clear all with 0 (repeatable)"),
        )
        .arg(
            Arg::new("register_all")
                .short('G')
                .action(ArgAction::Count)
                .help("Force-activate every selectable protocol regardless of tier"),
        )
}

/// Parses argv (including the program name). Usage errors are returned as
/// `Err` so the process exits 1, not clap's usual 2.
pub fn parse_args<I, T>(argv: I) -> Result<CliRequest>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match command().try_get_matches_from(argv) {
        Ok(matches) => matches,
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            return Ok(CliRequest::Help(err.to_string()));
        }
        Err(err) => bail!("{err}"),
    };

    let config_path = matches.get_one::<PathBuf>("config").cloned();
    Ok(CliRequest::Run {
        config_path,
        options: ordered_options(&matches),
    })
}

fn ordered_options(matches: &ArgMatches) -> Vec<ConfOption> {
    let mut ordered: Vec<(usize, ConfOption)> = Vec::new();

    for (id, build) in [
        ("frequency", ConfOption::Frequency as fn(String) -> ConfOption),
        ("sample_rate", ConfOption::SampleRate),
        ("protocol", ConfOption::Protocol),
    ] {
        if let (Some(values), Some(indices)) =
            (matches.get_many::<String>(id), matches.indices_of(id))
        {
            for (value, index) in values.zip(indices) {
                ordered.push((index, build(value.clone())));
            }
        }
    }
    // Count flags always carry an implicit default, and each occurrence
    // replaces the recorded match, so only the last occurrence's index
    // survives. Emit one option per actual occurrence at that index;
    // `-G` re-activates everything and `-v` commutes, so the collapsed
    // ordering yields the same final state.
    for (id, option) in [
        ("register_all", ConfOption::RegisterAll),
        ("verbose", ConfOption::Verbosity(None)),
    ] {
        let occurrences = matches.get_count(id);
        if occurrences == 0 {
            continue;
        }
        if let Some(index) = matches.indices_of(id).and_then(Iterator::last) {
            for _ in 0..occurrences {
                ordered.push((index, option.clone()));
            }
        }
    }

    ordered.sort_by_key(|(index, _)| *index);
    ordered.into_iter().map(|(_, option)| option).collect()
}
