//! Test-vector dispatch: one line in, exactly one decoder invocation out.
//!
//! Grammar: `"[" <decimal-id> "]" <payload>`. The payload is handed to the
//! matching active decoder verbatim. Dispatch is stateless per call and
//! never falls back to iterating the activation set.

use pf_decoders::{DecodeError, DecodedEvent};
use thiserror::Error;

use crate::config::HarnessConfig;
use crate::registry::ActivationSet;

/// Upper bound on one line of test input, matching the reader in `main`.
pub const INPUT_LINE_MAX: usize = 8192;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("testing with all decoders is not supported")]
    AllDecoders,
    #[error("bad protocol number {prefix:?}")]
    BadHeader { prefix: String },
    #[error("unknown protocol number {0}")]
    UnknownProtocol(u32),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub fn process_test_line(
    cfg: &HarnessConfig,
    set: &ActivationSet,
    line: &str,
) -> Result<Vec<DecodedEvent>, DispatchError> {
    if cfg.verbosity > 0 {
        eprintln!("Processing test data: {line}");
    }

    let Some(rest) = line.strip_prefix('[') else {
        return Err(DispatchError::AllDecoders);
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, tail) = rest.split_at(digits_end);
    let Some(payload) = tail.strip_prefix(']') else {
        return Err(DispatchError::BadHeader {
            prefix: head(line),
        });
    };
    // An empty digit run before `]` reads as protocol 0, which no
    // descriptor carries, so lookup rejects it below.
    let id: u32 = if digits.is_empty() {
        0
    } else {
        digits.parse().map_err(|_| DispatchError::BadHeader {
            prefix: head(line),
        })?
    };

    let Some(protocol) = set.lookup(id) else {
        return Err(DispatchError::UnknownProtocol(id));
    };
    if cfg.verbosity > 0 {
        eprintln!("Verifying test data with decoder {}.", protocol.name());
    }
    Ok(protocol.decode(payload)?)
}

fn head(line: &str) -> String {
    line.chars().take(5).collect()
}
