//! Text representation of a demodulated pulse train.
//!
//! A test vector payload is a whitespace-separated list of alternating
//! signed durations in microseconds, starting with a mark:
//! `+1000 -500 +250 -250 ...`. A trailing mark may omit its space.

use thiserror::Error;

pub const MAX_PULSES: usize = 1200;
pub const MAX_PULSE_US: u32 = 100_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PulseError {
    #[error("empty pulse line")]
    Empty,
    #[error("pulse {index} must alternate sign, starting with a mark")]
    Alternation { index: usize },
    #[error("pulse {index} is not a signed duration: {token:?}")]
    BadToken { index: usize, token: String },
    #[error("pulse {index} width {width}us out of range")]
    OutOfRange { index: usize, width: u32 },
    #[error("pulse train exceeds {MAX_PULSES} pulses")]
    TooLong,
}

/// Parsed pulse train as (mark, space) pairs. A trailing mark without a
/// space is stored with a zero space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseTrain {
    pairs: Vec<(u32, u32)>,
}

impl PulseTrain {
    pub fn parse(line: &str) -> Result<Self, PulseError> {
        let mut pairs: Vec<(u32, u32)> = Vec::new();

        for (index, token) in line.split_whitespace().enumerate() {
            let expect_mark = index % 2 == 0;
            let rest = match token.as_bytes().first() {
                Some(b'+') if expect_mark => &token[1..],
                Some(b'-') if !expect_mark => &token[1..],
                Some(b'+') | Some(b'-') => return Err(PulseError::Alternation { index }),
                _ => {
                    return Err(PulseError::BadToken {
                        index,
                        token: token.to_owned(),
                    })
                }
            };

            let width: u32 = rest.parse().map_err(|_| PulseError::BadToken {
                index,
                token: token.to_owned(),
            })?;
            if width == 0 || width > MAX_PULSE_US {
                return Err(PulseError::OutOfRange { index, width });
            }

            if expect_mark {
                if pairs.len() == MAX_PULSES {
                    return Err(PulseError::TooLong);
                }
                pairs.push((width, 0));
            } else {
                // Pair exists: the mark at index - 1 pushed it.
                let last = pairs.len() - 1;
                pairs[last].1 = width;
            }
        }

        if pairs.is_empty() {
            return Err(PulseError::Empty);
        }
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    /// Interleaved mark/space widths. The synthesized zero space of a
    /// trailing mark is skipped; parsing rejects zero widths everywhere else.
    pub fn widths(&self) -> impl Iterator<Item = u32> + '_ {
        self.pairs
            .iter()
            .flat_map(|&(mark, space)| [mark, space])
            .filter(|&width| width != 0)
    }
}

/// Width classification against a nominal value.
pub fn within(width: u32, nominal: u32, tolerance: u32) -> bool {
    width.abs_diff(nominal) <= tolerance
}
