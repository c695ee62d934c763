//! Doorbell-PPM remote button.
//!
//! Fixed-width marks with the bit carried in the gap (short space = 0,
//! long space = 1). A frame is 16 bits plus a terminal mark; transmitters
//! repeat the frame, and at least two identical copies are required before
//! an event is reported.

use crate::event::DecodedEvent;
use crate::pulse::{within, PulseTrain};
use crate::{DecodeError, Decoder};

const MARK_US: u32 = 300;
const TOL_US: u32 = 120;
const ZERO_SPACE_US: u32 = 200;
const ONE_SPACE_US: u32 = 600;
const FRAME_GAP_MIN_US: u32 = 1500;
const FRAME_BITS: usize = 16;
const MIN_REPEATS: usize = 2;

pub(crate) fn build(params: Option<&str>) -> Result<Box<dyn Decoder>, DecodeError> {
    if let Some(params) = params {
        return Err(DecodeError::BadParam(params.to_owned()));
    }
    Ok(Box::new(DoorbellPpm))
}

struct DoorbellPpm;

impl Decoder for DoorbellPpm {
    fn decode(&self, payload: &str) -> Result<Vec<DecodedEvent>, DecodeError> {
        let train = PulseTrain::parse(payload)?;

        let mut frames: Vec<u16> = Vec::new();
        let mut bits: Vec<bool> = Vec::new();
        for &(mark, space) in train.pairs() {
            if !within(mark, MARK_US, TOL_US) {
                return Err(DecodeError::NoMatch("mark width out of spec"));
            }
            if space == 0 || space >= FRAME_GAP_MIN_US {
                // Terminal mark: the frame must be complete.
                if bits.len() != FRAME_BITS {
                    return Err(DecodeError::NoMatch("truncated frame"));
                }
                frames.push(pack(&bits));
                bits.clear();
            } else if within(space, ZERO_SPACE_US, TOL_US) {
                bits.push(false);
            } else if within(space, ONE_SPACE_US, TOL_US) {
                bits.push(true);
            } else {
                return Err(DecodeError::NoMatch("space width out of spec"));
            }
        }
        if !bits.is_empty() {
            return Err(DecodeError::NoMatch("truncated frame"));
        }

        if frames.len() < MIN_REPEATS {
            return Err(DecodeError::NoMatch("insufficient repeats"));
        }
        let code = frames[0];
        if frames.iter().any(|&f| f != code) {
            return Err(DecodeError::NoMatch("repeats disagree"));
        }
        if code == 0x0000 || code == 0xFFFF {
            return Err(DecodeError::NoMatch("degenerate code"));
        }

        Ok(vec![DecodedEvent::new("Doorbell-PPM")
            .field("unit", u32::from(code >> 4))
            .field("button", u32::from(code & 0xF))])
    }
}

fn pack(bits: &[bool]) -> u16 {
    bits.iter().fold(0, |acc, &bit| acc << 1 | u16::from(bit))
}
