//! ThermoPWM-T1 temperature sensor.
//!
//! One long sync mark followed by 24 PWM data bits carried in the mark
//! width (short mark = 1, long mark = 0). Layout, MSB first:
//! 8-bit sensor id, 12-bit signed temperature in tenths of a degree,
//! 4-bit nibble checksum over the preceding five nibbles.

use crate::event::DecodedEvent;
use crate::pulse::{within, PulseTrain};
use crate::{DecodeError, Decoder};

const SYNC_MIN_US: u32 = 800;
const SHORT_US: u32 = 250;
const LONG_US: u32 = 500;
const TOL_US: u32 = 100;
const DATA_BITS: usize = 24;

pub(crate) fn build(params: Option<&str>) -> Result<Box<dyn Decoder>, DecodeError> {
    if let Some(params) = params {
        return Err(DecodeError::BadParam(params.to_owned()));
    }
    Ok(Box::new(ThermoPwm))
}

struct ThermoPwm;

impl Decoder for ThermoPwm {
    fn decode(&self, payload: &str) -> Result<Vec<DecodedEvent>, DecodeError> {
        let train = PulseTrain::parse(payload)?;
        let pairs = train.pairs();
        if pairs.len() != DATA_BITS + 1 {
            return Err(DecodeError::NoMatch("expected sync plus 24 data pulses"));
        }

        let (sync, _) = pairs[0];
        if sync < SYNC_MIN_US {
            return Err(DecodeError::NoMatch("missing sync pulse"));
        }

        let mut bits: u32 = 0;
        for &(mark, _) in &pairs[1..] {
            let bit = if within(mark, SHORT_US, TOL_US) {
                1
            } else if within(mark, LONG_US, TOL_US) {
                0
            } else {
                return Err(DecodeError::NoMatch("mark width out of spec"));
            };
            bits = bits << 1 | bit;
        }

        let sum: u32 = (1..=5).map(|n| bits >> (24 - 4 * n) & 0xF).sum();
        if sum & 0xF != bits & 0xF {
            return Err(DecodeError::Checksum);
        }

        let id = bits >> 16 & 0xFF;
        let raw_temp = (bits >> 4 & 0xFFF) as i32;
        let raw_temp = if raw_temp & 0x800 != 0 {
            raw_temp - 0x1000
        } else {
            raw_temp
        };

        Ok(vec![DecodedEvent::new("ThermoPWM-T1")
            .field("id", id)
            .field("temperature_C", f64::from(raw_temp) / 10.0)])
    }
}
