//! Raw bit logger. Hidden from default activation: it accepts any
//! well-formed pulse train, which would drown real decoders in noise, but
//! is handy when triaging an unknown capture. Marks at or above the
//! threshold read as 1.

use std::fmt::Write as _;

use crate::event::DecodedEvent;
use crate::pulse::PulseTrain;
use crate::{DecodeError, Decoder};

const THRESHOLD_US: u32 = 350;

pub(crate) fn build(params: Option<&str>) -> Result<Box<dyn Decoder>, DecodeError> {
    if let Some(params) = params {
        return Err(DecodeError::BadParam(params.to_owned()));
    }
    Ok(Box::new(RawLogger))
}

struct RawLogger;

impl Decoder for RawLogger {
    fn decode(&self, payload: &str) -> Result<Vec<DecodedEvent>, DecodeError> {
        let train = PulseTrain::parse(payload)?;

        let mut code = String::new();
        let mut byte = 0u8;
        let mut filled = 0usize;
        for &(mark, _) in train.pairs() {
            byte = byte << 1 | u8::from(mark >= THRESHOLD_US);
            filled += 1;
            if filled == 8 {
                let _ = write!(code, "{byte:02x}");
                byte = 0;
                filled = 0;
            }
        }
        if filled > 0 {
            let _ = write!(code, "{:02x}", byte << (8 - filled));
        }

        Ok(vec![DecodedEvent::new("RawLogger")
            .field("pulses", train.len() as i64)
            .field("code", code)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FieldValue;

    #[test]
    fn thresholds_marks_into_hex() {
        let decoder = build(None).expect("decoder should build");
        // 1010 0001, padded left-aligned.
        let line = "+400 -100 +200 -100 +400 -100 +200 -100 \
                    +200 -100 +200 -100 +200 -100 +400";
        let events = decoder.decode(line).expect("train should decode");
        assert_eq!(events[0].get("pulses"), Some(&FieldValue::Int(8)));
        assert_eq!(events[0].get("code"), Some(&"a1".into()));
    }

    #[test]
    fn pads_partial_trailing_byte() {
        let decoder = build(None).expect("decoder should build");
        let events = decoder
            .decode("+400 -100 +400 -100 +200")
            .expect("train should decode");
        assert_eq!(events[0].get("code"), Some(&"c0".into()));
    }

    #[test]
    fn propagates_pulse_errors() {
        let decoder = build(None).expect("decoder should build");
        assert!(matches!(
            decoder.decode("junk"),
            Err(DecodeError::Pulse(_))
        ));
    }
}
