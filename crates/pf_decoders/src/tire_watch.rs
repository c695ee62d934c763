//! TireWatch-MAN tire pressure sensor.
//!
//! IEEE Manchester coding at a 100 us half-bit (a `fast` parameter halves
//! it): every mark/space width is one or two half-bits, the second half of
//! each bit carries its value. 32 bits total: 16-bit sensor id, pressure
//! byte in 2.5 kPa steps, CRC-8 (poly 0x31) over the first three bytes.

use crate::event::DecodedEvent;
use crate::pulse::PulseTrain;
use crate::{DecodeError, Decoder};

const HALF_BIT_US: u32 = 100;
const FAST_HALF_BIT_US: u32 = 50;
const FRAME_BITS: usize = 32;
const CRC_POLY: u8 = 0x31;

pub(crate) fn build(params: Option<&str>) -> Result<Box<dyn Decoder>, DecodeError> {
    let half_bit_us = match params {
        None => HALF_BIT_US,
        Some("fast") => FAST_HALF_BIT_US,
        Some(other) => return Err(DecodeError::BadParam(other.to_owned())),
    };
    Ok(Box::new(TireWatch { half_bit_us }))
}

struct TireWatch {
    half_bit_us: u32,
}

impl Decoder for TireWatch {
    fn decode(&self, payload: &str) -> Result<Vec<DecodedEvent>, DecodeError> {
        let train = PulseTrain::parse(payload)?;

        let mut halves: Vec<bool> = Vec::with_capacity(2 * FRAME_BITS + 2);
        let mut level = true;
        for width in train.widths() {
            let units = self.units_for(width)?;
            for _ in 0..units {
                halves.push(level);
            }
            level = !level;
        }
        // The line idles low, so a final low half-bit may be implicit.
        if halves.len() == 2 * FRAME_BITS - 1 {
            halves.push(false);
        }
        if halves.len() != 2 * FRAME_BITS {
            return Err(DecodeError::NoMatch("wrong half-bit count"));
        }

        let mut bytes = [0u8; 4];
        for (i, pair) in halves.chunks(2).enumerate() {
            if pair[0] == pair[1] {
                return Err(DecodeError::NoMatch("manchester violation"));
            }
            if pair[1] {
                bytes[i / 8] |= 0x80 >> (i % 8);
            }
        }

        if crc8(&bytes[..3]) != bytes[3] {
            return Err(DecodeError::Checksum);
        }

        let id = u32::from(bytes[0]) << 8 | u32::from(bytes[1]);
        let pressure_kpa = f64::from(bytes[2]) * 2.5;

        Ok(vec![DecodedEvent::new("TireWatch-MAN")
            .field("id", id)
            .field("pressure_kPa", pressure_kpa)])
    }
}

impl TireWatch {
    fn units_for(&self, width: u32) -> Result<u32, DecodeError> {
        let half = self.half_bit_us;
        if width.abs_diff(half) <= half / 2 {
            Ok(1)
        } else if width.abs_diff(2 * half) <= half / 2 {
            Ok(2)
        } else {
            Err(DecodeError::NoMatch("width is not a half-bit multiple"))
        }
    }
}

fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                crc << 1 ^ CRC_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Render bytes as a pulse line; the caller must keep the first bit 0 so
    /// the train starts with a mark.
    fn encode(bytes: &[u8; 4], half_us: u32) -> String {
        let mut halves = Vec::new();
        for i in 0..FRAME_BITS {
            let bit = bytes[i / 8] & (0x80 >> (i % 8)) != 0;
            halves.push(!bit);
            halves.push(bit);
        }
        assert!(halves[0], "frame must start with a high half-bit");

        // Run-length encode into alternating signed widths.
        let mut line = String::new();
        let mut run = 1u32;
        for i in 1..halves.len() {
            if halves[i] == halves[i - 1] {
                run += 1;
                continue;
            }
            let sign = if halves[i - 1] { '+' } else { '-' };
            line.push_str(&format!("{sign}{} ", run * half_us));
            run = 1;
        }
        if halves[halves.len() - 1] {
            line.push_str(&format!("+{}", run * half_us));
        }
        line.trim_end().to_owned()
    }

    fn frame(id: u16, pressure_raw: u8) -> [u8; 4] {
        let mut bytes = [(id >> 8) as u8, id as u8, pressure_raw, 0];
        bytes[3] = crc8(&bytes[..3]);
        bytes
    }

    #[test]
    fn decodes_nominal_frame() {
        let decoder = build(None).expect("decoder should build");
        let events = decoder
            .decode(&encode(&frame(0x2A4C, 100), HALF_BIT_US))
            .expect("frame should decode");
        assert_eq!(events[0].model, "TireWatch-MAN");
        assert_eq!(events[0].get("id"), Some(&0x2A4Cu32.into()));
        assert_eq!(events[0].get("pressure_kPa"), Some(&250.0.into()));
    }

    #[test]
    fn fast_parameter_halves_the_bit_clock() {
        let decoder = build(Some("fast")).expect("decoder should build");
        let line = encode(&frame(0x2A4C, 100), FAST_HALF_BIT_US);
        assert!(decoder.decode(&line).is_ok());

        // The same line is unreadable at the nominal clock.
        let nominal = build(None).expect("decoder should build");
        assert!(nominal.decode(&line).is_err());
    }

    #[test]
    fn rejects_unknown_parameter() {
        assert!(matches!(
            build(Some("turbo")),
            Err(DecodeError::BadParam(_))
        ));
    }

    #[test]
    fn rejects_corrupted_crc() {
        let decoder = build(None).expect("decoder should build");
        let mut bytes = frame(0x2A4C, 100);
        bytes[3] ^= 0x01;
        assert!(matches!(
            decoder.decode(&encode(&bytes, HALF_BIT_US)),
            Err(DecodeError::Checksum)
        ));
    }

    #[test]
    fn rejects_wrong_length() {
        let decoder = build(None).expect("decoder should build");
        assert!(matches!(
            decoder.decode("+100 -100 +100"),
            Err(DecodeError::NoMatch("wrong half-bit count"))
        ));
    }

    #[test]
    fn crc8_of_empty_input_is_zero() {
        assert_eq!(crc8(&[]), 0);
    }
}
