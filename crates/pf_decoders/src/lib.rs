//! Pluggable pulse-train protocol decoders.
//!
//! Each protocol ships as a [`DecoderSpec`] in [`BUILTIN`]: a stable name, a
//! [`Tier`] controlling whether it takes part in default activation, and a
//! constructor for the live [`Decoder`]. The harness owns activation and
//! dispatch; this crate only knows how to turn one pulse text line into
//! decoded events.

use thiserror::Error;

pub mod event;
pub mod pulse;

mod doorbell_ppm;
mod legacy_fsk;
mod raw_logger;
mod thermo_pwm;
mod tire_watch;

pub use event::{DecodedEvent, FieldValue};
pub use pulse::{PulseError, PulseTrain};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("bad pulse data: {0}")]
    Pulse(#[from] PulseError),
    #[error("no signal matched: {0}")]
    NoMatch(&'static str),
    #[error("checksum mismatch")]
    Checksum,
    #[error("unsupported decoder parameter {0:?}")]
    BadParam(String),
    #[error("decoder requires the live capture path")]
    Unsupported,
}

/// Ordinal 0 / 1 / 2 / >2 from the protocol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Default,
    DefaultDisabled,
    Hidden,
    Unavailable,
}

impl Tier {
    /// Whether the protocol may be named by an explicit selection at all.
    pub fn selectable(self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    pub fn default_enabled(self) -> bool {
        matches!(self, Self::Default)
    }
}

/// A live decoder instance. Dropping it is the cleanup hook.
pub trait Decoder {
    fn decode(&self, payload: &str) -> Result<Vec<DecodedEvent>, DecodeError>;
}

pub type BuildFn = fn(Option<&str>) -> Result<Box<dyn Decoder>, DecodeError>;

/// Compiled-in definition of one protocol. The optional build argument is
/// the opaque parameter string a selection may attach (`-R n:params`).
pub struct DecoderSpec {
    pub name: &'static str,
    pub tier: Tier,
    pub build: BuildFn,
}

/// The fixed protocol family. Table position determines the 1-based
/// protocol number the harness assigns, so order here is load-bearing.
pub const BUILTIN: &[DecoderSpec] = &[
    DecoderSpec {
        name: "ThermoPWM-T1",
        tier: Tier::Default,
        build: thermo_pwm::build,
    },
    DecoderSpec {
        name: "Doorbell-PPM",
        tier: Tier::Default,
        build: doorbell_ppm::build,
    },
    DecoderSpec {
        name: "TireWatch-MAN",
        tier: Tier::DefaultDisabled,
        build: tire_watch::build,
    },
    DecoderSpec {
        name: "RawLogger",
        tier: Tier::Hidden,
        build: raw_logger::build,
    },
    DecoderSpec {
        name: "LegacyFSK-900",
        tier: Tier::Unavailable,
        build: legacy_fsk::build,
    },
];
