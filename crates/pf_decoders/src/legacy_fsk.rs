//! LegacyFSK-900 placeholder. The decoder needs the live 900 MHz FSK
//! capture path, which this harness does not ship, so the table entry is
//! marked unavailable and any attempt to construct it fails.

use crate::{DecodeError, Decoder};

pub(crate) fn build(_params: Option<&str>) -> Result<Box<dyn Decoder>, DecodeError> {
    Err(DecodeError::Unsupported)
}
