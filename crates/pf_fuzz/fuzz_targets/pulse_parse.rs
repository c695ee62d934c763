#![no_main]

use libfuzzer_sys::fuzz_target;
use pf_decoders::PulseTrain;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let _ = PulseTrain::parse(line);
});
