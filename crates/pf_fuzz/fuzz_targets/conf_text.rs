#![no_main]

use libfuzzer_sys::fuzz_target;
use pf_harness::conf::parse_conf_text;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = parse_conf_text(text);
});
