#![no_main]

use libfuzzer_sys::fuzz_target;
use pf_harness::dispatch::process_test_line;
use pf_harness::{ActivationSet, DescriptorTable, HarnessConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let table = DescriptorTable::builtin();
    let cfg = HarnessConfig::default();
    let mut set = ActivationSet::new();
    set.activate_defaults(&table).expect("defaults always build");
    let _ = process_test_line(&cfg, &set, line);
});
