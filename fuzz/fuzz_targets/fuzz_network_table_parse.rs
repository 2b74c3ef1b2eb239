// Copyright (c) 2026 Lottery Harness Authors
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use libfuzzer_sys::fuzz_target;
use lottery_harness::core::config::{HarnessConfig, NetworkTable};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(table) = NetworkTable::from_toml_str(s) {
            // Every listed chain must resolve back to its own entry.
            for (id, entry) in table.chains() {
                let by_id = table.resolve(&id.to_string());
                assert!(matches!(by_id, Ok(ref r) if r.entry == *entry));
            }
        }
        let _ = HarnessConfig::from_toml_str(s);
    }
});
