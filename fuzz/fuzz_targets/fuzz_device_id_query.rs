//! Fuzz target: `device_id` query parsing for list_key_codes.
//!
//! Any string either fails validation or yields a positive device id.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lockgate_core::Operation;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    if let Ok(Operation::ListKeyCodes { device_id }) = Operation::list_key_codes(Some(&raw)) {
        assert!(device_id.get() > 0);
    }
});
