//! Fuzz target: key-code body decoding through argument construction.
//!
//! Arbitrary bytes are decoded as a `KeyCodeRequest`; anything that
//! validates is built into an argument vector whose fixed prefix must
//! survive untouched.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lockgate_core::{CommandTemplate, KeyCodeRequest};

fuzz_target!(|data: &[u8]| {
    let Ok(request) = serde_json::from_slice::<KeyCodeRequest>(data) else {
        return;
    };
    let template = CommandTemplate::with_hub("10.0.0.5");
    for op in [request.clone().into_create(), request.clone().into_update(), request.into_delete()]
        .into_iter()
        .flatten()
    {
        let inv = template.build(&op);
        assert_eq!(inv.args()[..4], ["-m", "hubitat_lock_manager.cli", "--hub-ip", "10.0.0.5"]);
        assert_eq!(inv.args()[5], op.action().as_str());
        assert_eq!(inv.args().len() % 2, 0, "flags and values must pair up");
    }
});
