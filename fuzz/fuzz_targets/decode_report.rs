#![no_main]

use grievance::report::decode_documents;
use grievance::{render, summarize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Report files are UTF-8 JSON; anything else is rejected before decoding.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(documents) = decode_documents(s) {
            // Anything that decodes must summarize and render.
            for document in &documents {
                let _ = render(&summarize(&document.to_ledger()), true);
            }
        }
    }
});
