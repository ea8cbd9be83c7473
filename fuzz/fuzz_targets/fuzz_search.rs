#![no_main]

use libfuzzer_sys::fuzz_target;
use robot_fuzz::{verify_search, SmallString};

fuzz_target!(|data: (SmallString, SmallString)| {
    let (text, pattern) = data;
    verify_search(&text.0, &pattern.0);
});
