#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if input.len() > 1000 {
            return;
        }
        let _ = hivfacts::parse_mutation(input, None);
        let _ = hivfacts::parse_mutation_set(Some(input), None);
    }
});
