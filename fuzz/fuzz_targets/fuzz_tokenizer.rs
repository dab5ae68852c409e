#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Words never contain the separator and never come out empty
    for word in sift::utils::split_into_words(data) {
        assert!(!word.is_empty());
        assert!(!word.contains(' '));
    }
});
