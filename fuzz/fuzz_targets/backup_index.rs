#![no_main]

use libfuzzer_sys::fuzz_target;
use rollfile_core::backup_index;

fuzz_target!(|input: (&str, &str)| {
    let (base, name) = input;
    match backup_index(base, name) {
        Some(0) => assert_eq!(name, base),
        Some(index) => {
            let digits = &name[base.len() + 1..];
            assert!(digits.bytes().all(|b| b.is_ascii_digit()));
            assert_eq!(digits.parse::<u32>().ok(), Some(index));
        }
        None => {}
    }
});
