#![no_main]

use libfuzzer_sys::fuzz_target;
use tools::cdata;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let encoded = cdata::encode(&text);
    assert!(!encoded.contains("]]>"));
    assert_eq!(cdata::needs_encoding(&text), encoded != text);
    assert_eq!(cdata::decode(&encoded), text);
});
