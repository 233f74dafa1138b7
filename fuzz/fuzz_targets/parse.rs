#![no_main]

use cpreproc_syntax::parse;
use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 16 * 1024;

fuzz_target!(|data: &[u8]| {
    let capped = &data[..data.len().min(MAX_SOURCE_BYTES)];
    let source = String::from_utf8_lossy(capped);
    let tree = parse(&source);

    assert_eq!(tree.root_node().end_byte(), source.len());
    assert_eq!(tree.syntax().text().to_string(), source);
    let _ = tree.errors();
    let _ = tree.root_node().to_sexp();
});
