#![no_main]

use cpreproc_syntax::{parse, InputEdit, Parser};
use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 4096;

fn decode_source(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_SOURCE_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    // First byte splits the input into the old text and the inserted text;
    // the next two pick the replaced range.
    let split = 3 + usize::from(data[0]) % (data.len() - 2);
    let old = decode_source(&data[3..split]);
    let inserted = decode_source(&data[split..]);
    let start = floor_char_boundary(&old, usize::from(data[1]) % (old.len() + 1));
    let old_end = floor_char_boundary(&old, start + usize::from(data[2] % 16)).max(start);

    let mut new = String::with_capacity(old.len() + inserted.len());
    new.push_str(&old[..start]);
    new.push_str(&inserted);
    new.push_str(&old[old_end..]);
    let edit = InputEdit::new(start, old_end, start + inserted.len());

    let mut parser = Parser::new();
    let old_tree = parser.parse(&old);
    let reparsed = parser
        .reparse(&old_tree, &edit, &new)
        .expect("edit is consistent with the texts");
    assert_eq!(reparsed, parse(&new));
});
