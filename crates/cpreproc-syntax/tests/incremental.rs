mod common;
use common::*;

use cpreproc_syntax::{EditError, Point, ReparseError};

const SOURCE: &str = "\
#include <stdio.h>
#define A 1

#define B(x) (x + A)

#ifdef B
int b = B(2);
#else
int b = 0;
#endif

#undef A
";

#[test]
fn test_parse_is_deterministic() {
    assert_eq!(parse(SOURCE), parse(SOURCE));
    assert_eq!(
        parse(SOURCE).root_node().to_sexp(),
        parse(SOURCE).root_node().to_sexp()
    );
}

#[test]
fn test_single_edits_match_fresh_parse() {
    let edited = [
        SOURCE.replace("#define A 1", "#define A 11"),
        SOURCE.replace("#define A 1\n", ""),
        SOURCE.replace("(x + A)", "(x +\\\n A)"),
        SOURCE.replace("#else", "#elif 0"),
        SOURCE.replace("#endif", "#endif /* B */"),
        SOURCE.replace("<stdio.h>", "\"stdio.h\""),
        SOURCE.replace("B(x)", "B (x)"),
        SOURCE.replace("int b = 0;", "int b = 0; \"open"),
        SOURCE.replace("#ifdef", "#"),
        SOURCE.replace("#undef A", "#undef"),
        format!("/* header */\n{SOURCE}"),
        format!("{SOURCE}#endif\n"),
        String::new(),
    ];
    let mut parser = Parser::new();
    let old = parser.parse(SOURCE);
    for new in &edited {
        assert_reparse_matches(&mut parser, &old, new);
    }
}

#[test]
fn test_typing_character_by_character() {
    let mut parser = Parser::new();
    let mut tree = parser.parse("");
    let mut typed = String::new();
    for c in SOURCE.chars() {
        typed.push(c);
        tree = assert_reparse_matches(&mut parser, &tree, &typed);
    }
    assert!(!tree.has_error());
}

#[test]
fn test_deleting_from_the_middle() {
    let mut parser = Parser::new();
    let mut source = SOURCE.to_string();
    let mut tree = parser.parse(&source);
    while source.len() > 10 {
        let at = source.len() / 2;
        let at = (0..=at).rev().find(|&i| source.is_char_boundary(i)).unwrap_or(0);
        let end = (at + 1..=source.len())
            .find(|&i| source.is_char_boundary(i))
            .unwrap_or(source.len());
        source.replace_range(at..end, "");
        tree = assert_reparse_matches(&mut parser, &tree, &source);
    }
}

#[test]
fn test_chained_reparses() {
    // A small deterministic generator keeps the edit sequence reproducible.
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move |bound: usize| {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        usize::try_from(seed % bound as u64).unwrap()
    };
    let fragments = ["#", "define", " ", "\n", "(", ")", "x", "1", "\\\n", "/*", "*/", "\"", "<", ">", "##", "#endif\n"];

    let mut parser = Parser::new();
    let mut source = SOURCE.to_string();
    let mut tree = parser.parse(&source);
    for _ in 0..200 {
        let start = next(source.len() + 1);
        let len = next(4).min(source.len() - start);
        let fragment = if next(3) == 0 { "" } else { fragments[next(fragments.len())] };
        source.replace_range(start..start + len, fragment);
        tree = assert_reparse_matches(&mut parser, &tree, &source);
    }
}

#[test]
fn test_nodes_built_during_recovery_are_not_reused() {
    let mut parser = Parser::new();
    let old = parser.parse("#if1\n#ifdef\n#");
    assert!(old.has_error());
    let tree = assert_reparse_matches(&mut parser, &old, "#if\\\n?1\n#ifdef\n#");
    assert!(tree.has_error());
}

#[test]
fn test_unchanged_lines_are_reused() {
    let mut source = String::new();
    for i in 0..50 {
        source.push_str(&format!("#define NAME_{i} {i}\n\n"));
    }
    let mut parser = Parser::new();
    let old = parser.parse(&source);
    let new = source.replace("NAME_49 49", "NAME_49 4900");
    let tree = assert_reparse_matches(&mut parser, &old, &new);
    let edit = InputEdit::diff(&source, &new);
    parser.reparse(&old, &edit, &new).unwrap();
    let stats = parser.last_reuse_stats();
    assert!(stats.reused_nodes >= 1, "{stats:?}");
    assert!(stats.reused_bytes * 2 > new.len(), "{stats:?}");
    assert!(!tree.has_error());
}

#[test]
fn test_explicit_edit_with_points() {
    let old_source = "#define A 1\nA\n";
    let new_source = "#define A 1\nA + A\n";
    let edit = InputEdit {
        start_byte: 13,
        old_end_byte: 13,
        new_end_byte: 17,
        start_point: Some(Point::new(1, 1)),
        old_end_point: Some(Point::new(1, 1)),
        new_end_point: Some(Point::new(1, 5)),
    };
    let mut parser = Parser::new();
    let old = parser.parse(old_source);
    let tree = parser.reparse(&old, &edit, new_source).unwrap();
    assert_eq!(tree, parse(new_source));
    assert_eq!(old.source(), old_source);
}

#[test]
fn test_inconsistent_edits_are_rejected() {
    let mut parser = Parser::new();
    let old = parser.parse("#define A 1\n");

    assert_eq!(
        parser.reparse(&old, &InputEdit::new(5, 20, 20), "#define A 1\n"),
        Err(ReparseError::InvalidEdit(EditError::OutOfBounds {
            old_end: 20,
            len: 12
        }))
    );
    assert_eq!(
        parser.reparse(&old, &InputEdit::new(10, 11, 12), "#define A 1\n"),
        Err(ReparseError::InvalidEdit(EditError::LengthMismatch {
            expected: 13,
            actual: 12
        }))
    );
    assert_eq!(
        parser.reparse(&old, &InputEdit::new(9, 9, 10), "#define \u{e9} 1\n"),
        Err(ReparseError::InvalidEdit(EditError::NotCharBoundary { offset: 9 }))
    );

    let stale = parser.parse("#define AB 1\n\n\n#define B 2\n");
    assert_eq!(
        parser.reparse(
            &stale,
            &InputEdit::new(24, 25, 25),
            "#define A(1)\n\n\n#define B 3\n"
        ),
        Err(ReparseError::InvalidEdit(EditError::TextMismatch { offset: 9 }))
    );

    let mut edit = InputEdit::new(10, 11, 11);
    edit.start_point = Some(Point::new(1, 0));
    assert_eq!(
        parser.reparse(&old, &edit, "#define A 2\n"),
        Err(ReparseError::InvalidEdit(EditError::PointMismatch {
            which: "start",
            row: 1,
            column: 0,
            offset: 10
        }))
    );
}
