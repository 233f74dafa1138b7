mod common;
use common::*;

use cpreproc_syntax::{language, ConfigError, ParserConfig};

#[test]
fn test_field_access() {
    let tree = parse("#define SQUARE(x) ((x) * (x))\n");
    let def = tree.root_node().child(0).unwrap();
    assert_eq!(def.kind(), SyntaxKind::PreprocFunctionDef);
    assert_eq!(def.kind_name(), "preproc_function_def");
    assert_eq!(def.child_by_field_name("name").unwrap().text(), "SQUARE");

    let params = def.child_by_field_name("parameters").unwrap();
    let names: Vec<_> = params
        .children_by_field_name("parameter")
        .map(|param| param.text())
        .collect();
    assert_eq!(names, vec!["x"]);

    let name_index = def
        .children()
        .position(|child| child.field_name() == Some("name"))
        .unwrap();
    assert_eq!(def.field_name_for_child(name_index), Some("name"));
    assert!(def.child_by_field_name("no_such_field").is_none());
}

#[test]
fn test_named_children_skip_punctuation() {
    let tree = parse("#include <a.h>\n");
    let include = tree.root_node().child(0).unwrap();
    assert_eq!(include.child_count(), 3);
    assert_eq!(include.named_child_count(), 1);
    assert_eq!(
        include.named_child(0).unwrap().kind(),
        SyntaxKind::SystemLibString
    );
}

#[test]
fn test_ranges_exclude_padding() {
    let source = "\n\n  #undef  X  \n";
    let tree = parse(source);
    let undef = tree.root_node().child(0).unwrap();
    assert_eq!(undef.start_byte(), 4);
    assert_eq!(undef.end_byte(), source.len());
    let name = undef.child_by_field_name("name").unwrap();
    assert_eq!((name.start_byte(), name.end_byte()), (12, 13));
    assert_well_formed(&tree);
}

#[test]
fn test_lossless_syntax_view() {
    let source = "#define A /* c */ 1 \\\n + 2\n\tint x; // t\n#endif\n";
    let tree = parse(source);
    let syntax = tree.syntax();
    assert_eq!(syntax.kind(), SyntaxKind::TranslationUnit);
    assert_eq!(syntax.text().to_string(), source);
    assert!(syntax
        .descendants_with_tokens()
        .any(|element| element.kind() == SyntaxKind::LineContinuation));
}

#[test]
fn test_language_metadata() {
    let language = language();
    assert_eq!(language.name(), "c_preproc");
    assert_eq!(
        language.symbol_for_name("preproc_def", true),
        Some(SyntaxKind::PreprocDef)
    );
    assert_eq!(
        language.symbol_for_name("#endif", false),
        Some(SyntaxKind::DirEndif)
    );
    let field = language.field_id_for_name("condition").unwrap();
    assert_eq!(language.field_name(field), Some("condition"));
    assert!(language.field_id_for_name("nonsense").is_none());
    assert_eq!(parse("").language().fingerprint(), language.fingerprint());
}

#[test]
fn test_config_from_toml() {
    let config = ParserConfig::from_toml_str(
        r#"
[parser]
lookahead_depth = 5
reuse_subtrees = false
"#,
    )
    .unwrap();
    assert_eq!(config.lookahead_depth, 5);
    assert_eq!(config.max_missing_tokens, 2);
    assert!(!config.reuse_subtrees);

    let tree = Parser::with_config(config).parse("#define A 1\n");
    assert_eq!(tree, parse("#define A 1\n"));
}

#[test]
fn test_config_rejects_bad_values() {
    let error = ParserConfig::from_toml_str("[parser]\nlookahead_depth = 0\n").unwrap_err();
    assert!(matches!(
        error,
        ConfigError::InvalidValue {
            key: "lookahead_depth",
            ..
        }
    ));
    assert!(matches!(
        ParserConfig::from_toml_str("[parser]\nspeed = 9\n"),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn test_trees_are_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Tree>();
    assert_send_sync::<Parser>();

    let sources = [
        "#define A 1\n",
        "#ifdef A\nx\n#endif\n",
        "#include <a.h>\n",
        "#if A > 1\n#error big\n#endif\n",
    ];
    let trees: Vec<Tree> = sources.iter().map(|source| parse(source)).collect();
    std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .zip(&trees)
            .map(|(source, tree)| {
                scope.spawn(move || {
                    let mut parser = Parser::new();
                    let own = parser.parse(source);
                    assert_eq!(&own, tree);
                    tree.root_node().to_sexp()
                })
            })
            .collect();
        for (handle, tree) in handles.into_iter().zip(&trees) {
            assert_eq!(handle.join().unwrap(), tree.root_node().to_sexp());
        }
    });
}
