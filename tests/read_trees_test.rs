mod common;

use common::{init_test_setup, leaf_labels};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::PathBuf;
use treelib::{ParseErrorKind, ReadError, Tree, parse_trees, read_tree, read_trees};

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

#[test]
fn test_read_trees_from_file() {
    init_test_setup();

    let file = File::open(data_path("primates.tre")).unwrap();
    let trees: Vec<Tree> = read_trees(BufReader::new(file)).map(Result::unwrap).collect();
    assert_eq!(trees.len(), 3);

    assert_eq!(
        leaf_labels(&trees[0]),
        ["Homo sapiens", "Pan troglodytes", "Gorilla_gorilla", "Pongo_abelii"]
    );
    assert!(trees[0].has_internal_labels());
    assert_eq!(trees[1].leaf_count(), 5);
    assert!(!trees[1].has_edge_lengths());
    assert_eq!(trees[2].internal_count(), 3);
}

#[test]
fn test_parse_trees_matches_sequential_reading() {
    let text = std::fs::read_to_string(data_path("primates.tre")).unwrap();
    let parallel: Vec<String> =
        parse_trees(&text).into_iter().map(|r| r.unwrap().to_string()).collect();
    let sequential: Vec<String> = read_trees(Cursor::new(text.as_bytes()))
        .map(|r| r.unwrap().to_string())
        .collect();
    assert_eq!(parallel, sequential);
    assert_eq!(parallel.len(), 3);
}

#[test]
fn test_read_errors() {
    let mut reader = Cursor::new("(A,B;\n");
    match read_tree(&mut reader) {
        Err(ReadError::Parse(err)) => {
            assert_eq!(err.kind(), ParseErrorKind::Unbalanced);
            assert_eq!(err.position(), 4);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }

    let mut reader = Cursor::new("(A,B)");
    match read_tree(&mut reader) {
        Err(ReadError::Parse(err)) => assert_eq!(err.kind(), ParseErrorKind::MissingSemicolon),
        other => panic!("expected a parse error, got {other:?}"),
    }

    let mut reader = Cursor::new(" \n\t");
    assert!(read_tree(&mut reader).unwrap().is_none());
}
