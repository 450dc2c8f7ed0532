//! Totality of the tree encoder and extractor.

use markup_babel::formats::adf::{encode, extract_text, Node};
use proptest::prelude::*;

proptest! {
    #[test]
    fn encoding_never_yields_an_empty_document(source in "[ -~\n]{0,200}") {
        let doc = encode(&source);
        prop_assert_eq!(doc.version, 1);
        prop_assert!(!doc.content.is_empty());
    }

    #[test]
    fn encoded_trees_always_extract(source in "[a-z*_#`>| \n-]{0,120}") {
        let value = encode(&source).to_value();
        let _ = extract_text(&value);
    }

    #[test]
    fn headings_clamp_to_six(hashes in 1usize..12, word in "[a-z]{1,8}") {
        let source = format!("{} {word}", "#".repeat(hashes));
        match encode(&source).content.into_iter().next() {
            Some(Node::Heading { attrs, .. }) => prop_assert!(attrs.level <= 6),
            other => prop_assert!(false, "expected heading, got {:?}", other),
        }
    }
}
