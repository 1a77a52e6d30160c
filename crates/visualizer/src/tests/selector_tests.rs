use super::*;
use crate::document::Document;

fn sample() -> (Document, ElementId, ElementId) {
    let document = Document::new();
    let body = document.create_element(document.root(), "body", &[]).expect("body");
    let table = document.create_element(body, "table", &[]).expect("table");
    let row = document
        .create_element(table, "tr", &[("id", "AlgorithmSpecificControls")])
        .expect("row");
    let cell = document.create_element(row, "td", &[]).expect("cell");
    let text = document
        .create_element(cell, "input", &[("type", "text")])
        .expect("text");
    let nested = document.create_element(cell, "span", &[]).expect("span");
    let deep = document
        .create_element(nested, "input", &[("type", "Text"), ("name", "deep")])
        .expect("deep");
    (document, text, deep)
}

#[test]
fn parses_child_and_descendant_chains() {
    let selector = Selector::parse("#AlgorithmSpecificControls>td>input[type=Text]").expect("parse");
    assert_eq!(selector.parts.len(), 3);
    assert_eq!(selector.parts[0].0, Combinator::Descendant);
    assert_eq!(selector.parts[1].0, Combinator::Child);
    assert_eq!(selector.parts[2].1.tag.as_deref(), Some("input"));
    assert_eq!(
        selector.parts[2].1.attributes,
        vec![("type".to_string(), Some("Text".to_string()))]
    );

    let spaced = Selector::parse("  table  tr > td input ").expect("parse");
    let combinators: Vec<Combinator> = spaced.parts.iter().map(|(c, _)| *c).collect();
    assert_eq!(
        combinators,
        vec![
            Combinator::Descendant,
            Combinator::Descendant,
            Combinator::Child,
            Combinator::Descendant
        ]
    );
}

#[test]
fn rejects_malformed_selectors() {
    for bad in ["", "   ", ">td", "td>>input", "td,input", "[=x]", "#", "input[type=Text", "input[type\"x\"]", "a[b='c]"] {
        let err = Selector::parse(bad).expect_err(bad);
        assert_eq!(err.code, ErrorCode::InvalidSelector, "{bad}");
    }
}

#[test]
fn accepts_quoted_and_bare_attribute_forms() {
    let (document, text, _) = sample();
    for selector in [
        "input[type=text]",
        "input[type='TEXT']",
        "input[type=\"Text\"]",
        "td > input[type]",
    ] {
        assert_eq!(document.query_selector(selector).expect(selector), Some(text), "{selector}");
    }
}

#[test]
fn type_attribute_ignores_case_but_others_do_not() {
    let (document, _, deep) = sample();
    assert_eq!(document.query_selector("input[name=deep]").expect("query"), Some(deep));
    assert_eq!(document.query_selector("input[name=DEEP]").expect("query"), None);
}

#[test]
fn child_combinator_skips_deeper_matches() {
    let (document, text, deep) = sample();
    assert_eq!(
        document
            .query_selector("#AlgorithmSpecificControls>td>input[type=Text]")
            .expect("query"),
        Some(text)
    );
    assert_eq!(document.query_selector("td>span>input").expect("query"), Some(deep));
    assert_eq!(document.query_selector("tr>input").expect("query"), None);
    assert_eq!(document.query_selector("tr input[name]").expect("query"), Some(deep));
}

#[test]
fn universal_and_id_only_compounds_match() {
    let (document, _, _) = sample();
    let row = document.query_selector("#AlgorithmSpecificControls").expect("query");
    assert!(row.is_some());
    assert_eq!(document.query_selector("*#AlgorithmSpecificControls").expect("query"), row);
    assert_eq!(document.query_selector("#Missing").expect("query"), None);
}
