use pretty_assertions::assert_eq;
use rstest::rstest;

use sievers_dom::sieve::node::{CONDITION, ROOT};
use sievers_dom::sieve::{Capabilities, Document, Grammar, SieveError};

fn parse(caps: &[&str], text: &str) -> Document {
    Document::parse(Grammar::standard(), Capabilities::new(caps), text).unwrap()
}

fn all_capabilities() -> Capabilities {
    let grammar = Grammar::standard();
    Capabilities::new(grammar.capability_names())
}

#[rstest]
#[case::actions("keep;\r\ndiscard;\r\nstop;\r\n")]
#[case::comments("# header comment\r\n/* block\r\n comment */ keep ;\r\n")]
#[case::nested(
    "if anyof (not exists \"X-Spam\", size :under 10K) {\r\n  if true { keep; }\r\n} else {\r\n  discard;\r\n}\r\n"
)]
#[case::multiline("vacation text:\r\nGone fishing.\r\n..and back soon\r\n.\r\n;\r\n")]
#[case::literal("fileinto {5+}\r\nINBOX;\r\n")]
#[case::unterminated_comment("keep;\r\n# no line break")]
#[case::metadata(
    "if allof (metadataexists \"INBOX\" \"/private/comment\",\r\n  metadata :contains \"INBOX\" \"/private/comment\" \"x\") { keep; }\r\n"
)]
#[case::servermetadata(
    "if anyof (servermetadataexists [\"/shared/admin\"],\r\n  servermetadata :matches \"/shared/admin\" \"*@example.com\") { stop; }\r\n"
)]
#[case::pipe("pipe :copy :try \"sa-learn\" [\"--spam\", \"-q\"];\r\npipe \"notify\";\r\n")]
#[case::filter("if filter \"rewrite\" { filter \"rewrite\" [\"-v\"]; }\r\n")]
#[case::execute(
    "execute :pipe \"log\";\r\nexecute :input \"text\" :output \"result\" \"run\" [\"a\"];\r\nif execute :output \"out\" \"check\" { stop; }\r\n"
)]
fn test_round_trip_is_exact(#[case] text: &str) {
    let doc = Document::parse(Grammar::standard(), all_capabilities(), text).unwrap();
    assert_eq!(doc.serialize(doc.root().unwrap()).unwrap(), text);
}

#[rstest]
#[case::lf("keep;\nstop;\n", "keep;\r\nstop;\r\n")]
#[case::cr("keep;\rstop;\r", "keep;\r\nstop;\r\n")]
#[case::crlf("keep;\r\nstop;\r\n", "keep;\r\nstop;\r\n")]
fn test_line_endings_are_normalized(#[case] text: &str, #[case] expected: &str) {
    let mut doc = parse(&[], text);
    assert_eq!(doc.to_script().unwrap(), expected);
}

#[rstest]
#[case::crlf_then_lf("keep;\r\nstop;\n")]
#[case::lf_then_crlf("keep;\nstop;\r\n")]
#[case::cr_then_crlf("keep;\rstop;\r\n")]
fn test_mixed_line_endings_are_normalized(#[case] text: &str) {
    let mut doc = parse(&[], text);
    assert_eq!(doc.to_script().unwrap(), "keep;\r\nstop;\r\n");
}

#[test]
fn test_empty_document_has_no_script() {
    let mut doc = parse(&[], "");
    assert_eq!(doc.to_script().unwrap(), "");
}

#[test]
fn test_plain_keep_is_left_alone() {
    let mut doc = parse(&[], "keep;");
    assert_eq!(doc.to_script().unwrap(), "keep;");
}

#[test]
fn test_serialization_is_idempotent() {
    let caps = ["fileinto", "copy", "imap4flags", "variables"];
    let text = "require [\"fileinto\"];\r\nif header :is \"Subject\" \"x\" {\r\n  fileinto :copy \"Archive\";\r\n  setflag \"\\\\Seen\";\r\n}\r\n";
    let first = parse(&caps, text).to_script().unwrap();
    let second = parse(&caps, &first).to_script().unwrap();
    assert_eq!(second, first);
    assert_eq!(parse(&caps, &second).to_script().unwrap(), second);
}

#[rstest]
#[case::nothing(&[], "keep;", &[])]
#[case::string_only(&["variables", "body"], "if header \"Subject\" [\"a\", \"b\"] { keep; }", &[])]
#[case::fileinto(&["fileinto"], "fileinto \"X\";", &["fileinto"])]
#[case::tag(&["fileinto", "copy"], "fileinto :copy \"X\";", &["copy", "fileinto"])]
#[case::nested_test(&["envelope"], "if not envelope \"from\" \"x\" { stop; }", &["envelope"])]
#[case::match_type(&["regex"], "if header :regex \"Subject\" \"^x\" { stop; }", &["regex"])]
#[case::comparator(
    &["comparator-i;ascii-numeric"],
    "if header :comparator \"i;ascii-numeric\" \"X-Count\" \"3\" { stop; }",
    &["comparator-i;ascii-numeric"]
)]
fn test_collected_requirements(#[case] caps: &[&str], #[case] text: &str, #[case] expected: &[&str]) {
    let doc = parse(caps, text);
    let names: Vec<&str> = doc.collect_requirements().unwrap().into_iter().collect();
    assert_eq!(names, expected);
}

#[test]
fn test_default_match_type_is_omitted() {
    let mut doc = parse(&[], "if header :is \"Subject\" \"x\" {keep;}");
    assert_eq!(doc.to_script().unwrap(), "if header \"Subject\" \"x\" {keep;}");
}

#[test]
fn test_other_match_type_is_kept() {
    let text = "if header :matches \"Subject\" \"x\" {keep;}";
    let mut doc = parse(&[], text);
    assert_eq!(doc.to_script().unwrap(), text);
}

#[test]
fn test_literal_is_exact() {
    let text = "fileinto {11+}\r\nhello world;";
    let mut doc = parse(&["fileinto"], text);
    let fileinto = doc.query("fileinto").unwrap()[0];
    let path = doc.get_element(fileinto, "path").unwrap();
    assert_eq!(doc.string_value(path).unwrap(), "hello world");
    let body = doc.body().unwrap();
    assert_eq!(doc.serialize(body).unwrap(), text);
    assert_eq!(
        doc.to_script().unwrap(),
        format!("require \"fileinto\";\r\n{text}")
    );
}

#[test]
fn test_unknown_capability_is_rejected() {
    let mut doc = Document::new(Grammar::standard(), Capabilities::default());
    let err = doc.set_script("require \"frobnicate\"; keep;").unwrap_err();
    assert_eq!(
        err,
        SieveError::Capability {
            name: "frobnicate".to_string()
        }
    );
    assert!(doc.is_discarded());
    assert_eq!(doc.root(), Err(SieveError::Discarded));
    assert_eq!(doc.to_script(), Err(SieveError::Discarded));
}

#[test]
fn test_capability_outside_the_set_is_rejected() {
    let result = Document::parse(
        Grammar::standard(),
        Capabilities::default(),
        "require \"fileinto\";\r\nkeep;\r\n",
    );
    assert!(matches!(result, Err(SieveError::Capability { ref name }) if name == "fileinto"));
}

#[test]
fn test_unavailable_action_is_a_syntax_error() {
    let result = Document::parse(Grammar::standard(), Capabilities::default(), "fileinto \"X\";");
    assert!(matches!(result, Err(SieveError::Syntax { ref schema, .. }) if schema == ROOT));
}

#[test]
fn test_branch_classification() {
    let text = "if true {stop;} elsif true {stop;} else {stop;}";
    let mut doc = parse(&[], text);
    let condition = doc.query(CONDITION).unwrap()[0];
    let branches = doc.branches(condition).unwrap();
    assert_eq!(branches.len(), 3);
    let tested: Vec<bool> = branches
        .iter()
        .map(|&branch| doc.has_condition(branch).unwrap())
        .collect();
    assert_eq!(tested, vec![true, true, false]);
    assert_eq!(doc.to_script().unwrap(), text);
}

#[test]
fn test_keyword_spelling_is_kept() {
    let text = "IF true {stop;} ElsIf false {keep;} ELSE {discard;}";
    let mut doc = parse(&[], text);
    assert_eq!(doc.to_script().unwrap(), text);
}

#[test]
fn test_editing_adds_require() {
    let mut doc = parse(&["fileinto", "copy"], "require \"fileinto\";\r\nkeep;\r\n");
    let body = doc.body().unwrap();
    let fileinto = doc.create_from("fileinto", "fileinto :copy \"Archive\";").unwrap();
    doc.append_child(body, fileinto).unwrap();
    assert_eq!(
        doc.to_script().unwrap(),
        "require \"fileinto\";\r\nrequire \"copy\";\r\nkeep;\r\nfileinto :copy \"Archive\";\r\n"
    );
}

#[test]
fn test_stale_ids_after_reparse() {
    let mut doc = parse(&[], "keep;\r\n");
    let keep = doc.query("keep").unwrap()[0];
    doc.set_script("stop;\r\n").unwrap();
    assert_eq!(doc.node(keep).unwrap_err(), SieveError::StaleNode(keep));
}

#[test]
fn test_outline_serializes_to_json() {
    let doc = parse(&["fileinto"], "if size :over 1M { fileinto \"Big\"; }\r\n");
    let outline = doc.outline(doc.root().unwrap()).unwrap();
    let json = serde_json::to_value(&outline).unwrap();
    assert_eq!(json["name"], ROOT);
    let condition = &json["children"][1]["children"][0];
    assert_eq!(condition["name"], CONDITION);
    assert_eq!(condition["children"][0]["value"], "if");
}
