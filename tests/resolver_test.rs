use mcp_placeholder::store::parse_document;
use mcp_placeholder::{resolve, scan_all, Node, Resolution};

fn data(json: &str) -> Node {
    let doc = parse_document("test.json", json.as_bytes()).unwrap();
    doc.data().clone()
}

const TREE: &str = r#"{"placeholder":{"data":{
    "a": { "b": { "c": "deep", "d": [1, 2], "e": {} } },
    "flags": { "on": true, "off": false, "nothing": null, "zero": 0, "empty": "" }
}}}"#;

#[test]
fn test_every_present_path_resolves_to_its_node() {
    let root = data(TREE);
    let cases: [(&[&str], &str); 5] = [
        (&["a"], r#"{"b":{"c":"deep","d":[1,2],"e":{}}}"#),
        (&["a", "b"], r#"{"c":"deep","d":[1,2],"e":{}}"#),
        (&["a", "b", "c"], r#""deep""#),
        (&["a", "b", "d"], "[1,2]"),
        (&["a", "b", "e"], "{}"),
    ];
    for (path, rendered) in cases {
        match resolve(&root, path) {
            Resolution::Resolved(node) => {
                assert_eq!(mcp_placeholder::serialization::render(node), rendered, "path {path:?}")
            }
            broken => panic!("expected {path:?} to resolve, got {broken:?}"),
        }
    }
}

#[test]
fn test_broken_at_first_failing_segment() {
    let root = data(TREE);
    assert_eq!(
        resolve(&root, &["a", "x", "c"]),
        Resolution::Broken { index: 1, segment: "x" }
    );
    assert_eq!(
        resolve(&root, &["a", "b", "c", "length"]),
        Resolution::Broken { index: 3, segment: "length" }
    );
    assert_eq!(
        resolve(&root, &["A"]),
        Resolution::Broken { index: 0, segment: "A" }
    );
}

#[test]
fn test_falsy_values_count_as_missing() {
    let root = data(TREE);
    assert_eq!(
        resolve(&root, &["flags", "off"]),
        Resolution::Broken { index: 1, segment: "off" }
    );
    assert_eq!(
        resolve(&root, &["flags", "nothing", "below"]),
        Resolution::Broken { index: 1, segment: "nothing" }
    );
    assert!(resolve(&root, &["flags", "on"]).is_resolved());
    assert!(resolve(&root, &["flags", "zero"]).is_resolved());
    assert!(resolve(&root, &["flags", "empty"]).is_resolved());
}

#[test]
fn test_empty_path_resolves_to_root() {
    let root = data(TREE);
    let empty: Vec<String> = Vec::new();
    assert_eq!(resolve(&root, &empty).value(), Some(&root));
}

#[test]
fn test_identical_reloads_resolve_identically() {
    let first = parse_document("test.json", TREE.as_bytes()).unwrap();
    let second = parse_document("test.json", TREE.as_bytes()).unwrap();
    assert_eq!(first, second);
    for text in ["$(mcp.a.b.c)", "$(mcp.a.q)", "$(mcp.flags.off)"] {
        let occ = &scan_all(text)[0];
        assert_eq!(
            resolve(first.data(), occ.lookup_path()),
            resolve(second.data(), occ.lookup_path())
        );
    }
}

#[test]
fn test_namespace_token_is_not_a_lookup_key() {
    let root = data(r#"{"placeholder":{"data":{"mcp":{"x":1},"x":2}}}"#);
    let occ = &scan_all("$(mcp.x)")[0];
    assert_eq!(
        resolve(&root, occ.lookup_path()).value(),
        root.get("x")
    );
}
