use std::path::{Path, PathBuf};

use super::{ParseOptions, parse_map};
use crate::keyspace::{Boundary, KeyScope};

const MAP: &str = "/ws/maps/root.ditamap";

fn ws() -> Boundary {
    Boundary::new([PathBuf::from("/ws")])
}

fn parse(text: &str) -> super::ParsedMap {
    parse_map(text, Path::new(MAP), &ParseOptions::default(), &ws())
}

#[test]
fn test_keydef_with_fragment() {
    let parsed = parse(r#"<map><keydef keys="product" href="info.dita#sec1"/></map>"#);

    assert_eq!(parsed.keys.len(), 1);
    let def = &parsed.keys[0];
    assert_eq!(def.key_name, "product");
    assert_eq!(def.target_file, Some(PathBuf::from("/ws/maps/info.dita")));
    assert_eq!(def.element_id.as_deref(), Some("sec1"));
    assert_eq!(def.source_map, PathBuf::from(MAP));
}

#[test]
fn test_multiple_keys_share_target() {
    let parsed = parse(r#"<map><keydef keys="a  b
        c" href="../shared/t.dita" scope="local" processing-role="resource-only"/></map>"#);

    let names: Vec<_> = parsed.keys.iter().map(|d| d.key_name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    for def in &parsed.keys {
        assert_eq!(def.target_file, Some(PathBuf::from("/ws/shared/t.dita")));
        assert_eq!(def.source_map, PathBuf::from(MAP));
        assert_eq!(def.scope, Some(KeyScope::Local));
        assert_eq!(def.processing_role.as_deref(), Some("resource-only"));
    }
}

#[test]
fn test_remote_href_not_a_target() {
    let parsed = parse(r#"<map><keydef keys="site" href="https://example.com/x#y" scope="external"/></map>"#);

    let def = &parsed.keys[0];
    assert_eq!(def.target_file, None);
    assert_eq!(def.element_id, None);
    assert_eq!(def.scope, Some(KeyScope::External));
}

#[test]
fn test_out_of_boundary_target_dropped_keeps_inline() {
    let parsed = parse(
        r#"<map>
          <keydef keys="secret" href="../../etc/passwd">
            <topicmeta><keywords><keyword>Fallback text</keyword></keywords></topicmeta>
          </keydef>
        </map>"#,
    );

    let def = &parsed.keys[0];
    assert_eq!(def.target_file, None);
    assert_eq!(def.inline_content.as_deref(), Some("Fallback text"));
}

#[test]
fn test_inline_content_priority() {
    let parsed = parse(
        r#"<map>
          <keydef keys="name">
            <topicmeta>
              <navtitle>Nav</navtitle>
              <linktext>Link &amp; text</linktext>
            </topicmeta>
          </keydef>
          <keydef keys="empty"/>
        </map>"#,
    );

    assert_eq!(parsed.keys[0].inline_content.as_deref(), Some("Link & text"));
    assert!(parsed.keys[1].is_empty());
}

#[test]
fn test_inline_content_not_taken_from_nested_child() {
    let parsed = parse(
        r#"<map>
          <topicref keys="parent">
            <topicref keys="child"><topicmeta><keywords><keyword>Child</keyword></keywords></topicmeta></topicref>
          </topicref>
        </map>"#,
    );

    assert_eq!(parsed.keys[0].key_name, "parent");
    assert_eq!(parsed.keys[0].inline_content, None);
    assert_eq!(parsed.keys[1].inline_content.as_deref(), Some("Child"));
}

#[test]
fn test_map_references() {
    let parsed = parse(
        r#"<map>
          <mapref href="sub/a.ditamap"/>
          <topicref href="b.ditamap#frag" format="ditamap"/>
          <chapter href="../book/c.bookmap"/>
          <topicref href="topic.dita"/>
          <mapref href="https://example.com/remote.ditamap"/>
          <mapref href="../../outside.ditamap"/>
          <link href="d.ditamap"/>
        </map>"#,
    );

    assert_eq!(
        parsed.map_refs,
        vec![
            PathBuf::from("/ws/maps/sub/a.ditamap"),
            PathBuf::from("/ws/maps/b.ditamap"),
            PathBuf::from("/ws/book/c.bookmap"),
        ]
    );
}

#[test]
fn test_mapref_with_keys_is_both() {
    let parsed = parse(r#"<map><mapref keys="lib" href="lib.ditamap"/></map>"#);
    assert_eq!(parsed.keys.len(), 1);
    assert_eq!(parsed.map_refs, vec![PathBuf::from("/ws/maps/lib.ditamap")]);
}

#[test]
fn test_key_match_cap() {
    let text: String = (0..10)
        .map(|i| format!(r#"<keydef keys="k{i}"/>"#))
        .collect();
    let options = ParseOptions { max_key_matches: 3, max_map_refs: 10 };
    let parsed = parse_map(&text, Path::new(MAP), &options, &ws());

    assert_eq!(parsed.keys.len(), 3);
    assert!(parsed.keys_capped);
    assert!(!parsed.refs_capped);
}

#[test]
fn test_map_ref_cap() {
    let text: String = (0..5)
        .map(|i| format!(r#"<mapref href="m{i}.ditamap"/>"#))
        .collect();
    let options = ParseOptions { max_key_matches: 10, max_map_refs: 2 };
    let parsed = parse_map(&text, Path::new(MAP), &options, &ws());

    assert_eq!(parsed.map_refs.len(), 2);
    assert!(parsed.refs_capped);
}

#[test]
fn test_malformed_input_is_partial_not_fatal() {
    let parsed = parse(
        r#"<map><keydef keys="ok" href="a.dita"/><keydef keys="broken href="x.dita"
           <<<>>> </notopen> <keydef keys="later"/>"#,
    );

    let names: Vec<_> = parsed.keys.iter().map(|d| d.key_name.as_str()).collect();
    assert!(names.contains(&"ok"));
    assert!(names.contains(&"later"));
}

#[test]
fn test_commented_definitions_ignored() {
    let parsed = parse(r#"<map><!-- <keydef keys="old" href="old.dita"/> --><keydef keys="new"/></map>"#);
    assert_eq!(parsed.keys.len(), 1);
    assert_eq!(parsed.keys[0].key_name, "new");
}

#[test]
fn test_unrestricted_boundary() {
    let parsed = parse_map(
        r#"<map><keydef keys="k" href="../../../etc/hosts"/></map>"#,
        Path::new(MAP),
        &ParseOptions::default(),
        &Boundary::unrestricted(),
    );
    assert_eq!(parsed.keys[0].target_file, Some(PathBuf::from("/etc/hosts")));
}
