//! Reader/writer tests against whole documents

use xmlens_document::{Document, NodeKind};

#[test]
fn test_parse_serialize_keeps_structure() {
    let source = r#"<?xml version="1.0"?>
<server port="8005">
  <service name="Catalina">
    <connector port="8080" protocol="HTTP/1.1"/>
    <engine name="Catalina" defaultHost="localhost">
      <host name="localhost">webapps</host>
    </engine>
  </service>
</server>
"#;

    let doc = Document::parse(source).unwrap();
    assert_eq!(doc.to_xml(), source);
}

#[test]
fn test_reparse_of_written_document_is_equal() {
    let mut doc = Document::parse("<a><b x=\"1\">t &amp; u</b></a>").unwrap();
    let root = doc.root().unwrap();
    let c = doc.create_element("c");
    doc.append_child(root, c).unwrap();
    doc.set_attribute(c, "q", "\"quoted\"").unwrap();

    let reparsed = Document::parse(&doc.to_xml()).unwrap();
    let root = reparsed.root().unwrap();
    let c = reparsed.children_named(&[root], "c")[0];
    assert_eq!(reparsed.attribute(c, "q"), Some("\"quoted\""));
    let b = reparsed.children_named(&[root], "b")[0];
    assert_eq!(reparsed.text(b), Some("t & u"));
}

#[test]
fn test_json_dump() {
    let doc = Document::parse("<a x=\"1\"><b>v</b></a>").unwrap();
    let json = serde_json::to_value(&doc).unwrap();

    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0]["kind"], "document");
    assert_eq!(nodes[1]["name"], "a");
    assert_eq!(nodes[1]["attributes"][0]["value"], "1");
    assert_eq!(nodes[2]["text"], "v");

    let back: Document = serde_json::from_value(json).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.get(back.document_node()).unwrap().kind, NodeKind::Document);
}

#[test]
fn test_mixed_content_is_stable_across_rewrites() {
    let mut xml = Document::parse("<a>lead<b>x</b><c><d/>inner</c></a>").unwrap().to_xml();
    let first = xml.clone();

    for _ in 0..3 {
        xml = Document::parse(&xml).unwrap().to_xml();
        assert_eq!(xml, first);
    }

    let doc = Document::parse(&xml).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(doc.text(root), Some("lead"));
    let c = doc.children_named(&[root], "c")[0];
    assert_eq!(doc.text(c), Some("inner"));
}

#[test]
fn test_doctype_subset_and_cdata_survive_rewrite() {
    let source = "<!DOCTYPE a [<!ENTITY e \"x\">]>\n<a><![CDATA[x]]]></a>";
    let doc = Document::parse(source).unwrap();
    let xml = doc.to_xml();
    assert_eq!(xml, "<!DOCTYPE a [<!ENTITY e \"x\">]>\n<a>x]</a>\n");
    assert_eq!(Document::parse(&xml).unwrap(), doc);
}
