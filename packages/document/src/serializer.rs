use crate::document::Document;
use crate::node::NodeId;

/// Serializer writes a [`Document`] back out as indented XML.
///
/// Only nodes reachable from the document node are written; detached
/// nodes still in the arena are skipped.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "  ".to_string(), // 2 spaces
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    pub fn serialize(&mut self, doc: &Document) -> String {
        let mut output = String::new();

        if let Some(declaration) = &doc.declaration {
            output.push_str(declaration);
            output.push('\n');
        }

        if let Some(doctype) = &doc.doctype {
            output.push_str(doctype);
            output.push('\n');
        }

        for &child in doc.children(doc.document_node()) {
            self.serialize_element(doc, child, &mut output);
        }

        output
    }

    fn serialize_element(&mut self, doc: &Document, id: NodeId, output: &mut String) {
        let Some(node) = doc.get(id) else {
            return;
        };

        self.write_indent(output);
        output.push('<');
        output.push_str(&node.name);
        for attr in &node.attributes {
            output.push(' ');
            output.push_str(&attr.name);
            output.push_str("=\"");
            output.push_str(&escape_attribute(&attr.value));
            output.push('"');
        }

        match (&node.text, node.children.is_empty()) {
            (None, true) => {
                output.push_str("/>\n");
            }
            (Some(text), true) => {
                output.push('>');
                output.push_str(&escape_text(text));
                output.push_str("</");
                output.push_str(&node.name);
                output.push_str(">\n");
            }
            (text, false) => {
                output.push_str(">\n");
                self.indent_level += 1;

                if let Some(text) = text {
                    self.write_indent(output);
                    output.push_str(&escape_text(text));
                    output.push('\n');
                }

                for &child in &node.children {
                    self.serialize_element(doc, child, output);
                }

                self.indent_level -= 1;
                self.write_indent(output);
                output.push_str("</");
                output.push_str(&node.name);
                output.push_str(">\n");
            }
        }
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Serialize with the default two-space indent
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}
