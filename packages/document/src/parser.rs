use crate::document::Document;
use crate::error::{ParseError, ParseResult};
use crate::node::NodeId;
use crate::tokenizer::{tokenize, Token};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static TAG_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<([^\s/>]+)").unwrap());

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=/>"']+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// Reader for XML markup into a [`Document`]
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, std::ops::Range<usize>)>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let tokens = tokenize(source).map_err(ParseError::lexer_error)?;
        Ok(Self { tokens, pos: 0 })
    }

    pub fn parse_document(&mut self) -> ParseResult<Document> {
        let mut doc = Document::new();
        let mut open: Vec<NodeId> = Vec::new();

        while let Some((token, span)) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;

            match token {
                Token::ProcessingInstruction(pi) => {
                    if pi.starts_with("<?xml ") && doc.root().is_none() && open.is_empty() {
                        doc.declaration = Some(pi.to_string());
                    }
                }
                Token::Doctype(doctype) => {
                    doc.doctype = Some(doctype.to_string());
                }
                Token::Comment => {}
                Token::StartTag(tag) => {
                    let self_closing = tag.ends_with("/>");
                    let id = Self::parse_start_tag(&mut doc, tag, span.start)?;
                    let parent = open.last().copied().unwrap_or(doc.document_node());
                    doc.append_child(parent, id)
                        .map_err(|_| ParseError::InvalidStartTag { pos: span.start })?;

                    if !self_closing {
                        open.push(id);
                    }
                }
                Token::EndTag(name) => {
                    let Some(current) = open.pop() else {
                        return Err(ParseError::unexpected_end_tag(span.start, name));
                    };
                    let expected = doc.name(current).unwrap_or_default();
                    if expected != name {
                        return Err(ParseError::mismatched_tag(span.start, expected, name));
                    }
                    Self::trim_mixed_text(&mut doc, current);
                }
                Token::Text(text) => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    let Some(&current) = open.last() else {
                        return Err(ParseError::TextOutsideRoot { pos: span.start });
                    };
                    Self::append_text(&mut doc, current, &decode_entities(text));
                }
                Token::CData(text) => {
                    let Some(&current) = open.last() else {
                        return Err(ParseError::TextOutsideRoot { pos: span.start });
                    };
                    Self::append_text(&mut doc, current, text);
                }
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(ParseError::UnclosedTag(
                doc.name(*unclosed).unwrap_or_default().to_string(),
            ));
        }

        if doc.root().is_none() {
            return Err(ParseError::NoRootElement);
        }

        debug!(nodes = doc.arena_len(), "Parsed document");
        Ok(doc)
    }

    fn parse_start_tag(doc: &mut Document, tag: &str, pos: usize) -> ParseResult<NodeId> {
        let name = TAG_NAME
            .captures(tag)
            .and_then(|c| c.get(1))
            .ok_or(ParseError::InvalidStartTag { pos })?
            .as_str();

        let id = doc.create_element(name);
        let attributes = &tag[name.len() + 1..];
        for caps in ATTRIBUTE.captures_iter(attributes) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            doc.set_attribute(id, &caps[1], decode_entities(value))
                .map_err(|_| ParseError::InvalidStartTag { pos })?;
        }

        Ok(id)
    }

    /// Text beside child elements loses its surrounding layout whitespace,
    /// so writing the document and reading it back keeps the same value.
    fn trim_mixed_text(doc: &mut Document, id: NodeId) {
        let Some(node) = doc.get_mut(id) else {
            return;
        };
        if node.children.is_empty() {
            return;
        }
        if let Some(text) = node.text.take() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                node.text = Some(trimmed.to_string());
            }
        }
    }

    fn append_text(doc: &mut Document, id: NodeId, text: &str) {
        if let Some(node) = doc.get_mut(id) {
            match node.text.as_mut() {
                Some(existing) => existing.push_str(text),
                None => node.text = Some(text.to_string()),
            }
        }
    }
}

/// Decode the predefined and numeric character references.
/// Unknown references are left untouched.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let decoded = candidate.find(';').and_then(|end| {
            let entity = &candidate[1..end];
            let ch = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((ch, end)) => {
                output.push(ch);
                rest = &candidate[end + 1..];
            }
            None => {
                output.push('&');
                rest = &candidate[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

/// Parse XML markup into a [`Document`]
pub fn parse(source: &str) -> ParseResult<Document> {
    Parser::new(source)?.parse_document()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let doc = parse(r#"<a><b x="1"/><b x="2">two</b></a>"#).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.name(root), Some("a"));

        let bs = doc.children_named(&[root], "b");
        assert_eq!(bs.len(), 2);
        assert_eq!(doc.attribute(bs[0], "x"), Some("1"));
        assert_eq!(doc.text(bs[0]), None);
        assert_eq!(doc.text(bs[1]), Some("two"));
    }

    #[test]
    fn test_whitespace_text_is_dropped() {
        let doc = parse("<a>\n  <b>v</b>\n</a>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.text(root), None);
        assert_eq!(doc.children(root).len(), 1);
    }

    #[test]
    fn test_declaration_and_doctype_kept() {
        let doc = parse("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE a>\n<a/>").unwrap();
        assert_eq!(
            doc.declaration.as_deref(),
            Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")
        );
        assert_eq!(doc.doctype.as_deref(), Some("<!DOCTYPE a>"));
    }

    #[test]
    fn test_entities() {
        let doc = parse(r#"<a t="&quot;q&quot;">1 &lt; 2 &amp;&#65;&#x42; &bogus;</a>"#).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.attribute(root, "t"), Some("\"q\""));
        assert_eq!(doc.text(root), Some("1 < 2 &AB &bogus;"));
    }

    #[test]
    fn test_cdata() {
        let doc = parse("<a><![CDATA[<raw> & stuff]]></a>").unwrap();
        assert_eq!(doc.text(doc.root().unwrap()), Some("<raw> & stuff"));
    }

    #[test]
    fn test_mixed_text_is_trimmed() {
        let doc = parse("<a>\n  lead\n  <b> keep </b>\n</a>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.text(root), Some("lead"));
        let b = doc.children_named(&[root], "b")[0];
        assert_eq!(doc.text(b), Some(" keep "));
    }

    #[test]
    fn test_doctype_with_internal_subset() {
        let doc = parse("<!DOCTYPE a [<!ENTITY e \"x\">]>\n<a/>").unwrap();
        assert_eq!(doc.doctype.as_deref(), Some("<!DOCTYPE a [<!ENTITY e \"x\">]>"));
        assert!(doc.root().is_some());
    }

    #[test]
    fn test_cdata_ending_in_bracket() {
        let doc = parse("<a><![CDATA[x]]]></a>").unwrap();
        assert_eq!(doc.text(doc.root().unwrap()), Some("x]"));
    }

    #[test]
    fn test_mismatched_tag() {
        let err = parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, ParseError::MismatchedTag { .. }));
    }

    #[test]
    fn test_unclosed_tag() {
        assert_eq!(parse("<a><b/>").unwrap_err(), ParseError::UnclosedTag("a".to_string()));
    }

    #[test]
    fn test_no_root() {
        assert_eq!(parse("<!-- nothing -->").unwrap_err(), ParseError::NoRootElement);
    }

    #[test]
    fn test_text_outside_root() {
        assert!(matches!(
            parse("stray<a/>").unwrap_err(),
            ParseError::TextOutsideRoot { pos: 0 }
        ));
    }
}
