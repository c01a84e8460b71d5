//! Bracketed predicates narrowing a candidate node set.
//!
//! A raw predicate is one or more bracket groups, `[g1][g2]...`, applied
//! left to right. Each group is one of:
//!
//! ```text
//! [#attribute/name == "value"]   attribute comparison (node must carry the attribute)
//! [text() == "value"]            text comparison (the left-hand expression is not inspected)
//! [2]                            1-based index into the candidates
//! [last()] [last()-1] [last(-1)] position from the end
//! ```

use crate::error::{LensError, LensResult};
use crate::expression::{compare, Operator, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use xmlens_document::{Document, NodeId};

static COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(#attribute/)?(.*?)\s+(==|!=|<=|>=|<|>)\s+"(.*)"\s*$"#).unwrap()
});

static INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[?(\d+)\]?\s*$").unwrap());

static LAST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*last\(\s*(?:([+-])\s*(\d*))?\s*\)\s*(?:([+-])\s*(\d*))?\s*$").unwrap()
});

#[derive(Debug, Clone, PartialEq)]
pub enum LastOffset {
    /// `last()`
    None,
    /// `last()-N`
    Minus(usize),
    /// `last()+N`: never matches an existing node
    Plus(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredicateGroup {
    Compare {
        attribute: Option<String>,
        op: Operator,
        value: String,
    },
    /// 1-based, as written
    Index(i64),
    Last(LastOffset),
    /// Anything else; filters everything out
    Unknown(String),
}

impl PredicateGroup {
    /// Split `[a][b]` into its groups and classify each
    pub fn parse_all(raw: &str) -> LensResult<Vec<PredicateGroup>> {
        let trimmed = raw.trim();
        let inner = trimmed.strip_prefix('[').unwrap_or(trimmed);
        let inner = inner.strip_suffix(']').unwrap_or(inner);

        inner.split("][").map(PredicateGroup::parse).collect()
    }

    pub fn parse(group: &str) -> LensResult<PredicateGroup> {
        if let Some(caps) = COMPARISON.captures(group) {
            let op: Operator = caps[3].parse()?;
            let attribute = caps.get(1).map(|_| {
                let name = caps[2].trim();
                name.strip_suffix('/').unwrap_or(name).to_string()
            });
            return Ok(PredicateGroup::Compare {
                attribute,
                op,
                value: caps[4].to_string(),
            });
        }

        if let Some(caps) = INDEX.captures(group) {
            return Ok(match caps[1].parse::<i64>() {
                Ok(index) => PredicateGroup::Index(index),
                Err(_) => PredicateGroup::Unknown(group.to_string()),
            });
        }

        if let Some(caps) = LAST.captures(group) {
            let sign = caps.get(1).or_else(|| caps.get(3)).map(|m| m.as_str());
            let digits = caps
                .get(2)
                .filter(|_| caps.get(1).is_some())
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or_default();

            let offset = match sign {
                None => LastOffset::None,
                Some(sign) => {
                    let n: usize = digits.parse().map_err(|_| {
                        LensError::argument(format!("'{}' needs a numeric offset", group))
                    })?;
                    if sign == "+" {
                        LastOffset::Plus(n)
                    } else {
                        LastOffset::Minus(n)
                    }
                }
            };
            return Ok(PredicateGroup::Last(offset));
        }

        Ok(PredicateGroup::Unknown(group.to_string()))
    }
}

impl fmt::Display for PredicateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateGroup::Compare {
                attribute: Some(name),
                op,
                value,
            } => write!(f, "[#attribute/{} {} \"{}\"]", name, op, value),
            PredicateGroup::Compare {
                attribute: None,
                op,
                value,
            } => write!(f, "[text() {} \"{}\"]", op, value),
            PredicateGroup::Index(index) => write!(f, "[{}]", index),
            PredicateGroup::Last(LastOffset::None) => write!(f, "[last()]"),
            PredicateGroup::Last(LastOffset::Minus(n)) => write!(f, "[last()-{}]", n),
            PredicateGroup::Last(LastOffset::Plus(n)) => write!(f, "[last()+{}]", n),
            PredicateGroup::Unknown(raw) => write!(f, "[{}]", raw),
        }
    }
}

/// Position lookup that wraps negative positions from the end
fn wrapped(candidates: &[NodeId], index: i64) -> Option<NodeId> {
    let len = candidates.len() as i64;
    let position = if index < 0 { len + index } else { index };
    if (0..len).contains(&position) {
        candidates.get(position as usize).copied()
    } else {
        None
    }
}

/// Filter `candidates` through a raw predicate.
///
/// `None` means no match; a returned set is never empty. Index and
/// `last()` groups count positions in the unfiltered `candidates`, and the
/// selected node must still be in the set produced by the previous groups.
pub fn evaluate_match(
    doc: &Document,
    candidates: &[NodeId],
    predicate: Option<&str>,
) -> LensResult<Option<Vec<NodeId>>> {
    let Some(predicate) = predicate else {
        return Ok(Some(candidates.to_vec()));
    };

    let mut selected = candidates.to_vec();

    for group in PredicateGroup::parse_all(predicate)? {
        match group {
            PredicateGroup::Compare {
                attribute,
                op,
                value,
            } => {
                let expected = Value::text(value);
                let mut kept = Vec::with_capacity(selected.len());
                for id in selected {
                    let actual = match &attribute {
                        Some(name) => match doc.attribute(id, name) {
                            Some(v) => Value::text(v),
                            None => continue,
                        },
                        None => Value::from_option(doc.text(id)),
                    };
                    if compare(&actual, op, &expected)? {
                        kept.push(id);
                    }
                }
                selected = kept;
            }
            PredicateGroup::Index(index) => {
                let index = index - 1;
                if (candidates.len() as i64) < index {
                    return Ok(None);
                }
                match wrapped(candidates, index) {
                    Some(node) if selected.contains(&node) => selected = vec![node],
                    _ => return Ok(None),
                }
            }
            PredicateGroup::Last(LastOffset::None) => match candidates.last() {
                Some(&node) if selected.contains(&node) => selected = vec![node],
                _ => return Ok(None),
            },
            PredicateGroup::Last(LastOffset::Minus(n)) => {
                let index = candidates.len() as i64 - n as i64;
                match wrapped(candidates, index) {
                    Some(node) if selected.contains(&node) => selected = vec![node],
                    _ => return Ok(None),
                }
            }
            PredicateGroup::Last(LastOffset::Plus(_)) | PredicateGroup::Unknown(_) => {
                return Ok(None);
            }
        }
    }

    if selected.is_empty() {
        Ok(None)
    } else {
        Ok(Some(selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, Vec<NodeId>) {
        let doc = Document::parse(
            r#"<a><b x="1">one</b><b x="2">two</b><b>3</b><b x="10">four</b></a>"#,
        )
        .unwrap();
        let root = doc.root().unwrap();
        let bs = doc.children_named(&[root], "b");
        (doc, bs)
    }

    fn run(doc: &Document, candidates: &[NodeId], predicate: &str) -> Option<Vec<NodeId>> {
        evaluate_match(doc, candidates, Some(predicate)).unwrap()
    }

    #[test]
    fn test_parse_groups() {
        let groups = PredicateGroup::parse_all(r#"[#attribute/x == "1"][2][last()-1]"#).unwrap();
        assert_eq!(
            groups,
            vec![
                PredicateGroup::Compare {
                    attribute: Some("x".to_string()),
                    op: Operator::Eq,
                    value: "1".to_string(),
                },
                PredicateGroup::Index(2),
                PredicateGroup::Last(LastOffset::Minus(1)),
            ]
        );
    }

    #[test]
    fn test_parse_trailing_slash_attribute_form() {
        let group = PredicateGroup::parse(r#"#attribute/x/ != "1""#).unwrap();
        assert!(matches!(group, PredicateGroup::Compare { attribute: Some(ref n), .. } if n == "x"));
    }

    #[test]
    fn test_parse_last_forms() {
        assert_eq!(PredicateGroup::parse("last()").unwrap(), PredicateGroup::Last(LastOffset::None));
        assert_eq!(PredicateGroup::parse("last(-2)").unwrap(), PredicateGroup::Last(LastOffset::Minus(2)));
        assert_eq!(PredicateGroup::parse("last()+1").unwrap(), PredicateGroup::Last(LastOffset::Plus(1)));
        assert!(PredicateGroup::parse("last()-").unwrap_err().is_argument_error());
    }

    #[test]
    fn test_no_predicate_passes_through() {
        let (doc, bs) = sample();
        assert_eq!(evaluate_match(&doc, &bs, None).unwrap(), Some(bs.clone()));
    }

    #[test]
    fn test_attribute_equality() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, r#"[#attribute/x == "2"]"#), Some(vec![bs[1]]));
        assert_eq!(run(&doc, &bs, r#"[#attribute/x == "9"]"#), None);
    }

    #[test]
    fn test_attribute_must_exist() {
        let (doc, bs) = sample();
        assert_eq!(
            run(&doc, &bs, r#"[#attribute/x != "1"]"#),
            Some(vec![bs[1], bs[3]])
        );
    }

    #[test]
    fn test_relational_is_numeric() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, r#"[#attribute/x > "1"]"#), Some(vec![bs[1], bs[3]]));
        assert_eq!(run(&doc, &bs, r#"[#attribute/x >= "10"]"#), Some(vec![bs[3]]));
    }

    #[test]
    fn test_text_comparison() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, r#"[text() == "two"]"#), Some(vec![bs[1]]));
        assert_eq!(run(&doc, &bs, r#"[. == "3"]"#), Some(vec![bs[2]]));
    }

    #[test]
    fn test_index() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, "[1]"), Some(vec![bs[0]]));
        assert_eq!(run(&doc, &bs, "[4]"), Some(vec![bs[3]]));
        assert_eq!(run(&doc, &bs, "[5]"), None);
        assert_eq!(run(&doc, &bs, "[9]"), None);
    }

    #[test]
    fn test_index_zero_wraps_to_last() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, "[0]"), Some(vec![bs[3]]));
    }

    #[test]
    fn test_index_must_survive_previous_groups() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, r#"[#attribute/x == "2"][2]"#), Some(vec![bs[1]]));
        assert_eq!(run(&doc, &bs, r#"[#attribute/x == "2"][1]"#), None);
    }

    #[test]
    fn test_last() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, "[last()]"), Some(vec![bs[3]]));
        assert_eq!(run(&doc, &bs, "[last()-1]"), Some(vec![bs[3]]));
        assert_eq!(run(&doc, &bs, "[last()-2]"), Some(vec![bs[2]]));
        assert_eq!(run(&doc, &bs, "[last(-4)]"), Some(vec![bs[0]]));
        assert_eq!(run(&doc, &bs, "[last()-0]"), None);
        assert_eq!(run(&doc, &bs, "[last()-5]"), Some(vec![bs[3]]));
        assert_eq!(run(&doc, &bs, "[last()-9]"), None);
    }

    #[test]
    fn test_last_plus_never_matches() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, "[last()+1]"), None);
    }

    #[test]
    fn test_last_respects_filtering() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, r#"[#attribute/x == "1"][last()]"#), None);
    }

    #[test]
    fn test_unknown_group_matches_nothing() {
        let (doc, bs) = sample();
        assert_eq!(run(&doc, &bs, "[position() = 1]"), None);
    }

    #[test]
    fn test_empty_candidates() {
        let (doc, _) = sample();
        assert_eq!(run(&doc, &[], "[1]"), None);
        assert_eq!(run(&doc, &[], "[last()]"), None);
    }
}
