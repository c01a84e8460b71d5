//! # Path Resolution
//!
//! Paths look like `/segment[predicate]/segment...`. Resolution walks the
//! segments from the document node and reports how far the tree already
//! matches:
//!
//! ```text
//! /a/b[2]/c     tree: <a><b/><b><x/></b></a>
//!  a  ✓  context = [a]
//!  b[2] ✓  context = [b#2]
//!  c  ✗  exists = false, remainder = ["c"], nodes = [b#2]
//! ```
//!
//! The remainder is what `set`/`add` materialize.

use crate::error::LensResult;
use crate::predicate::{evaluate_match, LastOffset, PredicateGroup};
use crate::expression::{evaluate_expression, Operator, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::trace;
use xmlens_document::{Document, NodeId};

static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/([^\[/]*)((?:\[[^\]\[]*\])*)").unwrap());

const ATTRIBUTE_MARKER: &str = "#attribute/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    /// Raw bracket groups, e.g. `[1][#attribute/x == "2"]`
    pub predicate: Option<String>,
}

impl PathSegment {
    pub fn new(name: impl Into<String>, predicate: Option<String>) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    /// Split a path into segments. Empty segments (`//`, trailing `/`)
    /// are skipped; text before the first `/` is ignored.
    pub fn parse(path: &str) -> Self {
        let segments = SEGMENT
            .captures_iter(path.trim())
            .filter_map(|caps| {
                let name = caps[1].trim();
                if name.is_empty() {
                    return None;
                }
                let predicate = caps
                    .get(2)
                    .map(|m| m.as_str())
                    .filter(|p| !p.is_empty())
                    .map(str::to_string);
                Some(PathSegment::new(name, predicate))
            })
            .collect();

        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.name.clone()).collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment.name)?;
            if let Some(predicate) = &segment.predicate {
                write!(f, "{}", predicate)?;
            }
        }
        Ok(())
    }
}

/// Split `path#attribute/name` into the path and the attribute name.
/// Markers inside brackets belong to predicates and are left alone.
pub fn split_attribute(path: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    let mut found = None;

    for (i, ch) in path.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '#' if depth == 0 && path[i..].starts_with(ATTRIBUTE_MARKER) => found = Some(i),
            _ => {}
        }
    }

    match found {
        Some(i) => (&path[..i], Some(&path[i + ATTRIBUTE_MARKER.len()..])),
        None => (path, None),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// Nodes matched by the last successful segment, or the document node
    pub nodes: Vec<NodeId>,
    pub exists: bool,
    /// Names of the unmatched trailing segments, root-to-leaf
    pub remainder: Vec<String>,
}

impl ResolvedPath {
    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }
}

/// Resolve `path` against the current shape of `doc`
pub fn build_path(doc: &Document, path: &Path) -> LensResult<ResolvedPath> {
    let mut context = vec![doc.document_node()];

    for (i, segment) in path.segments.iter().enumerate() {
        let candidates = doc.children_named(&context, &segment.name);
        let matched = evaluate_match(doc, &candidates, segment.predicate.as_deref())?;

        match matched {
            Some(nodes) if !nodes.is_empty() => context = nodes,
            _ => {
                let remainder: Vec<String> =
                    path.segments[i..].iter().map(|s| s.name.clone()).collect();
                trace!(path = %path, ?remainder, "Path partially exists");
                return Ok(ResolvedPath {
                    nodes: context,
                    exists: false,
                    remainder,
                });
            }
        }
    }

    Ok(ResolvedPath {
        nodes: context,
        exists: true,
        remainder: Vec::new(),
    })
}

/// Rewrite `last()` groups as numeric indexes against the current tree:
/// `last()` becomes `[count]`, `last()+N` becomes `[count+N]` and
/// `last()-N` becomes `[count-N]`, where `count` is the number of
/// same-named siblings. Used to pin down where a missing node will go.
pub fn collapse_functions(doc: &Document, path: &Path) -> LensResult<Path> {
    let mut current: Option<Vec<NodeId>> = Some(vec![doc.document_node()]);
    let mut segments = Vec::with_capacity(path.segments.len());

    for segment in &path.segments {
        let candidates = current
            .as_ref()
            .map(|ctx| doc.children_named(ctx, &segment.name));

        let predicate = match &segment.predicate {
            Some(raw) => {
                let count = candidates.as_ref().map(|c| c.len()).unwrap_or(0) as i64;
                let mut collapsed = String::new();
                for group in PredicateGroup::parse_all(raw)? {
                    let group = match group {
                        PredicateGroup::Last(LastOffset::None) => PredicateGroup::Index(count),
                        PredicateGroup::Last(LastOffset::Plus(n)) => {
                            PredicateGroup::Index(offset(count, Operator::Add, n)?)
                        }
                        PredicateGroup::Last(LastOffset::Minus(n)) => {
                            PredicateGroup::Index(offset(count, Operator::Sub, n)?)
                        }
                        other => other,
                    };
                    collapsed.push_str(&group.to_string());
                }
                Some(collapsed)
            }
            None => None,
        };

        current = match candidates {
            Some(candidates) => evaluate_match(doc, &candidates, segment.predicate.as_deref())?,
            None => None,
        };

        segments.push(PathSegment::new(segment.name.clone(), predicate));
    }

    Ok(Path { segments })
}

fn offset(count: i64, op: Operator, n: usize) -> LensResult<i64> {
    let value = evaluate_expression(&Value::Int(count), op, &Value::Int(n as i64))?;
    Ok(value.to_int())
}
