//! Compiled statements.
//!
//! Compiling resolves a statement's path against the document as it is at
//! that moment and captures the resulting node handles. Operations that
//! run later act on those handles even if an earlier operation has moved
//! or detached them. The one exception is `set` on a missing path, which
//! stores the path and resolves it again when it runs.

use crate::error::LensResult;
use crate::expression::{compare, evaluate_expression, Operator, Value};
use crate::path::{build_path, collapse_functions, Path};
use crate::primitives::{self, SetTarget, SortKey, SortOrder};
use crate::statement::{Command, Statement};
use tracing::debug;
use xmlens_document::{Document, NodeId};

/// Mutating step
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Add {
        parents: Vec<NodeId>,
        names: Vec<String>,
    },
    Clear {
        nodes: Vec<NodeId>,
    },
    Remove {
        nodes: Vec<NodeId>,
    },
    Set {
        target: SetTarget,
        value: String,
        attribute: Option<String>,
    },
    Sort {
        nodes: Vec<NodeId>,
        key: SortKey,
        order: SortOrder,
    },
}

impl Operation {
    pub fn apply(&self, doc: &mut Document) -> LensResult<()> {
        match self {
            Operation::Add { parents, names } => primitives::add(doc, parents, names).map(|_| ()),
            Operation::Clear { nodes } => primitives::clear(doc, nodes),
            Operation::Remove { nodes } => primitives::rm(doc, nodes),
            Operation::Set {
                target,
                value,
                attribute,
            } => primitives::set(doc, target, value, attribute.as_deref()),
            Operation::Sort { nodes, key, order } => primitives::sort(doc, nodes, key, *order),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Clear { .. } => "clear",
            Operation::Remove { .. } => "rm",
            Operation::Set { .. } => "set",
            Operation::Sort { .. } => "sort",
        }
    }
}

/// Side-effect-free check gating the operations
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// Any node's text (or attribute) satisfies the comparison. With no
    /// nodes the comparison runs against null.
    Get {
        nodes: Vec<NodeId>,
        attribute: Option<String>,
        op: Operator,
        value: String,
    },
    /// Cardinality of the matched set
    Match { count: usize, op: Operator, size: i64 },
}

impl Validation {
    pub fn check(&self, doc: &Document) -> LensResult<bool> {
        match self {
            Validation::Get {
                nodes,
                attribute,
                op,
                value,
            } => {
                let expected = Value::text(value.as_str());
                if nodes.is_empty() {
                    return compare(&Value::Null, *op, &expected);
                }

                for &node in nodes {
                    let actual = match attribute {
                        Some(name) => Value::from_option(doc.attribute(node, name)),
                        None => Value::from_option(doc.text(node)),
                    };
                    if compare(&actual, *op, &expected)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Validation::Match { count, op, size } => {
                let count = i64::try_from(*count).unwrap_or(i64::MAX);
                Ok(evaluate_expression(&Value::Int(count), *op, &Value::Int(*size))?.is_truthy())
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Validation::Get { .. } => "get",
            Validation::Match { .. } => "match",
        }
    }
}

/// What a statement compiles to
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    Operation(Operation),
    Validation(Validation),
    /// Nothing to do: the path is absent, or the command has no effect
    Nothing,
}

impl Statement {
    /// Resolve this statement's paths against `doc` and capture the result
    pub fn compile(&self, doc: &Document) -> LensResult<Compiled> {
        let compiled = match &self.command {
            Command::Add { path } => {
                let resolved = build_path(doc, &Path::parse(path))?;
                if resolved.exists {
                    // Duplicate the matched leaf under its parent
                    let leaf = resolved.nodes[0];
                    let parents: Vec<NodeId> = doc.parent(leaf).into_iter().collect();
                    let names = vec![doc.name(leaf).unwrap_or_default().to_string()];
                    Compiled::Operation(Operation::Add { parents, names })
                } else {
                    Compiled::Operation(Operation::Add {
                        parents: resolved.nodes,
                        names: resolved.remainder,
                    })
                }
            }
            Command::Clear { path } => {
                let resolved = build_path(doc, &Path::parse(path))?;
                if resolved.exists {
                    Compiled::Operation(Operation::Clear {
                        nodes: resolved.nodes,
                    })
                } else {
                    Compiled::Nothing
                }
            }
            Command::Remove { path } => {
                let resolved = build_path(doc, &Path::parse(path))?;
                if resolved.exists {
                    Compiled::Operation(Operation::Remove {
                        nodes: resolved.nodes,
                    })
                } else {
                    Compiled::Nothing
                }
            }
            Command::Set {
                path,
                attribute,
                value,
            } => {
                let parsed = Path::parse(path);
                let resolved = build_path(doc, &parsed)?;
                let target = if resolved.exists {
                    SetTarget::Resolved(resolved.nodes)
                } else {
                    SetTarget::Deferred(collapse_functions(doc, &parsed)?)
                };
                Compiled::Operation(Operation::Set {
                    target,
                    value: value.clone(),
                    attribute: attribute.clone(),
                })
            }
            Command::Sort { path, key, order } => {
                let resolved = build_path(doc, &Path::parse(path))?;
                if resolved.exists {
                    Compiled::Operation(Operation::Sort {
                        nodes: resolved.nodes,
                        key: key.clone(),
                        order: *order,
                    })
                } else {
                    Compiled::Nothing
                }
            }
            Command::Get {
                path,
                attribute,
                op,
                value,
            } => {
                let resolved = build_path(doc, &Path::parse(path))?;
                let nodes = if resolved.exists {
                    resolved.nodes
                } else {
                    Vec::new()
                };
                Compiled::Validation(Validation::Get {
                    nodes,
                    attribute: attribute.clone(),
                    op: *op,
                    value: value.clone(),
                })
            }
            Command::Match { path, op, size } => {
                let resolved = build_path(doc, &Path::parse(path))?;
                let count = if resolved.exists {
                    resolved.nodes.len()
                } else {
                    0
                };
                Compiled::Validation(Validation::Match {
                    count,
                    op: *op,
                    size: *size,
                })
            }
            Command::Insert { target, .. } => {
                let resolved = build_path(doc, &Path::parse(target))?;
                debug!(target = %target, exists = resolved.exists, "Insert is validated but not applied");
                Compiled::Nothing
            }
        };

        debug!(
            command = self.command.keyword(),
            statement = %self,
            compiled = ?compiled,
            "Compiled statement"
        );
        Ok(compiled)
    }
}
