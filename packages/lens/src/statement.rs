//! Statement grammar.
//!
//! ```text
//! add <path>
//! clear <path>
//! get <path>[#attribute/<name>] (==|!=|<|>|<=|>=) "<value>"
//! match <path> size (==|!=|<|>|<=|>=) <integer>
//! rm|remove <path>
//! set <path>[#attribute/<name>] "<value>"
//! sort <path> [<attribute>|text] [asc|desc]
//! ins|insert <source> (before|after) <target>
//! ```
//!
//! Parsing is purely syntactic; paths are resolved when the statement is
//! compiled against a document.

use crate::error::{LensError, LensResult};
use crate::expression::Operator;
use crate::path::{split_attribute, Path};
use crate::primitives::{SortKey, SortOrder};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+)(?:\s+(.*))?$").unwrap());

static GET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(.*)\s(==|!=|<=|>=|<|>)\s"(.*)"$"#).unwrap());

static MATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)\ssize\s+(==|!=|<=|>=|<|>)\s+(\d+)$").unwrap());

static SET: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(.*)\s"(.*)"$"#).unwrap());

static INSERT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)\s(before|after)\s(.*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        path: String,
    },
    Clear {
        path: String,
    },
    Get {
        path: String,
        attribute: Option<String>,
        op: Operator,
        value: String,
    },
    Match {
        path: String,
        op: Operator,
        size: i64,
    },
    Remove {
        path: String,
    },
    Set {
        path: String,
        attribute: Option<String>,
        value: String,
    },
    Sort {
        path: String,
        key: SortKey,
        order: SortOrder,
    },
    /// Syntax-checked only; never mutates
    Insert {
        source: String,
        position: InsertPosition,
        target: String,
    },
}

impl Command {
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Clear { .. } => "clear",
            Command::Get { .. } => "get",
            Command::Match { .. } => "match",
            Command::Remove { .. } => "rm",
            Command::Set { .. } => "set",
            Command::Sort { .. } => "sort",
            Command::Insert { .. } => "ins",
        }
    }

    /// The path arguments that are resolved against the tree
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Command::Add { path }
            | Command::Clear { path }
            | Command::Get { path, .. }
            | Command::Match { path, .. }
            | Command::Remove { path }
            | Command::Set { path, .. }
            | Command::Sort { path, .. } => vec![path.as_str()],
            Command::Insert { target, .. } => vec![target.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub source: String,
    pub command: Command,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl Statement {
    pub fn parse(source: &str) -> LensResult<Statement> {
        let line = source.trim();
        let caps = COMMAND
            .captures(line)
            .ok_or_else(|| LensError::invalid_syntax(line, "empty statement"))?;

        let keyword = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let args = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

        let command = match keyword {
            "add" => Command::Add {
                path: Self::path_argument(line, args)?,
            },
            "clear" => Command::Clear {
                path: Self::path_argument(line, args)?,
            },
            "rm" | "remove" => Command::Remove {
                path: Self::path_argument(line, args)?,
            },
            "get" => Self::parse_get(line, args)?,
            "match" => Self::parse_match(line, args)?,
            "set" => Self::parse_set(line, args)?,
            "sort" => Self::parse_sort(line, args)?,
            "ins" | "insert" => Self::parse_insert(line, args)?,
            other => return Err(LensError::UnrecognizedCommand(other.to_string())),
        };

        Ok(Statement {
            source: line.to_string(),
            command,
        })
    }

    fn path_argument(line: &str, path: &str) -> LensResult<String> {
        if Path::parse(path).is_empty() {
            return Err(LensError::invalid_syntax(line, "expected a path"));
        }
        Ok(path.to_string())
    }

    fn parse_get(line: &str, args: &str) -> LensResult<Command> {
        let caps = GET.captures(args).ok_or_else(|| {
            LensError::invalid_syntax(line, "expected <path> <operator> \"<value>\"")
        })?;

        let (path, attribute) = split_attribute(caps[1].trim());
        Ok(Command::Get {
            path: Self::path_argument(line, path)?,
            attribute: attribute.filter(|a| !a.is_empty()).map(str::to_string),
            op: caps[2].parse()?,
            value: caps[3].to_string(),
        })
    }

    fn parse_match(line: &str, args: &str) -> LensResult<Command> {
        let caps = MATCH.captures(args).ok_or_else(|| {
            LensError::invalid_syntax(line, "expected <path> size <operator> <integer>")
        })?;

        let size = caps[3]
            .parse()
            .map_err(|_| LensError::invalid_syntax(line, "size is out of range"))?;

        Ok(Command::Match {
            path: Self::path_argument(line, caps[1].trim())?,
            op: caps[2].parse()?,
            size,
        })
    }

    fn parse_set(line: &str, args: &str) -> LensResult<Command> {
        let caps = SET
            .captures(args)
            .ok_or_else(|| LensError::invalid_syntax(line, "expected <path> \"<value>\""))?;

        let (path, attribute) = split_attribute(caps[1].trim());
        Ok(Command::Set {
            path: Self::path_argument(line, path)?,
            attribute: attribute.filter(|a| !a.is_empty()).map(str::to_string),
            value: caps[2].to_string(),
        })
    }

    fn parse_sort(line: &str, args: &str) -> LensResult<Command> {
        let (path, rest) = split_path_argument(args);
        let mut words: Vec<&str> = rest.split_whitespace().collect();

        let order = match words.last() {
            Some(&"desc") => {
                words.pop();
                SortOrder::Descending
            }
            Some(&"asc") => {
                words.pop();
                SortOrder::Ascending
            }
            _ => SortOrder::Ascending,
        };

        let key = match words.as_slice() {
            [] => SortKey::Name,
            ["text"] => SortKey::Text,
            [attribute] => SortKey::Attribute(attribute.to_string()),
            _ => {
                return Err(LensError::invalid_syntax(
                    line,
                    "expected <path> [<attribute>|text] [asc|desc]",
                ));
            }
        };

        Ok(Command::Sort {
            path: Self::path_argument(line, path)?,
            key,
            order,
        })
    }

    fn parse_insert(line: &str, args: &str) -> LensResult<Command> {
        let caps = INSERT.captures(args).ok_or_else(|| {
            LensError::invalid_syntax(line, "expected <source> before|after <target>")
        })?;

        let position = if &caps[2] == "before" {
            InsertPosition::Before
        } else {
            InsertPosition::After
        };

        Ok(Command::Insert {
            source: caps[1].trim().to_string(),
            position,
            target: Self::path_argument(line, caps[3].trim())?,
        })
    }
}

/// Split at the first whitespace that is outside brackets and quotes
fn split_path_argument(args: &str) -> (&str, &str) {
    let mut depth = 0usize;
    let mut quoted = false;

    for (i, ch) in args.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '[' if !quoted => depth += 1,
            ']' if !quoted => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 && !quoted => {
                return (&args[..i], args[i..].trim());
            }
            _ => {}
        }
    }

    (args, "")
}
