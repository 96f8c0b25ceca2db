// crates/dds-harness/src/cmdline.rs
// ============================================================================
// Module: Command Line Trees
// Description: Nested argument trees and their flattening into argv tokens.
// Purpose: Let call sites include flags conditionally without branching.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`CommandLine`] is a tree of [`Arg`] nodes. Leaves are tokens or paths;
//! groups nest further arguments. [`CommandLine::flatten`] walks the tree
//! depth-first, left to right, and yields one `OsString` per leaf.
//!
//! Conditional flags are written as `Option<_>` at the call site. `Some(x)`
//! becomes a one-element group and `None` an empty group, which contributes
//! nothing:
//!
//! ```
//! use dds_harness::CommandLine;
//!
//! let tests = false;
//! let cmd = CommandLine::new()
//!     .arg("build")
//!     .arg((!tests).then_some("--no-tests"))
//!     .arg(None::<&str>);
//! assert_eq!(cmd.flatten(), vec!["build", "--no-tests"]);
//! ```
//!
//! Invariants:
//! - Flattening preserves leaf order.
//! - Empty groups yield zero tokens and never reorder siblings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsStr;
use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

// ============================================================================
// SECTION: Argument Nodes
// ============================================================================

/// A node in a command-line tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A literal token.
    Token(OsString),
    /// A path, emitted in its platform representation.
    Path(PathBuf),
    /// Nested arguments; an empty group is a no-op.
    Group(Vec<Arg>),
}

impl Arg {
    /// Builds a `--name=value` token, keeping non-UTF-8 values intact.
    #[must_use]
    pub fn flag_value(name: &str, value: impl AsRef<OsStr>) -> Self {
        let value = value.as_ref();
        let mut token = OsString::with_capacity(name.len() + 1 + value.len());
        token.push(name);
        token.push("=");
        token.push(value);
        Self::Token(token)
    }

    /// Appends the leaves of this node to `out` in depth-first order.
    fn flatten_into(&self, out: &mut Vec<OsString>) {
        match self {
            Self::Token(token) => out.push(token.clone()),
            Self::Path(path) => out.push(path.as_os_str().to_os_string()),
            Self::Group(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Token(value.into())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Token(value.into())
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Self::Token(value.into())
    }
}

impl From<OsString> for Arg {
    fn from(value: OsString) -> Self {
        Self::Token(value)
    }
}

impl From<&Path> for Arg {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<PathBuf> for Arg {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&PathBuf> for Arg {
    fn from(value: &PathBuf) -> Self {
        Self::Path(value.clone())
    }
}

impl From<Vec<Self>> for Arg {
    fn from(value: Vec<Self>) -> Self {
        Self::Group(value)
    }
}

impl From<CommandLine> for Arg {
    fn from(value: CommandLine) -> Self {
        Self::Group(value.args)
    }
}

impl<T: Into<Self>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        Self::Group(value.map(Into::into).into_iter().collect())
    }
}

// ============================================================================
// SECTION: Command Line
// ============================================================================

/// An ordered tree of arguments passed to the tool after its executable path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    /// Top-level argument nodes.
    args: Vec<Arg>,
}

impl CommandLine {
    /// Creates an empty command line.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            args: Vec::new(),
        }
    }

    /// Appends one node.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends every item as its own node.
    #[must_use]
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a node in place.
    pub fn push(&mut self, arg: impl Into<Arg>) {
        self.args.push(arg.into());
    }

    /// Returns the top-level nodes.
    #[must_use]
    pub fn nodes(&self) -> &[Arg] {
        &self.args
    }

    /// Flattens the tree into argv tokens.
    #[must_use]
    pub fn flatten(&self) -> Vec<OsString> {
        let mut out = Vec::new();
        for arg in &self.args {
            arg.flatten_into(&mut out);
        }
        out
    }
}

impl<A: Into<Arg>> FromIterator<A> for CommandLine {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::new().args(iter)
    }
}

impl From<Vec<Arg>> for CommandLine {
    fn from(args: Vec<Arg>) -> Self {
        Self {
            args,
        }
    }
}

impl From<Vec<&str>> for CommandLine {
    fn from(args: Vec<&str>) -> Self {
        args.into_iter().collect()
    }
}

impl From<Vec<String>> for CommandLine {
    fn from(args: Vec<String>) -> Self {
        args.into_iter().collect()
    }
}

impl<const N: usize> From<[&str; N]> for CommandLine {
    fn from(args: [&str; N]) -> Self {
        args.into_iter().collect()
    }
}

/// Flattens any argument tree into argv tokens.
#[must_use]
pub fn flatten_cmd(cmd: impl Into<CommandLine>) -> Vec<OsString> {
    cmd.into().flatten()
}
