//! Segment tree used for path matching.
//!
//! # Responsibilities
//! - Build the tree by sequential insertion of `/`-separated patterns
//! - Match request paths by recursive descent, capturing `:name` segments
//! - Percent-decode request segments before comparing or binding them
//! - Stop at `*` catch-all nodes, which swallow the rest of the path
//!
//! # Design Decisions
//! - Nodes live in a flat arena and refer to children by index; there are
//!   no parent links, insertion walks down from the root each time
//! - At each level parameter children are tried before literal children,
//!   and the catch-all only when both fail. The first branch that reaches a
//!   value wins, so a failing parameter branch backtracks into literals
//! - Matching never mutates the tree; once built it can be shared freely
//! - No prefix compression: route counts are small and O(path × fan-out)
//!   is fine

use std::borrow::Cow;
use std::fmt;

use percent_encoding::percent_decode_str;

use super::params::Params;

const ROOT: usize = 0;
const CATCH_ALL: &str = "*";
const PARAM_PREFIX: char = ':';

struct Node<T> {
    label: String,
    value: Option<T>,
    children: Vec<usize>,
}

impl<T> Node<T> {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
            children: Vec::new(),
        }
    }

    fn param_name(&self) -> Option<&str> {
        self.label.strip_prefix(PARAM_PREFIX)
    }

    fn is_catch_all(&self) -> bool {
        self.label == CATCH_ALL
    }

    fn is_literal(&self) -> bool {
        self.param_name().is_none() && !self.is_catch_all()
    }
}

/// Tree of path segments mapping patterns to values.
pub struct PathTree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> PathTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("/")],
        }
    }

    /// Bind `value` to `pattern`, overwriting any previous value.
    pub fn insert(&mut self, pattern: &str, value: T) {
        *self.slot_mut(pattern) = Some(value);
    }

    /// Value slot for `pattern`, creating the missing node chain.
    ///
    /// The pattern is normalized like a request path (see [`clean`]), so
    /// `/a/../b` registers `/b`. The walk follows exact label equality only,
    /// so `:id` and `:name` become separate siblings. Segments after a `*`
    /// are dropped: the catch-all node is the end of the chain.
    pub fn slot_mut(&mut self, pattern: &str) -> &mut Option<T> {
        let mut current = ROOT;
        for segment in resolve(pattern.split('/').map(Cow::Borrowed)) {
            if self.nodes[current].is_catch_all() {
                break;
            }
            current = match self.child_labelled(current, &segment) {
                Some(child) => child,
                None => self.push_child(current, &segment),
            };
        }
        &mut self.nodes[current].value
    }

    /// Match `path` and return its value with the captured parameters.
    pub fn at(&self, path: &str) -> Option<(&T, Params)> {
        self.find(path, Some)
    }

    /// Match `path`, accepting a node only when `select` returns `Some`.
    ///
    /// Each segment is percent-decoded before it is compared or bound, so
    /// `/hello/joe%20smith` binds `joe smith`. A node whose value is
    /// rejected counts as "no value", so the descent keeps backtracking
    /// into other branches.
    pub fn find<'t, R, S>(&'t self, path: &str, select: S) -> Option<(R, Params)>
    where
        S: Fn(&'t T) -> Option<R>,
    {
        let segments = resolve(path.split('/').map(decode));
        if segments.is_empty() {
            let found = self.nodes[ROOT].value.as_ref().and_then(&select)?;
            return Some((found, Params::new()));
        }

        let mut bindings = Vec::new();
        let found = self.descend(ROOT, &segments, &mut bindings, &select)?;
        Some((found, bindings.into_iter().collect()))
    }

    /// Number of nodes holding a value.
    pub fn len(&self) -> usize {
        self.values().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter().filter_map(|n| n.value.as_ref())
    }

    fn child_labelled(&self, node: usize, label: &str) -> Option<usize> {
        self.nodes[node]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].label == label)
    }

    fn push_child(&mut self, parent: usize, label: &str) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node::new(label));
        self.nodes[parent].children.push(index);
        index
    }

    fn descend<'t, 'p, R, S>(
        &'t self,
        node: usize,
        segments: &'p [Cow<'p, str>],
        bindings: &mut Vec<(&'t str, &'p str)>,
        select: &S,
    ) -> Option<R>
    where
        S: Fn(&'t T) -> Option<R>,
    {
        let (segment, remainder) = segments.split_first()?;
        let segment: &'p str = segment;
        let children = &self.nodes[node].children;

        for &child in children {
            if let Some(name) = self.nodes[child].param_name() {
                let mark = bindings.len();
                bindings.push((name, segment));
                if let Some(found) = self.enter(child, remainder, bindings, select) {
                    return Some(found);
                }
                bindings.truncate(mark);
            }
        }

        for &child in children {
            let candidate = &self.nodes[child];
            if candidate.is_literal() && candidate.label == segment {
                if let Some(found) = self.enter(child, remainder, bindings, select) {
                    return Some(found);
                }
            }
        }

        children
            .iter()
            .map(|&c| &self.nodes[c])
            .find(|n| n.is_catch_all())
            .and_then(|n| n.value.as_ref())
            .and_then(select)
    }

    fn enter<'t, 'p, R, S>(
        &'t self,
        node: usize,
        remainder: &'p [Cow<'p, str>],
        bindings: &mut Vec<(&'t str, &'p str)>,
        select: &S,
    ) -> Option<R>
    where
        S: Fn(&'t T) -> Option<R>,
    {
        if remainder.is_empty() {
            self.nodes[node].value.as_ref().and_then(select)
        } else {
            self.descend(node, remainder, bindings, select)
        }
    }
}

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PathTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathTree")
            .field("nodes", &self.nodes.len())
            .field("routes", &self.len())
            .finish()
    }
}

/// Lexically clean a request path.
///
/// Repeated slashes collapse, `.` segments drop, `..` removes the previous
/// segment (never above the root) and trailing slashes go away. The result
/// always starts with `/`. No percent-decoding happens here.
pub fn clean(path: &str) -> String {
    let segments = resolve(path.split('/').map(Cow::Borrowed));
    if segments.is_empty() {
        return "/".to_string();
    }

    let mut out = String::with_capacity(path.len() + 1);
    for segment in segments {
        out.push('/');
        out.push_str(&segment);
    }
    out
}

/// Drop empty and `.` segments and apply `..`.
fn resolve<'a>(segments: impl Iterator<Item = Cow<'a, str>>) -> Vec<Cow<'a, str>> {
    let mut out = Vec::new();
    for segment in segments {
        match segment.as_ref() {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            _ => out.push(segment),
        }
    }
    out
}

fn decode(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}
