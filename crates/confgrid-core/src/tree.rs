// ── Statement tree ──
//
// Indentation-driven hierarchy of configuration statements. Every line of a
// `show running-config` dump becomes one node; a node nests under the nearest
// preceding node with a smaller indentation. Nodes live in a flat arena in
// document order, so "all statements matching X" is a linear scan and
// parent/child links are plain indices.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::platform::Dialect;

static BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^banner\s+\S+\s+(\S.*)$").expect("invalid banner pattern"));

/// Structural problems found while building a tree.
///
/// Only the NX-OS grammar is strict enough to produce these. The IOS grammar
/// tolerates them, because IOS dumps pasted from terminals are often ragged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("line {line}: indented statement '{text}' has no parent block")]
    Orphan { line: usize, text: String },

    #[error("line {line}: banner delimiter '{delimiter}' is never closed")]
    UnterminatedBanner { line: usize, delimiter: String },
}

#[derive(Debug, Clone)]
struct Node {
    text: String,
    indent: usize,
    line_number: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// A parsed configuration: statements plus their parent/child relations.
#[derive(Debug, Clone)]
pub struct StatementTree {
    dialect: Dialect,
    nodes: Vec<Node>,
    roots: Vec<usize>,
}

impl StatementTree {
    /// Parse raw configuration text under the given dialect's grammar.
    pub fn parse(text: &str, dialect: Dialect) -> Result<Self, TreeError> {
        let mut tree = Self {
            dialect,
            nodes: Vec::new(),
            roots: Vec::new(),
        };
        let mut open: Vec<usize> = Vec::new();
        let mut lines = text.lines().enumerate();

        while let Some((idx, raw)) = lines.next() {
            let line = raw.trim_end();
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('!') {
                continue;
            }
            let line_number = idx + 1;
            let indent = line.len() - trimmed.len();

            if let Some(delimiter) = open_banner_delimiter(trimmed) {
                let closed = lines.by_ref().any(|(_, body)| body.contains(delimiter.as_str()));
                if !closed && dialect == Dialect::Nxos {
                    return Err(TreeError::UnterminatedBanner {
                        line: line_number,
                        delimiter,
                    });
                }
            }

            while open
                .last()
                .is_some_and(|&top| tree.nodes[top].indent >= indent)
            {
                open.pop();
            }
            let parent = open.last().copied();

            if indent > 0 && parent.is_none() && dialect == Dialect::Nxos {
                return Err(TreeError::Orphan {
                    line: line_number,
                    text: trimmed.to_owned(),
                });
            }

            let id = tree.nodes.len();
            tree.nodes.push(Node {
                text: trimmed.to_owned(),
                indent,
                line_number,
                parent,
                children: Vec::new(),
            });
            match parent {
                Some(p) => tree.nodes[p].children.push(id),
                None => tree.roots.push(id),
            }
            open.push(id);
        }

        Ok(tree)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Number of statements at any depth.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level statements in document order.
    pub fn roots(&self) -> impl Iterator<Item = Statement<'_>> {
        self.roots.iter().map(move |&id| Statement { tree: self, id })
    }

    /// Top-level statements whose text matches `pattern`.
    pub fn find_roots<'a>(&'a self, pattern: &'a Regex) -> impl Iterator<Item = Statement<'a>> {
        self.roots().filter(move |s| s.matches(pattern))
    }

    /// Statements at any depth whose text matches `pattern`, in document order.
    pub fn find_all<'a>(&'a self, pattern: &'a Regex) -> impl Iterator<Item = Statement<'a>> {
        (0..self.nodes.len())
            .map(move |id| Statement { tree: self, id })
            .filter(move |s| s.matches(pattern))
    }

    /// Top-level statements matching `parent` that own a child matching `child`.
    pub fn find_with_child<'a>(
        &'a self,
        parent: &'a Regex,
        child: &'a Regex,
    ) -> impl Iterator<Item = Statement<'a>> {
        self.find_roots(parent).filter(move |s| s.has_child(child))
    }

    /// Children matching `child` of top-level statements matching `parent`.
    pub fn find_children_of<'a>(
        &'a self,
        parent: &'a Regex,
        child: &'a Regex,
    ) -> impl Iterator<Item = Statement<'a>> {
        self.find_roots(parent)
            .flat_map(move |s| s.children_matching(child))
    }
}

/// Borrowed handle to one statement of a [`StatementTree`].
#[derive(Debug, Clone, Copy)]
pub struct Statement<'a> {
    tree: &'a StatementTree,
    id: usize,
}

impl<'a> Statement<'a> {
    fn node(self) -> &'a Node {
        &self.tree.nodes[self.id]
    }

    /// Statement text with surrounding whitespace removed.
    pub fn text(self) -> &'a str {
        &self.node().text
    }

    /// 1-based line number in the source text.
    pub fn line_number(self) -> usize {
        self.node().line_number
    }

    pub fn is_root(self) -> bool {
        self.node().parent.is_none()
    }

    pub fn matches(self, pattern: &Regex) -> bool {
        pattern.is_match(self.text())
    }

    pub fn parent(self) -> Option<Statement<'a>> {
        let tree = self.tree;
        self.node().parent.map(|id| Statement { tree, id })
    }

    pub fn children(self) -> impl Iterator<Item = Statement<'a>> {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |&id| Statement { tree, id })
    }

    /// Parent, grandparent, ... up to the top-level statement.
    pub fn ancestors(self) -> impl Iterator<Item = Statement<'a>> {
        std::iter::successors(self.parent(), |s| s.parent())
    }

    /// All nested statements, depth first, in document order.
    pub fn descendants(self) -> impl Iterator<Item = Statement<'a>> {
        let mut stack: Vec<Statement<'a>> = self.children().collect();
        stack.reverse();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            let mut nested: Vec<Statement<'a>> = next.children().collect();
            nested.reverse();
            stack.extend(nested);
            Some(next)
        })
    }

    pub fn children_matching<'p>(self, pattern: &'p Regex) -> impl Iterator<Item = Statement<'a>> {
        self.children().filter(move |c| c.matches(pattern))
    }

    /// First direct child matching `pattern`.
    pub fn child_matching(self, pattern: &Regex) -> Option<Statement<'a>> {
        self.children().find(|c| c.matches(pattern))
    }

    pub fn has_child(self, pattern: &Regex) -> bool {
        self.child_matching(pattern).is_some()
    }
}

/// Delimiter of a multi-line banner opened on this line, if any.
///
/// IOS renders the delimiter as the two characters `^C`; NX-OS keeps the
/// operator's chosen character. A banner closed on its own line yields `None`.
fn open_banner_delimiter(line: &str) -> Option<String> {
    let rest = BANNER.captures(line)?.get(1)?.as_str();
    let delimiter = if rest.starts_with("^C") {
        "^C".to_owned()
    } else {
        rest.chars().next()?.to_string()
    };
    let body = &rest[delimiter.len()..];
    if body.contains(delimiter.as_str()) {
        None
    } else {
        Some(delimiter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
!
hostname core-1
!
interface GigabitEthernet1/0/1
 description uplink
 switchport mode trunk
!
router bgp 65000
 neighbor 192.168.1.1
  remote-as 65001
";

    fn re(p: &str) -> Regex {
        Regex::new(p).unwrap()
    }

    #[test]
    fn builds_hierarchy_from_indentation() {
        let tree = StatementTree::parse(SAMPLE, Dialect::Ios).unwrap();
        let roots: Vec<&str> = tree.roots().map(|s| s.text()).collect();
        assert_eq!(
            roots,
            ["hostname core-1", "interface GigabitEthernet1/0/1", "router bgp 65000"]
        );
        assert_eq!(tree.len(), 7);

        let iface_re = re("^interface");
        let iface = tree.find_roots(&iface_re).next().unwrap();
        let children: Vec<&str> = iface.children().map(|s| s.text()).collect();
        assert_eq!(children, ["description uplink", "switchport mode trunk"]);
        assert_eq!(iface.line_number(), 4);
    }

    #[test]
    fn ancestors_and_descendants() {
        let tree = StatementTree::parse(SAMPLE, Dialect::Ios).unwrap();
        let remote_as_re = re("^remote-as");
        let remote_as = tree.find_all(&remote_as_re).next().unwrap();
        let ancestors: Vec<&str> = remote_as.ancestors().map(|s| s.text()).collect();
        assert_eq!(ancestors, ["neighbor 192.168.1.1", "router bgp 65000"]);
        assert!(!remote_as.is_root());

        let bgp_re = re("^router bgp");
        let bgp = tree.find_roots(&bgp_re).next().unwrap();
        let nested: Vec<&str> = bgp.descendants().map(|s| s.text()).collect();
        assert_eq!(nested, ["neighbor 192.168.1.1", "remote-as 65001"]);
    }

    #[test]
    fn parent_child_queries() {
        let tree = StatementTree::parse(SAMPLE, Dialect::Ios).unwrap();
        let iface_re = re("^interface");
        let desc_re = re("^description");
        let with_desc: Vec<&str> = tree
            .find_with_child(&iface_re, &desc_re)
            .map(|s| s.text())
            .collect();
        assert_eq!(with_desc, ["interface GigabitEthernet1/0/1"]);

        let mode_re = re("^switchport mode");
        let modes: Vec<&str> = tree
            .find_children_of(&iface_re, &mode_re)
            .map(|s| s.text())
            .collect();
        assert_eq!(modes, ["switchport mode trunk"]);
    }

    #[test]
    fn banner_body_is_swallowed() {
        let text = "\
banner motd ^C
hostname fake-from-banner
 Authorized access only
^C
hostname real
";
        let tree = StatementTree::parse(text, Dialect::Ios).unwrap();
        let hostname_re = re("^hostname");
        let hostnames: Vec<&str> = tree.find_roots(&hostname_re).map(|s| s.text()).collect();
        assert_eq!(hostnames, ["hostname real"]);
    }

    #[test]
    fn single_line_banner_keeps_following_lines() {
        let text = "banner motd #Keep out#\nhostname edge\n";
        let tree = StatementTree::parse(text, Dialect::Nxos).unwrap();
        assert_eq!(tree.roots().count(), 2);
    }

    #[test]
    fn orphan_line_is_tolerated_by_ios() {
        let text = "  stray indented line\nhostname sw\n";
        let tree = StatementTree::parse(text, Dialect::Ios).unwrap();
        assert_eq!(tree.roots().count(), 2);
    }

    #[test]
    fn orphan_line_fails_nxos() {
        let text = "  stray indented line\nhostname sw\n";
        let err = StatementTree::parse(text, Dialect::Nxos).unwrap_err();
        assert_eq!(
            err,
            TreeError::Orphan {
                line: 1,
                text: "stray indented line".into()
            }
        );
    }

    #[test]
    fn unterminated_banner_fails_nxos_only() {
        let text = "banner motd #\nwelcome\n";
        assert!(matches!(
            StatementTree::parse(text, Dialect::Nxos),
            Err(TreeError::UnterminatedBanner { line: 1, .. })
        ));
        assert!(StatementTree::parse(text, Dialect::Ios).is_ok());
    }

    #[test]
    fn handles_crlf_and_empty_input() {
        let tree = StatementTree::parse("hostname a\r\n vlan 1\r\n", Dialect::Ios).unwrap();
        assert_eq!(tree.roots().next().unwrap().children().count(), 1);
        assert!(StatementTree::parse("", Dialect::Ios).unwrap().is_empty());
    }
}
