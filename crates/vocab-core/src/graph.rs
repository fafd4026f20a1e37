//! Link graph between databases
//!
//! A directed, possibly cyclic adjacency map. Each entry lists the links
//! leaving one database in insertion order; duplicate links are allowed.
//! The graph itself knows nothing about which databases exist, so
//! [`crate::DatabasesView`] checks endpoints before calling in here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One outgoing edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Name of the target database
    pub target: String,
    /// Direction flag
    #[serde(default)]
    pub reverse: bool,
}

impl Link {
    pub fn new(target: impl Into<String>, reverse: bool) -> Self {
        Self {
            target: target.into(),
            reverse,
        }
    }
}

/// Database name → outgoing links
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkGraph {
    edges: BTreeMap<String, Vec<Link>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outgoing links of `name` (empty if it has none)
    pub fn links(&self, name: &str) -> &[Link] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over every adjacency list
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Link>)> {
        self.edges.iter()
    }

    /// Every database name mentioned by the graph, as source or target
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().flat_map(|(source, links)| {
            std::iter::once(source.as_str()).chain(links.iter().map(|l| l.target.as_str()))
        })
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Check whether any edge points at `name`
    pub fn is_referenced(&self, name: &str) -> bool {
        self.edges
            .values()
            .any(|links| links.iter().any(|l| l.target == name))
    }

    /// Append an edge, keeping existing ones
    pub(crate) fn push(&mut self, from: &str, to: &str, reverse: bool) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .push(Link::new(to, reverse));
    }

    /// Remove the first edge `from → to`; returns false if there was none
    ///
    /// A source left without edges loses its entry.
    pub(crate) fn remove_first(&mut self, from: &str, to: &str) -> bool {
        let Some(links) = self.edges.get_mut(from) else {
            return false;
        };
        let Some(pos) = links.iter().position(|l| l.target == to) else {
            return false;
        };

        links.remove(pos);
        if links.is_empty() {
            self.edges.remove(from);
        }
        true
    }

    /// Drop `name`'s own entry and every edge that targets it
    ///
    /// Each pass removes at most one edge per list, the way `unlink` does;
    /// passes repeat until nothing points at `name`. Returns the number of
    /// incoming edges removed.
    pub(crate) fn prune(&mut self, name: &str) -> usize {
        self.edges.remove(name);

        let sources: Vec<String> = self.edges.keys().cloned().collect();
        let mut removed = 0;
        loop {
            let mut pass = 0;
            for source in &sources {
                if self.remove_first(source, name) {
                    pass += 1;
                }
            }
            if pass == 0 {
                break;
            }
            removed += pass;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_duplicates_in_order() {
        let mut graph = LinkGraph::new();
        graph.push("a", "b", false);
        graph.push("a", "c", true);
        graph.push("a", "b", false);

        let targets: Vec<_> = graph.links("a").iter().map(|l| l.target.as_str()).collect();
        assert_eq!(targets, vec!["b", "c", "b"]);
        assert!(graph.links("a")[1].reverse);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_remove_first_only() {
        let mut graph = LinkGraph::new();
        graph.push("a", "b", false);
        graph.push("a", "c", false);
        graph.push("a", "b", true);

        assert!(graph.remove_first("a", "b"));
        assert_eq!(graph.links("a"), &[Link::new("c", false), Link::new("b", true)]);

        assert!(!graph.remove_first("a", "z"));
        assert!(!graph.remove_first("missing", "b"));
    }

    #[test]
    fn test_remove_last_edge_drops_entry() {
        let mut graph = LinkGraph::new();
        graph.push("a", "b", false);
        graph.push("c", "a", false);

        assert!(graph.remove_first("a", "b"));
        assert_eq!(graph.names().collect::<Vec<_>>(), vec!["c", "a"]);
        assert_eq!(graph.iter().count(), 1);

        #[derive(Serialize)]
        struct Wrapper {
            links: LinkGraph,
        }
        let text = toml::to_string(&Wrapper { links: graph }).unwrap();
        assert!(!text.contains("a = []"));
        assert!(text.contains("[[links.c]]"));
    }

    #[test]
    fn test_prune_removes_entry_and_incoming_edges() {
        let mut graph = LinkGraph::new();
        graph.push("a", "x", false);
        graph.push("a", "b", false);
        graph.push("a", "x", true);
        graph.push("b", "x", false);
        graph.push("x", "a", false);

        let removed = graph.prune("x");

        assert_eq!(removed, 3);
        assert!(!graph.is_referenced("x"));
        assert!(graph.links("x").is_empty());
        assert_eq!(graph.links("a"), &[Link::new("b", false)]);
        assert!(graph.links("b").is_empty());
        assert_eq!(graph.iter().count(), 1);
    }

    #[test]
    fn test_names_include_sources_and_targets() {
        let mut graph = LinkGraph::new();
        graph.push("a", "b", false);

        let names: Vec<_> = graph.names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_toml_shape() {
        let mut graph = LinkGraph::new();
        graph.push("spanish", "french", true);

        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            links: LinkGraph,
        }

        let text = toml::to_string(&Wrapper { links: graph.clone() }).unwrap();
        let parsed: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(parsed.links, graph);

        let parsed: Wrapper = toml::from_str(
            r#"
            [[links.spanish]]
            target = "german"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.links.links("spanish"), &[Link::new("german", false)]);
    }
}
