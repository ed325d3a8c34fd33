//! Fluent builders for constructing lineage graphs in tests

use mesh_core::{AttributeValue, Attributes, NodeKind};
use mesh_lineage::{LineageService, Result};

/// Builds a graph on a [`LineageService`], adding nodes implicitly as edges need them
pub struct GraphBuilder {
    service: LineageService,
    default_kind: NodeKind,
}

impl GraphBuilder {
    /// Builder over a fresh in-memory service
    pub fn new() -> Self {
        Self::on(crate::fixtures::empty())
    }

    /// Builder over an existing service
    pub fn on(service: LineageService) -> Self {
        Self {
            service,
            default_kind: NodeKind::Table,
        }
    }

    /// Kind given to nodes created implicitly
    pub fn default_kind(mut self, kind: NodeKind) -> Self {
        self.default_kind = kind;
        self
    }

    /// Add a node with the default kind
    pub fn node(self, id: &str) -> Self {
        let kind = self.default_kind.clone();
        self.node_with(id, kind, &[])
    }

    /// Add a node with an explicit kind and attributes
    pub fn node_with(self, id: &str, kind: NodeKind, attrs: &[(&str, AttributeValue)]) -> Self {
        let attributes: Attributes = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.service
            .add_node(id, kind, attributes)
            .unwrap_or_else(|e| panic!("failed to add node {}: {}", id, e));
        self
    }

    /// Add an edge, creating missing endpoints with the default kind
    pub fn edge(self, source: &str, target: &str) -> Self {
        self.edge_via(source, target, None)
    }

    /// Add an edge with a transformation, creating missing endpoints
    pub fn edge_via(self, source: &str, target: &str, transformation: Option<&str>) -> Self {
        let mut builder = self;
        for id in [source, target] {
            if builder.service.get_node(id).is_err() {
                builder = builder.node(id);
            }
        }
        builder
            .service
            .add_edge(
                source,
                target,
                transformation.map(str::to_string),
                Attributes::new(),
            )
            .unwrap_or_else(|e| panic!("failed to add edge {} -> {}: {}", source, target, e));
        builder
    }

    /// Add a chain of edges through the given ids
    pub fn chain(self, ids: &[&str]) -> Self {
        ids.windows(2)
            .fold(self, |builder, pair| builder.edge(pair[0], pair[1]))
    }

    /// Try adding an edge without panicking
    pub fn try_edge(&self, source: &str, target: &str) -> Result<()> {
        self.service
            .add_edge(source, target, None, Attributes::new())
            .map(|_| ())
    }

    pub fn build(self) -> LineageService {
        self.service
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
