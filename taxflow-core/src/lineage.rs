// Lineage graph building: rows of (weight, lineage) into Sankey nodes and links

use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Separator between ranks in a lineage string
pub const LINEAGE_SEPARATOR: char = ';';

/// How a (source, target) pair seen in an earlier row is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    /// Each pair is emitted once for the whole run. Used for pre-aggregated
    /// `tax metagenome` summaries, where shared prefixes would double count.
    Global,
    /// Every row emits all of its pairs. Used for per-match `tax annotate`
    /// rows, where repeated pairs are distinct contributions.
    None,
}

/// One input record: a relative abundance (0-1) and its lineage string
#[derive(Debug, Clone, PartialEq)]
pub struct LineageRow {
    pub fraction: f64,
    pub lineage: String,
}

impl LineageRow {
    pub fn new(fraction: f64, lineage: impl Into<String>) -> Self {
        Self {
            fraction,
            lineage: lineage.into(),
        }
    }

    /// Weight as a percentage, as displayed on the diagram
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

/// Ordered, deduplicated set of taxon labels.
///
/// The index a label is first inserted at is its node id for the rest of the
/// build.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `label`, registering it with the next id if unseen
    pub fn get_or_insert(&mut self, label: &str) -> usize {
        if let Some(&id) = self.index.get(label) {
            return id;
        }
        let id = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), id);
        id
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn into_labels(self) -> Vec<String> {
        self.labels
    }
}

/// Weighted flow between two registered nodes
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Node labels, links and one hover text per link
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SankeyGraph {
    pub nodes: Vec<String>,
    pub links: Vec<SankeyLink>,
    pub hover_texts: Vec<String>,
}

impl SankeyGraph {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn label(&self, id: usize) -> Option<&str> {
        self.nodes.get(id).map(String::as_str)
    }

    /// Sum of link values entering and leaving each node
    pub fn node_flows(&self) -> Vec<(f64, f64)> {
        let mut flows = vec![(0.0, 0.0); self.nodes.len()];
        for link in &self.links {
            if let Some(flow) = flows.get_mut(link.target) {
                flow.0 += link.value;
            }
            if let Some(flow) = flows.get_mut(link.source) {
                flow.1 += link.value;
            }
        }
        flows
    }
}

/// Split a lineage string into trimmed taxon labels, coarse to fine
pub fn split_lineage(lineage: &str) -> Vec<&str> {
    lineage.split(LINEAGE_SEPARATOR).map(str::trim).collect()
}

pub fn format_hover_text(source: &str, target: &str, percent: f64) -> String {
    format!("{} → {}<br>{:.2}%", source, target, percent)
}

/// Builds a [`SankeyGraph`] one row at a time.
///
/// All state lives in the builder and is dropped with it, so two builds never
/// share registered nodes or emitted pairs.
pub struct LineageGraphBuilder {
    policy: DedupPolicy,
    registry: NodeRegistry,
    links: Vec<SankeyLink>,
    hover_texts: Vec<String>,
    emitted: HashSet<(String, String)>,
}

impl LineageGraphBuilder {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            registry: NodeRegistry::new(),
            links: Vec::new(),
            hover_texts: Vec::new(),
            emitted: HashSet::new(),
        }
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    pub fn add_row(&mut self, row: &LineageRow) {
        let percent = row.percent();
        let labels = split_lineage(&row.lineage);

        for pair in labels.windows(2) {
            let (source, target) = (pair[0], pair[1]);

            if self.policy == DedupPolicy::Global {
                let key = (source.to_string(), target.to_string());
                if self.emitted.contains(&key) {
                    debug!("Skipping already emitted pair {} -> {}", source, target);
                    continue;
                }
                self.emitted.insert(key);
            }

            let source_id = self.registry.get_or_insert(source);
            let target_id = self.registry.get_or_insert(target);

            self.links.push(SankeyLink {
                source: source_id,
                target: target_id,
                value: percent,
            });
            self.hover_texts
                .push(format_hover_text(source, target, percent));
        }
    }

    pub fn add_rows<'a>(&mut self, rows: impl IntoIterator<Item = &'a LineageRow>) {
        for row in rows {
            self.add_row(row);
        }
    }

    pub fn finish(self) -> SankeyGraph {
        debug!(
            "Built graph with {} nodes and {} links",
            self.registry.len(),
            self.links.len()
        );
        SankeyGraph {
            nodes: self.registry.into_labels(),
            links: self.links,
            hover_texts: self.hover_texts,
        }
    }
}

/// Build the graph for `rows` in a single pass under `policy`
pub fn build_graph(rows: &[LineageRow], policy: DedupPolicy) -> SankeyGraph {
    let mut builder = LineageGraphBuilder::new(policy);
    builder.add_rows(rows);
    builder.finish()
}
