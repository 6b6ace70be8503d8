// Column-based Sankey layout used by the static renderers

use crate::figure::SankeyStyle;
use crate::lineage::SankeyGraph;

/// Plot margins around the node area (left, right, top, bottom)
pub const MARGINS: (f64, f64, f64, f64) = (80.0, 80.0, 100.0, 80.0);

/// Smallest drawn node height so zero-weight taxa stay visible
const MIN_NODE_HEIGHT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub column: usize,
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl NodeBox {
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }
}

/// A link band: from the right edge of its source to the left edge of its
/// target, `y` values at the band's centre line
#[derive(Debug, Clone, PartialEq)]
pub struct LinkBand {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SankeyLayout {
    pub nodes: Vec<NodeBox>,
    pub links: Vec<LinkBand>,
    pub columns: usize,
}

/// Longest-path depth of every node from the graph's sources.
///
/// Relaxation runs at most `node_count` rounds and depths are capped below
/// `node_count`, so label cycles (e.g. a taxon repeated at two ranks) still
/// terminate.
pub fn node_depths(graph: &SankeyGraph) -> Vec<usize> {
    let count = graph.nodes.len();
    let mut depths = vec![0usize; count];

    for _ in 0..count {
        let mut changed = false;
        for link in &graph.links {
            if link.source == link.target {
                continue;
            }
            let (Some(&source_depth), Some(&target_depth)) =
                (depths.get(link.source), depths.get(link.target))
            else {
                continue;
            };
            let candidate = source_depth + 1;
            if candidate > target_depth && candidate < count {
                depths[link.target] = candidate;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    depths
}

pub fn compute_layout(graph: &SankeyGraph, style: &SankeyStyle) -> SankeyLayout {
    if graph.nodes.is_empty() {
        return SankeyLayout::default();
    }

    let (left, right, top, bottom) = MARGINS;
    let plot_width = (f64::from(style.width) - left - right).max(style.node_thickness);
    let plot_height = (f64::from(style.height) - top - bottom).max(1.0);

    let depths = node_depths(graph);
    let columns = depths.iter().copied().max().unwrap_or(0) + 1;
    let values: Vec<f64> = graph
        .node_flows()
        .into_iter()
        .map(|(incoming, outgoing)| incoming.max(outgoing))
        .collect();

    let mut column_members: Vec<Vec<usize>> = vec![Vec::new(); columns];
    for (node, &depth) in depths.iter().enumerate() {
        column_members[depth].push(node);
    }

    let widest = column_members.iter().map(Vec::len).max().unwrap_or(1);
    let pad = style
        .node_pad
        .min(plot_height / (2.0 * widest as f64));

    // One scale for every column so band widths compare across ranks
    let scale = column_members
        .iter()
        .filter_map(|members| {
            let total: f64 = members.iter().map(|&n| values[n]).sum();
            if total > 0.0 {
                let room = plot_height - pad * (members.len() as f64 - 1.0);
                Some(room.max(0.0) / total)
            } else {
                None
            }
        })
        .fold(f64::INFINITY, f64::min);
    let scale = if scale.is_finite() { scale } else { 0.0 };

    let column_step = if columns > 1 {
        (plot_width - style.node_thickness) / (columns - 1) as f64
    } else {
        0.0
    };

    let mut nodes: Vec<Option<NodeBox>> = vec![None; graph.nodes.len()];
    for (column, members) in column_members.iter().enumerate() {
        let heights: Vec<f64> = members
            .iter()
            .map(|&n| (values[n] * scale).max(MIN_NODE_HEIGHT))
            .collect();
        let used: f64 =
            heights.iter().sum::<f64>() + pad * (members.len().saturating_sub(1)) as f64;
        let x0 = left + column as f64 * column_step;
        let mut y = top + ((plot_height - used) / 2.0).max(0.0);

        for (&node, &height) in members.iter().zip(&heights) {
            nodes[node] = Some(NodeBox {
                column,
                value: values[node],
                x0,
                x1: x0 + style.node_thickness,
                y0: y,
                y1: y + height,
            });
            y += height + pad;
        }
    }
    let nodes: Vec<NodeBox> = nodes.into_iter().flatten().collect();

    let mut out_offsets = vec![0.0; nodes.len()];
    let mut in_offsets = vec![0.0; nodes.len()];
    let links = graph
        .links
        .iter()
        .filter_map(|link| {
            let source = nodes.get(link.source)?;
            let target = nodes.get(link.target)?;
            let width = link.value * scale;

            let y0 = source.y0 + out_offsets[link.source] + width / 2.0;
            let y1 = target.y0 + in_offsets[link.target] + width / 2.0;
            out_offsets[link.source] += width;
            in_offsets[link.target] += width;

            Some(LinkBand {
                x0: source.x1,
                y0,
                x1: target.x0,
                y1,
                width,
            })
        })
        .collect();

    SankeyLayout {
        nodes,
        links,
        columns,
    }
}
