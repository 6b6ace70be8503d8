// Figure description shared by every renderer

use crate::lineage::SankeyGraph;
use serde_json::{Value, json};

/// Hover template that shows only the link's custom text
pub const HOVER_TEMPLATE: &str = "%{customdata}<extra></extra>";

/// Fixed dimensions and typography of the diagram
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyStyle {
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub node_pad: f64,
    pub node_thickness: f64,
}

impl Default for SankeyStyle {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 900,
            font_size: 10,
            node_pad: 15.0,
            node_thickness: 20.0,
        }
    }
}

impl SankeyStyle {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_node_pad(mut self, pad: f64) -> Self {
        self.node_pad = pad;
        self
    }

    pub fn with_node_thickness(mut self, thickness: f64) -> Self {
        self.node_thickness = thickness;
        self
    }
}

/// A titled graph ready to render
#[derive(Debug, Clone)]
pub struct SankeyFigure {
    pub graph: SankeyGraph,
    pub title: String,
    pub style: SankeyStyle,
}

impl SankeyFigure {
    pub fn new(graph: SankeyGraph, title: impl Into<String>) -> Self {
        Self {
            graph,
            title: title.into(),
            style: SankeyStyle::default(),
        }
    }

    pub fn with_style(mut self, style: SankeyStyle) -> Self {
        self.style = style;
        self
    }

    /// Plotly figure object (`data` and `layout`) for this diagram
    pub fn to_plotly_json(&self) -> Value {
        let links = &self.graph.links;
        json!({
            "data": [{
                "type": "sankey",
                "node": {
                    "pad": self.style.node_pad,
                    "thickness": self.style.node_thickness,
                    "label": self.graph.nodes,
                },
                "link": {
                    "source": links.iter().map(|l| l.source).collect::<Vec<_>>(),
                    "target": links.iter().map(|l| l.target).collect::<Vec<_>>(),
                    "value": links.iter().map(|l| l.value).collect::<Vec<_>>(),
                    "customdata": self.graph.hover_texts,
                    "hovertemplate": HOVER_TEMPLATE,
                },
            }],
            "layout": {
                "title": { "text": self.title },
                "font": { "size": self.style.font_size },
                "autosize": false,
                "width": self.style.width,
                "height": self.style.height,
            }
        })
    }
}
