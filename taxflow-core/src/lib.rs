pub mod error;
pub mod figure;
pub mod input;
pub mod layout;
pub mod lineage;
pub mod output;
pub mod render;

pub use error::{Result, TaxflowError};
pub use figure::{SankeyFigure, SankeyStyle};
pub use input::{CsvSchema, read_rows, read_rows_from_path, validate_headers};
pub use lineage::{
    DedupPolicy, LineageGraphBuilder, LineageRow, NodeRegistry, SankeyGraph, SankeyLink,
    build_graph,
};
pub use output::{
    OutputFormat, SaveOutcome, save_figure, show_figure, show_figure_with_viewer, viewer_command,
};
