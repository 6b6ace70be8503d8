use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;
use taxflow_core::{
    CsvSchema, SankeyFigure, SaveOutcome, build_graph, read_rows_from_path, save_figure,
    show_figure,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Everything a plot run needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Input path exactly as given, used for the default title
    pub input: String,
    pub schema: CsvSchema,
    pub output: Option<PathBuf>,
    pub title: Option<String>,
}

impl PlotOptions {
    /// Input path with a leading `~` expanded
    pub fn input_path(&self) -> PathBuf {
        expand_path(&self.input)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Pick the schema from whichever input option was supplied
pub fn plot_options_from_matches(args: &ArgMatches) -> Result<PlotOptions, String> {
    let (input, schema) = if let Some(path) = args.get_one::<String>("summary-csv") {
        (path.clone(), CsvSchema::Summary)
    } else if let Some(path) = args.get_one::<String>("annotate-csv") {
        (path.clone(), CsvSchema::Annotate)
    } else {
        return Err("Either --summary-csv or --annotate-csv must be provided".to_string());
    };

    Ok(PlotOptions {
        input,
        schema,
        output: args.get_one::<String>("output").map(|p| expand_path(p)),
        title: args.get_one::<String>("title").cloned(),
    })
}

pub fn resolve_title(options: &PlotOptions) -> String {
    match &options.title {
        Some(title) => title.clone(),
        None => options.schema.default_title(&options.input),
    }
}

/// Read the input and build the titled figure; fails before any output is
/// written if the file is unreadable or malformed
pub fn build_figure(options: &PlotOptions) -> Result<SankeyFigure> {
    let path = options.input_path();
    let rows = read_rows_from_path(&path, options.schema)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let graph = build_graph(&rows, options.schema.dedup_policy());
    info!(
        "{} rows produced {} nodes and {} links",
        rows.len(),
        graph.nodes.len(),
        graph.links.len()
    );

    Ok(SankeyFigure::new(graph, resolve_title(options)))
}

pub fn handle_plot(args: &ArgMatches) -> Result<()> {
    let options = plot_options_from_matches(args).map_err(anyhow::Error::msg)?;
    let figure = build_figure(&options)?;

    match &options.output {
        Some(path) => {
            let outcome = save_figure(&figure, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_outcome(&outcome);
        }
        None => {
            let page = show_figure(&figure).context("Failed to display diagram")?;
            println!("{} Opened {}", "→".blue(), page.display());
        }
    }

    Ok(())
}

fn print_outcome(outcome: &SaveOutcome) {
    match outcome {
        SaveOutcome::Unsupported => {
            println!("{} {}", "⚠".yellow().bold(), outcome.message());
        }
        _ => println!("{} {}", "✓".green().bold(), outcome.message()),
    }
}

/// Log to stderr; `RUST_LOG` applies unless `verbose` forces debug
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed when called from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
