use std::io::Write;
use taxflow::command_argument_builder;
use taxflow::handlers::*;
use taxflow_core::CsvSchema;
use tempfile::{Builder, TempDir};

const SUMMARY_CSV: &str = "\
query_name,rank,fraction,lineage
sample,genus,0.5,A;B;C
sample,genus,0.3,A;B;D
";

fn matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["taxflow"];
    argv.extend_from_slice(args);
    command_argument_builder()
        .try_get_matches_from(argv)
        .unwrap()
}

fn summary_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("SRR123.summarized.csv");
    std::fs::write(&path, SUMMARY_CSV).unwrap();
    path
}

#[test]
fn test_cli_requires_an_input() {
    let result = command_argument_builder().try_get_matches_from(["taxflow"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_inputs_are_mutually_exclusive() {
    let result = command_argument_builder().try_get_matches_from([
        "taxflow",
        "--summary-csv",
        "a.csv",
        "--annotate-csv",
        "b.csv",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_plot_options_summary() {
    let args = matches(&["--summary-csv", "SRR123.summarized.csv", "-o", "out.png"]);
    let options = plot_options_from_matches(&args).unwrap();

    assert_eq!(options.schema, CsvSchema::Summary);
    assert_eq!(options.input, "SRR123.summarized.csv");
    assert_eq!(
        options.output.as_deref(),
        Some(std::path::Path::new("out.png"))
    );
    assert_eq!(resolve_title(&options), "SRR123");
}

#[test]
fn test_plot_options_annotate_with_title() {
    let args = matches(&[
        "--annotate-csv",
        "SRR123.with-lineages.csv",
        "--title",
        "Gut sample",
    ]);
    let options = plot_options_from_matches(&args).unwrap();

    assert_eq!(options.schema, CsvSchema::Annotate);
    assert!(options.output.is_none());
    assert_eq!(resolve_title(&options), "Gut sample");
}

#[test]
fn test_plot_options_expand_tilde() {
    let args = matches(&["--summary-csv", "~/taxa.summarized.csv"]);
    let options = plot_options_from_matches(&args).unwrap();

    // Title keeps the path as typed; only the file lookup is expanded
    assert_eq!(resolve_title(&options), "~/taxa");
    assert!(!options.input_path().to_string_lossy().starts_with('~'));
}

#[test]
fn test_build_figure_from_summary() {
    let dir = TempDir::new().unwrap();
    let input = summary_file(&dir);
    let args = matches(&["--summary-csv", input.to_str().unwrap()]);
    let options = plot_options_from_matches(&args).unwrap();

    let figure = build_figure(&options).unwrap();

    assert_eq!(figure.graph.nodes, vec!["A", "B", "C", "D"]);
    assert_eq!(figure.graph.links.len(), 3);
    assert!(figure.title.ends_with("SRR123"));
}

#[test]
fn test_build_figure_from_annotate_keeps_duplicates() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = Builder::new().suffix(".with-lineages.csv").tempfile()?;
    writeln!(input, "f_unique_weighted,lineage")?;
    writeln!(input, "0.5,A;B;C")?;
    writeln!(input, "0.3,A;B;D")?;

    let args = matches(&["--annotate-csv", input.path().to_str().unwrap()]);
    let options = plot_options_from_matches(&args)?;
    let figure = build_figure(&options)?;

    assert_eq!(figure.graph.links.len(), 4);
    Ok(())
}

#[test]
fn test_build_figure_wrong_schema_fails() {
    let dir = TempDir::new().unwrap();
    let input = summary_file(&dir);
    let args = matches(&["--annotate-csv", input.to_str().unwrap()]);
    let options = plot_options_from_matches(&args).unwrap();

    let err = build_figure(&options).unwrap_err();
    assert!(format!("{:#}", err).contains("f_unique_weighted"));
}

#[test]
fn test_build_figure_missing_file_fails() {
    let args = matches(&["--summary-csv", "/nonexistent/x.summarized.csv"]);
    let options = plot_options_from_matches(&args).unwrap();

    let err = build_figure(&options).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}

#[test]
fn test_handle_plot_writes_svg() {
    let dir = TempDir::new().unwrap();
    let input = summary_file(&dir);
    let output = dir.path().join("plot.svg");
    let args = matches(&[
        "--summary-csv",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);

    handle_plot(&args).unwrap();

    let svg = std::fs::read_to_string(&output).unwrap();
    assert!(svg.contains("B → D"));
}

#[test]
fn test_handle_plot_writes_html() {
    let dir = TempDir::new().unwrap();
    let input = summary_file(&dir);
    let output = dir.path().join("plot.html");
    let args = matches(&[
        "--summary-csv",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--title",
        "Custom",
    ]);

    handle_plot(&args).unwrap();

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("<title>Custom</title>"));
}

#[test]
fn test_handle_plot_unsupported_extension_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let input = summary_file(&dir);
    let output = dir.path().join("plot.txt");
    let args = matches(&[
        "--summary-csv",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);

    assert!(handle_plot(&args).is_ok());
    assert!(!output.exists());
}

#[test]
fn test_handle_plot_malformed_input_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.summarized.csv");
    std::fs::write(&input, "fraction,lineage\nnot-a-number,A;B\n").unwrap();
    let output = dir.path().join("plot.svg");
    let args = matches(&[
        "--summary-csv",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);

    assert!(handle_plot(&args).is_err());
    assert!(!output.exists());
}
