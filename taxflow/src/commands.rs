use crate::CLAP_STYLING;
use clap::{ArgGroup, arg};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("taxflow")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("taxflow")
        .about("Generate a Sankey diagram from a taxonomy summary CSV file.")
        .styles(CLAP_STYLING)
        .arg(
            arg!(--"summary-csv" <PATH>)
                .required(false)
                .help(
                    "Path to csv_summary generated by running 'sourmash tax metagenome' on a \
                sourmash gather csv",
                ),
        )
        .arg(
            arg!(--"annotate-csv" <PATH>)
                .required(false)
                .help(
                    "Path to 'with-lineages' file generated by running 'sourmash tax annotate' \
                on a sourmash gather csv",
                ),
        )
        .group(
            ArgGroup::new("input")
                .args(["summary-csv", "annotate-csv"])
                .required(true)
                .multiple(false),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help(
                    "Output file for the alluvial flow diagram: .html, .png, .jpg, .jpeg, .pdf \
                or .svg (default: open in browser)",
                ),
        )
        .arg(
            arg!(--"title" <TEXT>)
                .required(false)
                .help("Plot title (default: use input filename)"),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("Enable debug logging (overrides RUST_LOG)")
                .action(clap::ArgAction::SetTrue),
        )
}
