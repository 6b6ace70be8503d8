use colored::Colorize;
use taxflow::{command_argument_builder, handle_plot, init_logging};

fn main() {
    let matches = command_argument_builder().get_matches();
    init_logging(matches.get_flag("verbose"));

    if let Err(e) = handle_plot(&matches) {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
