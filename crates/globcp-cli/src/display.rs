//! Terminal output for the globcp CLI

use console::style;
use globcp_engine::TargetResolver;
use globcp_select::SelectionResult;
use globcp_types::{Error, RunReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a run is in progress, or `None` in quiet mode
pub fn create_spinner(quiet: bool, message: &'static str) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Print the outcome of a copy run
pub fn print_report(report: &RunReport, dry_run: bool) {
    println!();
    println!("{}", style("Copy Report:").bold().underlined());
    println!("  Attempted: {}", style(report.attempted).cyan());
    println!(
        "  {}: {}",
        if dry_run { "Planned" } else { "Copied" },
        style(report.copied).green()
    );
    println!(
        "  Failed: {}",
        if report.failed > 0 {
            style(report.failed).red()
        } else {
            style(report.failed).green()
        }
    );

    for failure in &report.failures {
        println!(
            "    {} {} -> {}: {}",
            style("✗").red(),
            style(failure.source.display()).cyan(),
            failure.remote,
            style(&failure.message).dim()
        );
    }

    for warning in &report.warnings {
        println!("  {} {}", style("⚠").yellow(), warning);
    }

    println!();
    if report.is_success() {
        println!("{} {}", style("✓").green().bold(), report.summary());
    } else {
        println!("{} {}", style("✗").red().bold(), report.summary());
    }
}

/// Print a fatal run error
pub fn print_fatal(error: &Error) {
    eprintln!("{} {}", style("✗").red().bold(), style(error).red());
}

/// Print selected files with their resolved remote targets
pub fn print_selection(selection: &SelectionResult, resolver: &TargetResolver) {
    println!(
        "{} {} file(s) selected under {}",
        style("→").green().bold(),
        style(selection.len()).bold(),
        style(selection.root().display()).cyan()
    );

    for file in selection.files() {
        println!(
            "  {} {}",
            style(file.display()).cyan(),
            style(format!("-> {}", resolver.resolve(file))).dim()
        );
    }
}
