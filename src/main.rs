use clap::Parser;
use clap::Subcommand;

use dragen_qc::aggregate;
use dragen_qc::list;
use dragen_qc::plot;

use git_testament::{git_testament, render_testament};

git_testament!(TESTAMENT);

/// Aggregates DRAGEN quality control metrics.
#[derive(Parser)]
#[command(author, version = render_testament!(TESTAMENT), propagate_version = true)]
struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// All available information, including debug information, is printed to
    /// stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregates the DRAGEN metric files found under a directory.
    Aggregate(aggregate::command::AggregateArgs),

    /// Lists supported metric kinds, plots and general statistics.
    List(list::command::ListArgs),

    /// Plots the views of an `aggregate` results file.
    Plot(plot::command::PlotArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match cli.command {
        Command::Aggregate(args) => aggregate::command::aggregate(args),
        Command::List(args) => list::command::list(args),
        Command::Plot(args) => plot::command::plot(args),
    }
}
