//! Functionality related to the `dragen-qc aggregate` command itself.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use anyhow::Context;
use clap::Args;
use itertools::Itertools;
use num_format::Locale;
use num_format::ToFormattedString;
use prettytable::row;
use prettytable::Table;
use tracing::debug;
use tracing::info;

use super::engine::AggregationEngine;
use super::engine::AggregationReport;
use super::engine::EngineConfig;
use super::engine::KindCounts;
use super::engine::DEFAULT_CONCURRENCY;
use super::errors::AggregateError;
use super::kind::MetricKind;
use super::results::Results;
use super::source::DirectorySource;
use super::source::FileSource;
use super::views;
use crate::errors;
use crate::errors::ExitCode;
use crate::plot::command::write_plots;
use crate::utils::display::PercentageFormat;

//========================//
// Command line arguments //
//========================//

/// Clap arguments for the `dragen-qc aggregate` subcommand.
#[derive(Args)]
pub struct AggregateArgs {
    /// Directory to search (recursively) for DRAGEN metric files.
    #[arg(value_name = "DIR")]
    src: PathBuf,

    /// Directory to output files to. Defaults to current working directory.
    #[arg(short = 'o', long, value_name = "PATH")]
    output_directory: Option<PathBuf>,

    /// Output prefix for the files that will be created.
    #[arg(short = 'p', long, value_name = "STRING", default_value = "dragen")]
    output_prefix: String,

    /// Only process the given metric kinds (by name or file stem). May be
    /// given more than once.
    #[arg(long = "only", value_name = "KIND")]
    only_kinds: Vec<MetricKind>,

    /// Number of files read and parsed concurrently.
    #[arg(short = 'c', long, value_name = "USIZE", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Seconds allowed for reading a single file.
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    timeout: u64,

    /// Follow symbolic links while searching for files.
    #[arg(long)]
    follow_links: bool,

    /// Do not render the plots.
    #[arg(long)]
    no_plots: bool,
}

//=====================================//
// Prepares the `aggregate` subcommand //
//=====================================//

/// Main method for the `dragen-qc aggregate` subcommand.
pub fn aggregate(args: AggregateArgs) -> anyhow::Result<()> {
    info!("Starting aggregate command...");
    debug!("Arguments:");

    //=============//
    // Source Path //
    //=============//

    let src = args.src;
    if !src.is_dir() {
        errors::exit(
            format!("Source is not a directory: {}", src.display()).as_str(),
            ExitCode::InvalidInputData,
        );
    }
    debug!("  [*] Source: {}", src.display());

    //==================//
    // Output Directory //
    //==================//

    let output_directory = match args.output_directory {
        Some(o) => o,
        None => std::env::current_dir()
            .context("could not retrieve the current working directory")?,
    };
    debug!("  [*] Output directory: {}", output_directory.display());
    debug!("  [*] Output prefix: {}", args.output_prefix);

    //===============//
    // Configuration //
    //===============//

    if args.concurrency == 0 {
        bail!("concurrency must be at least 1");
    }

    let kinds = if args.only_kinds.is_empty() {
        MetricKind::ALL.to_vec()
    } else {
        args.only_kinds
    };

    let config = EngineConfig {
        concurrency: args.concurrency,
        file_timeout: Duration::from_secs(args.timeout),
        kinds,
    };
    debug!("  [*] Concurrency: {}", config.concurrency);
    debug!("  [*] Per-file timeout: {:?}", config.file_timeout);
    debug!(
        "  [*] Kinds: {}",
        config.kinds.iter().map(|k| k.name()).join(", ")
    );

    //=============//
    // Aggregation //
    //=============//

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("could not start the async runtime")?;

    let source: Arc<dyn FileSource> =
        Arc::new(DirectorySource::new(&src).follow_links(args.follow_links));
    let engine = AggregationEngine::new(config);

    let (store, report) = match rt.block_on(engine.run(source)) {
        Ok(outcome) => outcome,
        Err(AggregateError::NoSamplesFound(report)) => {
            let code = no_samples_exit_code(&report);
            if code == ExitCode::NoFilesFound {
                info!("No DRAGEN metric files were found under {}.", src.display());
                std::process::exit(code as i32);
            }

            print_report(&report);
            errors::exit(
                format!("No DRAGEN reports were found under {}", src.display()).as_str(),
                code,
            );
        }
    };

    print_report(&report);

    //=========//
    // Results //
    //=========//

    let results = Results::new(report, views::build(&store));
    let path = results
        .write(&args.output_prefix, &output_directory)
        .with_context(|| {
            format!(
                "could not write results to {}",
                output_directory.display()
            )
        })?;
    info!("  [*] Wrote results to {}", path.display());

    if !args.no_plots {
        write_plots(
            &results.views,
            &args.output_prefix,
            &output_directory,
            None,
        )?;
    }

    Ok(())
}

/// The exit code of a run that found no usable sample. A run that came across
/// no metric file at all, not even an unrecognized one, exits quietly with its
/// own code.
fn no_samples_exit_code(report: &AggregationReport) -> ExitCode {
    if report.totals() == KindCounts::default() {
        ExitCode::NoFilesFound
    } else {
        ExitCode::NoSamplesFound
    }
}

/// Prints the per-kind counts of a run.
fn print_report(report: &AggregationReport) {
    let mut table = Table::new();
    table.add_row(row!["Kind", "Parsed", "Unrecognized", "Failed", "Conflicts"]);

    for (kind, counts) in &report.kinds {
        table.add_row(row![
            kind.name(),
            counts.parsed.to_formatted_string(&Locale::en),
            counts.skipped_unrecognized.to_formatted_string(&Locale::en),
            counts.failed.to_formatted_string(&Locale::en),
            counts.conflicts.to_formatted_string(&Locale::en),
        ]);
    }

    let totals = report.totals();
    table.add_row(row![
        "Total",
        totals.parsed.to_formatted_string(&Locale::en),
        totals.skipped_unrecognized.to_formatted_string(&Locale::en),
        totals.failed.to_formatted_string(&Locale::en),
        totals.conflicts.to_formatted_string(&Locale::en),
    ]);

    table.printstd();

    let considered = totals.parsed + totals.failed + totals.conflicts;
    info!(
        "  [*] {} of {} candidate files contributed ({}).",
        totals.parsed.to_formatted_string(&Locale::en),
        considered.to_formatted_string(&Locale::en),
        PercentageFormat(totals.parsed, considered)
    );

    for rejection in &report.rejected {
        info!(
            "  [*] Rejected {} ({}): {}",
            rejection.path.display(),
            rejection.kind,
            rejection.reason
        );
    }
}
