//! Functionality related to the `dragen-qc plot` command itself.

use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use clap::Args;
use itertools::Itertools;
use tracing::debug;
use tracing::info;

use super::bar::BarPlot;
use super::histogram::HistogramPlot;
use crate::aggregate::results::Results;
use crate::aggregate::results::RESULTS_SUFFIX;
use crate::aggregate::views;
use crate::aggregate::views::DerivedViews;

//===============//
// Command setup //
//===============//

/// Command line arguments for `dragen-qc plot`.
#[derive(Args)]
pub struct PlotArgs {
    /// `dragen-qc aggregate` results file for which to generate the plot(s).
    #[arg(value_name = "JSON")]
    pub src: PathBuf,

    /// The directory to output all files within.
    #[arg(short, long, value_name = "PATH")]
    pub output_directory: Option<PathBuf>,

    /// Output prefix for the plots. Defaults to the prefix of the results
    /// file.
    #[arg(short = 'p', long, value_name = "STRING")]
    pub output_prefix: Option<String>,

    /// If provided, only prepares the plot specified (by plot name).
    #[arg(long = "only")]
    pub only_graph: Option<String>,
}

//=================//
// View plot trait //
//=================//

/// A chart that can be rendered from the derived views.
pub trait ViewPlot {
    /// The name of this plot.
    fn name(&self) -> &str;

    /// A short description of this plot.
    fn description(&self) -> &str;

    /// The filename to output for this plot (without prefix or extension).
    fn filename(&self) -> &str;

    /// Generates the plot. Returns `None` when the views hold no data for it.
    fn generate(&self, views: &DerivedViews) -> anyhow::Result<Option<plotly::Plot>>;
}

/// Gets all of the supported plots.
pub fn get_all_plots(only_graph: Option<String>) -> anyhow::Result<Vec<Box<dyn ViewPlot>>> {
    let histograms = views::histograms::CHARTS
        .iter()
        .map(|info| Box::new(HistogramPlot::new(info, false)) as Box<dyn ViewPlot>);

    let cumulative = views::histograms::CHARTS
        .iter()
        .filter(|info| info.id != views::histograms::COVERAGE_AT_OR_ABOVE_CHART)
        .map(|info| Box::new(HistogramPlot::new(info, true)) as Box<dyn ViewPlot>);

    let bars = views::bars::CHARTS
        .iter()
        .map(|info| Box::new(BarPlot::new(info)) as Box<dyn ViewPlot>);

    let mut results = histograms.chain(cumulative).chain(bars).collect_vec();

    if let Some(only) = only_graph {
        results = results
            .into_iter()
            .filter(|x| x.name().eq_ignore_ascii_case(&only) || x.filename() == only)
            .collect_vec();

        if results.is_empty() {
            bail!("No plots matched the specified `--only` flag: {}", only);
        }
    }

    Ok(results)
}

/// Writes every plot that has data to `<prefix>.<plot>.html` within the
/// directory. Returns the paths written to.
pub fn write_plots(
    views: &DerivedViews,
    output_prefix: &str,
    output_directory: &Path,
    only_graph: Option<String>,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for p in get_all_plots(only_graph)? {
        let plot = match p.generate(views)? {
            Some(plot) => plot,
            None => {
                debug!("  [*] No data for {}, skipping.", p.name());
                continue;
            }
        };

        let mut filename = output_directory.to_path_buf();
        filename.push(format!("{}.{}.html", output_prefix, p.filename()));

        info!("  [*] Writing {} to {}", p.name(), filename.display());
        plot.write_html(&filename);
        written.push(filename);
    }

    Ok(written)
}

//==============//
// Main command //
//==============//

/// Main method for the `dragen-qc plot` subcommand.
pub fn plot(args: PlotArgs) -> anyhow::Result<()> {
    //========//
    // Source //
    //========//

    let results = Results::read(&args.src)
        .with_context(|| format!("invalid input file: {}", args.src.display()))?;
    debug!("  [*] Source: {}", args.src.display());

    //===============//
    // Output prefix //
    //===============//

    let output_prefix = match args.output_prefix {
        Some(prefix) => prefix,
        None => args
            .src
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.trim_end_matches(RESULTS_SUFFIX).to_string())
            .context("could not determine an output prefix from the source file")?,
    };
    debug!("  [*] Output prefix: {}", output_prefix);

    //==================//
    // Output Directory //
    //==================//

    let output_directory = match args.output_directory {
        Some(o) => o,
        None => std::env::current_dir()
            .context("could not retrieve the current working directory")?,
    };
    debug!("  [*] Output directory: {}", output_directory.display());

    //================//
    // Generate Plots //
    //================//

    let written = write_plots(
        &results.views,
        &output_prefix,
        &output_directory,
        args.only_graph,
    )?;
    info!("Wrote {} plots.", written.len());

    Ok(())
}
