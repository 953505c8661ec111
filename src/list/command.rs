//! Functionality related to the `dragen-qc list` command itself.

use anyhow::bail;
use clap::builder::PossibleValuesParser;
use clap::Args;
use prettytable::row;
use prettytable::Table;

use crate::aggregate::kind::MetricKind;
use crate::aggregate::views::general_stats;
use crate::plot::command::get_all_plots;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `dragen-qc list`.
#[derive(Args)]
pub struct ListArgs {
    /// The subject which you want to list values for.
    #[arg(value_parser = PossibleValuesParser::new(["kinds", "plots", "general-stats"]))]
    subject: String,
}

//==============//
// Main command //
//==============//

/// Main method for the `dragen-qc list` subcommand.
pub fn list(args: ListArgs) -> anyhow::Result<()> {
    match args.subject.as_str() {
        "kinds" => {
            let mut table = Table::new();

            table.add_row(row![
                "Order",
                "Name",
                "File pattern",
                "Schema version",
                "Schema metrics"
            ]);
            for (i, kind) in MetricKind::ALL.into_iter().enumerate() {
                let schema = kind.schema();
                table.add_row(row![
                    i + 1,
                    kind.name(),
                    kind.display_pattern(),
                    schema.version,
                    schema.metrics.len(),
                ]);
            }

            table.printstd();
        }
        "plots" => {
            let mut table = Table::new();
            table.add_row(row!["Name", "File", "Description"]);

            for plot in get_all_plots(None)? {
                table.add_row(row![plot.name(), plot.filename(), plot.description()]);
            }

            table.printstd();
        }
        "general-stats" => {
            let mut table = Table::new();
            table.add_row(row!["Kind", "Metric", "Unit"]);

            for (kind, metric) in general_stats::SELECTION {
                let unit = kind.schema().unit_of(metric);
                table.add_row(row![kind.name(), metric, format!("{:?}", unit)]);
            }

            table.printstd();
        }
        s => bail!("Unsupported subject: {}", s),
    }

    Ok(())
}
