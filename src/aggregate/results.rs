//! The results file written by `dragen-qc aggregate` and read by
//! `dragen-qc plot`.

use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::engine::AggregationReport;
use super::module::Assets;
use super::module::ModuleDescriptor;
use super::views::DerivedViews;

/// Suffix of the results file.
pub const RESULTS_SUFFIX: &str = ".dragen.json";

/// Everything produced for the renderer by one run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Results {
    /// The report section this data belongs to.
    pub module: ModuleDescriptor,

    /// Asset bundles for the section.
    pub assets: Assets,

    /// Number of samples with at least one usable record.
    pub samples_found: usize,

    /// What happened while aggregating.
    pub report: AggregationReport,

    /// The derived views.
    pub views: DerivedViews,
}

impl Results {
    /// Creates results for a finished run.
    pub fn new(report: AggregationReport, views: DerivedViews) -> Self {
        Self {
            module: ModuleDescriptor::default(),
            assets: Assets::default(),
            samples_found: report.samples_found.len(),
            report,
            views,
        }
    }

    /// Attempts to write the [`Results`] struct to `<prefix>.dragen.json`
    /// within the specified directory, returning the path written to.
    pub fn write(&self, output_prefix: &str, directory: &Path) -> Result<PathBuf, io::Error> {
        let mut filepath = PathBuf::from(directory);
        filepath.push(format!("{}{}", output_prefix, RESULTS_SUFFIX));

        let output = serde_json::to_string_pretty(&self)?;
        let mut file = File::create(&filepath)?;
        file.write_all(output.as_bytes())?;

        Ok(filepath)
    }

    /// Attempts to read a [`Results`] struct from a file.
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Results> {
        let path = filepath.as_ref();
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
