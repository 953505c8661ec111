//! The aggregation engine.
//!
//! The engine lists the candidate files of every enabled kind in a single
//! walk of the source and classifies them. Then, for every enabled kind in a
//! fixed order, it reads and parses the files of the kind concurrently and
//! merges the results into a [`SampleStore`]. Merging happens in a single
//! loop, in discovery order, so the outcome of a run does not depend on which
//! file finishes parsing first.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::StreamExt;
use indexmap::IndexMap;
use num_format::Locale;
use num_format::ToFormattedString;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::classify::FileClassifier;
use super::errors::AggregateError;
use super::errors::FileError;
use super::errors::ReadError;
use super::kind::MetricKind;
use super::parsers::KindParser;
use super::parsers::ParserRegistry;
use super::record::ParsedRecord;
use super::record::SampleKey;
use super::source::FileSource;
use super::store::FrozenStore;
use super::store::SampleStore;
use crate::utils::display::FileCounter;

/// Default number of files read and parsed at the same time.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default time allowed for reading a single file.
pub const DEFAULT_FILE_TIMEOUT: Duration = Duration::from_secs(30);

//===============//
// Configuration //
//===============//

/// Settings of an aggregation run.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Maximum number of files read and parsed concurrently.
    pub concurrency: usize,

    /// Time allowed for reading one file.
    pub file_timeout: Duration,

    /// The kinds to aggregate. They are always processed in the order of
    /// [`MetricKind::ALL`], whatever order they are given in.
    pub kinds: Vec<MetricKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            file_timeout: DEFAULT_FILE_TIMEOUT,
            kinds: MetricKind::ALL.to_vec(),
        }
    }
}

//========//
// Report //
//========//

/// Per-kind file counts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    /// Files parsed and merged into the store.
    pub parsed: usize,

    /// Candidates whose name turned out not to belong to the kind.
    pub skipped_unrecognized: usize,

    /// Files that could not be read or parsed.
    pub failed: usize,

    /// Files dropped because their slot was already populated.
    pub conflicts: usize,
}

/// A file that did not contribute to the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// The offending file.
    pub path: PathBuf,

    /// The kind it was classified as.
    pub kind: MetricKind,

    /// Why it was rejected.
    pub reason: String,
}

/// What happened during a run. The report is produced even when the run
/// fails with [`AggregateError::NoSamplesFound`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AggregationReport {
    /// Counts for every processed kind, in processing order.
    pub kinds: IndexMap<MetricKind, KindCounts>,

    /// Every rejected file, in the order it was encountered.
    pub rejected: Vec<Rejection>,

    /// Samples that appeared in at least one file name but never contributed
    /// a usable record.
    pub unusable_samples: BTreeSet<String>,

    /// Samples that contributed at least one usable record.
    pub samples_found: BTreeSet<String>,
}

impl AggregationReport {
    /// Sum of the counts over every kind.
    pub fn totals(&self) -> KindCounts {
        self.kinds
            .values()
            .fold(KindCounts::default(), |mut acc, counts| {
                acc.parsed += counts.parsed;
                acc.skipped_unrecognized += counts.skipped_unrecognized;
                acc.failed += counts.failed;
                acc.conflicts += counts.conflicts;
                acc
            })
    }
}

//========//
// Engine //
//========//

/// Drives classification, parsing and merging for every enabled kind.
pub struct AggregationEngine {
    config: EngineConfig,
    classifier: FileClassifier,
    parsers: ParserRegistry,
}

impl AggregationEngine {
    /// Creates an engine with a parser for every kind.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            classifier: FileClassifier::new(),
            parsers: ParserRegistry::with_all_kinds(),
        }
    }

    /// The kinds this engine processes, in processing order.
    pub fn enabled_kinds(&self) -> impl Iterator<Item = MetricKind> + '_ {
        MetricKind::ALL
            .into_iter()
            .filter(|kind| self.config.kinds.contains(kind))
    }

    /// Runs the aggregation against a file source.
    pub async fn run(
        &self,
        source: Arc<dyn FileSource>,
    ) -> Result<(FrozenStore, AggregationReport), AggregateError> {
        let kinds: Vec<MetricKind> = self.enabled_kinds().collect();
        let candidates = self.discover(&source, &kinds).await;

        let mut dispatched: IndexMap<MetricKind, (KindCounts, Vec<(PathBuf, SampleKey)>)> = kinds
            .iter()
            .map(|kind| (*kind, (KindCounts::default(), Vec::new())))
            .collect();

        for path in candidates {
            match self.classifier.classify(&path) {
                Some((kind, key)) if dispatched.contains_key(&kind) => {
                    dispatched[&kind].1.push((path, key));
                }
                _ => {
                    if let Some(kind) = self.classifier.mentioned_kind(&path, &kinds) {
                        debug!("  [*] Skipping unrecognized {} file: {}", kind, path.display());
                        dispatched[&kind].0.skipped_unrecognized += 1;
                    }
                }
            }
        }

        let total: usize = dispatched.values().map(|(_, files)| files.len()).sum();
        let mut run = RunState {
            store: SampleStore::new(),
            report: AggregationReport::default(),
            seen: BTreeSet::new(),
            counter: FileCounter::new(total),
        };

        for (kind, (counts, files)) in dispatched {
            info!("Processing {} files.", kind);
            let counts = self.run_kind(kind, files, counts, &source, &mut run).await;
            debug!("  [*] {}: {:?}", kind, counts);
            run.report.kinds.insert(kind, counts);
        }

        let RunState {
            store,
            mut report,
            seen,
            counter,
        } = run;

        report.samples_found = store.samples_found().clone();
        report.unusable_samples = seen
            .difference(&report.samples_found)
            .cloned()
            .collect();

        for sample in &report.unusable_samples {
            warn!("No usable metrics were found for sample `{}`.", sample);
        }

        if report.samples_found.is_empty() {
            return Err(AggregateError::NoSamplesFound(Box::new(report)));
        }

        info!(
            "Found {} reports across {} files.",
            report.samples_found.len().to_formatted_string(&Locale::en),
            counter.get().to_formatted_string(&Locale::en)
        );

        Ok((store.freeze(), report))
    }

    /// Lists the candidate files of every given kind in one walk of the
    /// source. The walk is blocking, so it runs off the async workers. A
    /// listing that fails yields no candidates.
    async fn discover(&self, source: &Arc<dyn FileSource>, kinds: &[MetricKind]) -> Vec<PathBuf> {
        let patterns = self.classifier.discovery_set(kinds);
        let source = Arc::clone(source);

        match tokio::task::spawn_blocking(move || source.list(&patterns)).await {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(e)) => {
                error!("Could not list metric files: {}", e);
                Vec::new()
            }
            Err(e) => {
                error!("Listing metric files did not complete: {}", e);
                Vec::new()
            }
        }
    }

    async fn run_kind(
        &self,
        kind: MetricKind,
        files: Vec<(PathBuf, SampleKey)>,
        mut counts: KindCounts,
        source: &Arc<dyn FileSource>,
        run: &mut RunState,
    ) -> KindCounts {
        let Some(parser) = self.parsers.get(kind) else {
            error!("No parser is registered for {} files.", kind);
            return counts;
        };

        let timeout = self.config.file_timeout;
        let mut results = futures::stream::iter(files.into_iter().map(|(path, key)| {
            let load = source.load(&path);
            let parser = Arc::clone(&parser);
            async move {
                let outcome = read_and_parse(load, parser, timeout).await;
                (path, key, outcome)
            }
        }))
        .buffered(self.config.concurrency.max(1));

        while let Some((path, key, outcome)) = results.next().await {
            run.counter.inc();
            run.seen.insert(key.sample().to_string());

            let merged = outcome.and_then(|record| {
                run.store
                    .merge(&key, kind, record, &path)
                    .map_err(FileError::from)
            });

            match merged {
                Ok(()) => {
                    debug!("  [*] Merged {} metrics for {}.", kind, key);
                    counts.parsed += 1;
                }
                Err(e) => {
                    if matches!(e, FileError::Conflict(_)) {
                        counts.conflicts += 1;
                        warn!("{}", e);
                    } else {
                        counts.failed += 1;
                        warn!("Skipping {}: {}", path.display(), e);
                    }

                    run.report.rejected.push(Rejection {
                        path,
                        kind,
                        reason: e.to_string(),
                    });
                }
            }
        }

        counts
    }
}

// Everything a run accumulates across kinds.
struct RunState {
    store: SampleStore,
    report: AggregationReport,
    seen: BTreeSet<String>,
    counter: FileCounter,
}

/// Reads one file under the configured timeout and parses it, off the
/// aggregating task.
async fn read_and_parse(
    load: BoxFuture<'static, std::io::Result<String>>,
    parser: Arc<dyn KindParser>,
    timeout: Duration,
) -> Result<ParsedRecord, FileError> {
    let task = tokio::spawn(async move {
        let contents = match tokio::time::timeout(timeout, load).await {
            Ok(result) => result.map_err(ReadError::from)?,
            Err(_) => return Err(FileError::Read(ReadError::Timeout(timeout))),
        };

        parser.parse(&contents).map_err(FileError::from)
    });

    match task.await {
        Ok(result) => result,
        Err(e) => Err(FileError::Read(ReadError::Task(e.to_string()))),
    }
}
