//! Line charts of histogram views.

use plotly::common::Mode;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::Layout;
use plotly::Scatter;
use tracing::debug;

use crate::aggregate::views::ChartInfo;
use crate::aggregate::views::DerivedViews;
use crate::plot::command::ViewPlot;

/// Plots one histogram chart, either per bucket or cumulatively.
pub struct HistogramPlot {
    info: &'static ChartInfo,
    cumulative: bool,
    name: String,
    filename: String,
    description: String,
}

impl HistogramPlot {
    /// Creates a plot of the given chart.
    pub fn new(info: &'static ChartInfo, cumulative: bool) -> Self {
        let (name, filename, description) = if cumulative {
            (
                format!("{} (Cumulative)", info.title),
                format!("{}_cumulative", info.id),
                format!("Running sum of the {} per sample.", info.title.to_lowercase()),
            )
        } else {
            (
                info.title.to_string(),
                info.id.to_string(),
                format!("The {} per sample.", info.title.to_lowercase()),
            )
        };

        Self {
            info,
            cumulative,
            name,
            filename,
            description,
        }
    }
}

impl ViewPlot for HistogramPlot {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn generate(&self, views: &DerivedViews) -> anyhow::Result<Option<plotly::Plot>> {
        let view = match views.histograms.iter().find(|v| v.chart == self.info.id) {
            Some(view) => view,
            None => return Ok(None),
        };

        let x: Vec<u64> = view.buckets.iter().map(|b| b.bound).collect();
        let mut plot = plotly::Plot::new();

        for series in &view.series {
            let y = if self.cumulative {
                match &series.cumulative {
                    Some(cumulative) => cumulative.clone(),
                    None => {
                        debug!("  [*] {} has no cumulative values, skipping.", series.name);
                        continue;
                    }
                }
            } else {
                series.values.clone()
            };

            let trace = Scatter::new(x.clone(), y)
                .mode(Mode::Lines)
                .name(series.name.clone());
            plot.add_trace(trace);
        }

        let layout = Layout::new()
            .title(Title::new(&self.name))
            .x_axis(
                Axis::new()
                    .title(Title::new(&view.x_label))
                    .auto_range(true),
            )
            .y_axis(
                Axis::new()
                    .title(Title::new(&view.y_label))
                    .auto_range(true),
            );

        plot.set_layout(layout);
        Ok(Some(plot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::views::histograms::CHARTS;
    use crate::aggregate::views::HistogramSeries;
    use crate::aggregate::views::HistogramView;
    use crate::utils::histogram::Bucket;

    fn views() -> DerivedViews {
        DerivedViews {
            histograms: vec![HistogramView {
                chart: CHARTS[0].id.to_string(),
                title: CHARTS[0].title.to_string(),
                x_label: String::from("Depth"),
                y_label: String::from("Bases"),
                buckets: vec![
                    Bucket {
                        label: String::from("0"),
                        bound: 0,
                    },
                    Bucket {
                        label: String::from("1+"),
                        bound: 1,
                    },
                ],
                series: vec![HistogramSeries {
                    name: String::from("a"),
                    sample: String::from("a"),
                    values: vec![1.0, 2.0],
                    cumulative: Some(vec![1.0, 3.0]),
                }],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_generates_only_with_data() {
        let plot = HistogramPlot::new(&CHARTS[0], false);
        assert!(plot.generate(&views()).unwrap().is_some());
        assert!(plot
            .generate(&DerivedViews::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_cumulative_names() {
        let plot = HistogramPlot::new(&CHARTS[0], true);
        assert_eq!(plot.filename(), "coverage_cumulative");
        assert!(plot.generate(&views()).unwrap().is_some());
    }
}
