//! Grouped bar charts of bar views.

use plotly::common::Title;
use plotly::layout::Axis;
use plotly::layout::BarMode;
use plotly::Bar;
use plotly::Layout;

use crate::aggregate::views::ChartInfo;
use crate::aggregate::views::DerivedViews;
use crate::plot::command::ViewPlot;

/// Plots one bar chart, one group of bars per category.
pub struct BarPlot {
    info: &'static ChartInfo,
    description: String,
}

impl BarPlot {
    /// Creates a plot of the given chart.
    pub fn new(info: &'static ChartInfo) -> Self {
        Self {
            info,
            description: format!("The {} per sample.", info.title.to_lowercase()),
        }
    }
}

impl ViewPlot for BarPlot {
    fn name(&self) -> &str {
        self.info.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn filename(&self) -> &str {
        self.info.id
    }

    fn generate(&self, views: &DerivedViews) -> anyhow::Result<Option<plotly::Plot>> {
        let view = match views.bars.iter().find(|v| v.chart == self.info.id) {
            Some(view) => view,
            None => return Ok(None),
        };

        let mut plot = plotly::Plot::new();
        for series in &view.series {
            let trace = Bar::new(view.categories.clone(), series.values.clone())
                .name(series.name.clone());
            plot.add_trace(trace);
        }

        let layout = Layout::new()
            .title(Title::new(&view.title))
            .bar_mode(BarMode::Group)
            .x_axis(Axis::new().title(Title::new(&view.x_label)))
            .y_axis(
                Axis::new()
                    .title(Title::new(&view.y_label))
                    .auto_range(true),
            );

        plot.set_layout(layout);
        Ok(Some(plot))
    }
}
