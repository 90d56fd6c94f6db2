use tracing::trace;

use crate::combine::{CombineStrategy, CombinedSeries};
use crate::core::{AxisId, CombineMode, SeriesId, SeriesModel};

/// Per-update snapshot of how the series of one axis are stacked.
///
/// Built fresh for every update cycle and dropped afterwards. Sums are only
/// meaningful when `is_stacked` or `is_stacked100` is set; otherwise they keep
/// their `+inf`/`-inf` sentinels.
#[derive(Debug, Clone)]
pub struct StackAggregationContext<'a> {
    pub axis: AxisId,
    pub series: Vec<&'a SeriesModel>,
    pub is_stacked: bool,
    pub is_stacked100: bool,
    pub minimum_stack_sum: f64,
    pub maximum_stack_sum: f64,
    /// Distinct combined series stacking onto this axis.
    pub combined_series: Vec<&'a CombinedSeries>,
    /// Unique `(index into combined_series, member)` pairs.
    pub combined_series_groups: Vec<(usize, SeriesId)>,
    pub non_combined_series: Vec<&'a SeriesModel>,
}

impl<'a> StackAggregationContext<'a> {
    /// Context carrying only the series list, never stacked.
    #[must_use]
    pub fn unstacked(axis: AxisId, series: Vec<&'a SeriesModel>) -> Self {
        Self {
            axis,
            series,
            is_stacked: false,
            is_stacked100: false,
            minimum_stack_sum: f64::INFINITY,
            maximum_stack_sum: f64::NEG_INFINITY,
            combined_series: Vec::new(),
            combined_series_groups: Vec::new(),
            non_combined_series: Vec::new(),
        }
    }

    /// Aggregates the stacking state of `axis` across `strategies`.
    ///
    /// Axes that never carry stacked values (`carries_stack_values == false`)
    /// get an unstacked context.
    #[must_use]
    pub fn build<I>(
        axis: AxisId,
        carries_stack_values: bool,
        series: Vec<&'a SeriesModel>,
        strategies: I,
    ) -> Self
    where
        I: IntoIterator<Item = &'a CombineStrategy>,
    {
        let mut context = Self::unstacked(axis, series);
        if !carries_stack_values {
            return context;
        }

        for strategy in strategies {
            if !strategy.stacks_axis(axis) {
                continue;
            }

            for index in 0..context.series.len() {
                let model = context.series[index];
                let combined = strategy.combined_series().iter().find(|combined| {
                    combined.combine_mode.is_stacking()
                        && combined.stack_value_axis == axis
                        && combined.contains(model.id)
                });

                match combined {
                    Some(combined) => context.record_combined(combined, model),
                    None => context.record_non_combined(model),
                }
            }

            if let Some(minimum) = strategy.minimum_stack_sum(axis) {
                context.minimum_stack_sum = context.minimum_stack_sum.min(minimum);
            }
            if let Some(maximum) = strategy.maximum_stack_sum(axis) {
                context.maximum_stack_sum = context.maximum_stack_sum.max(maximum);
            }
        }

        trace!(
            axis = axis.0,
            stacked = context.is_stacked,
            stacked100 = context.is_stacked100,
            combined = context.combined_series_groups.len(),
            non_combined = context.non_combined_series.len(),
            "stack aggregation context built"
        );
        context
    }

    fn record_combined(&mut self, combined: &'a CombinedSeries, model: &'a SeriesModel) {
        let group = match self
            .combined_series
            .iter()
            .position(|known| std::ptr::eq(*known, combined))
        {
            Some(group) => group,
            None => {
                self.combined_series.push(combined);
                self.combined_series.len() - 1
            }
        };

        if !self.combined_series_groups.contains(&(group, model.id)) {
            self.combined_series_groups.push((group, model.id));
        }
        self.non_combined_series.retain(|known| known.id != model.id);

        match combined.combine_mode {
            CombineMode::Stack => self.is_stacked = true,
            CombineMode::Stack100 => self.is_stacked100 = true,
            CombineMode::None | CombineMode::Cluster => {}
        }
    }

    fn record_non_combined(&mut self, model: &'a SeriesModel) {
        let already_combined = self
            .combined_series_groups
            .iter()
            .any(|(_, member)| *member == model.id);
        let already_listed = self.non_combined_series.iter().any(|known| known.id == model.id);
        if !already_combined && !already_listed {
            self.non_combined_series.push(model);
        }
    }

    #[must_use]
    pub fn is_combined(&self, series: SeriesId) -> bool {
        self.combined_series_groups
            .iter()
            .any(|(_, member)| *member == series)
    }

    #[must_use]
    pub fn series_by_id(&self, id: SeriesId) -> Option<&'a SeriesModel> {
        self.series.iter().copied().find(|model| model.id == id)
    }
}
