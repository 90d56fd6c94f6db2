//! Cross-series combination (clustering and stacking) along a stack axis.
//!
//! A [`CombineStrategy`] is rebuilt for every stack axis once per layout
//! pass, before any value axis is updated, because value-axis ranges depend
//! on the stack sums it accumulates.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::axis::AxisModel;
use crate::core::{AxisId, CategoryKey, CombineMode, PointRef, SeriesId, SeriesModel};

/// Running raw sums of one stack, split by sign.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StackSums {
    pub positive: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombineStack {
    pub key: Option<String>,
    pub points: Vec<PointRef>,
    /// Transformed positive sum, as reported by the value axis.
    pub positive_sum: f64,
    /// Transformed negative sum, as reported by the value axis.
    pub negative_sum: f64,
    raw: StackSums,
}

impl CombineStack {
    fn new(key: Option<String>) -> Self {
        Self {
            key,
            points: Vec::new(),
            positive_sum: 0.0,
            negative_sum: 0.0,
            raw: StackSums::default(),
        }
    }

    /// Distance between both stack extremes; the stacked-100 divisor.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.positive_sum - self.negative_sum
    }
}

/// All stacks sharing one combine-group key (typically one category).
#[derive(Debug, Clone, PartialEq)]
pub struct CombineGroup {
    pub key: CategoryKey,
    pub stacks: SmallVec<[CombineStack; 4]>,
}

impl CombineGroup {
    fn new(key: CategoryKey) -> Self {
        Self {
            key,
            stacks: SmallVec::new(),
        }
    }

    fn stack_index(&mut self, series: &SeriesModel) -> usize {
        // clustered series never share a stack
        if series.combine_mode == CombineMode::Cluster {
            self.stacks.push(CombineStack::new(None));
            return self.stacks.len() - 1;
        }

        if let Some(index) = self
            .stacks
            .iter()
            .position(|stack| stack.key == series.stack_group)
        {
            return index;
        }

        self.stacks.push(CombineStack::new(series.stack_group.clone()));
        self.stacks.len() - 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedSeries {
    pub combine_mode: CombineMode,
    pub combine_index: usize,
    pub stack_axis: AxisId,
    pub stack_value_axis: AxisId,
    pub series: Vec<SeriesId>,
    pub groups: Vec<CombineGroup>,
}

impl CombinedSeries {
    #[must_use]
    pub fn contains(&self, series: SeriesId) -> bool {
        self.series.contains(&series)
    }

    fn matches(&self, combine_mode: CombineMode, stack_value_axis: AxisId) -> bool {
        self.combine_mode == combine_mode
            && (combine_mode == CombineMode::Cluster || self.stack_value_axis == stack_value_axis)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CombineStrategy {
    combined_series: Vec<CombinedSeries>,
    non_combined_series: Vec<SeriesId>,
    has_combination: bool,
    minimum_stack_sums: IndexMap<AxisId, f64>,
    maximum_stack_sums: IndexMap<AxisId, f64>,
    stack_axis: Option<AxisId>,
    stack_value_axes: Vec<AxisId>,
    is_updated: bool,
}

impl CombineStrategy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn combined_series(&self) -> &[CombinedSeries] {
        &self.combined_series
    }

    #[must_use]
    pub fn non_combined_series(&self) -> &[SeriesId] {
        &self.non_combined_series
    }

    #[must_use]
    pub fn has_combination(&self) -> bool {
        self.has_combination
    }

    #[must_use]
    pub fn stack_axis(&self) -> Option<AxisId> {
        self.stack_axis
    }

    #[must_use]
    pub fn stack_value_axes(&self) -> &[AxisId] {
        &self.stack_value_axes
    }

    #[must_use]
    pub fn stacks_axis(&self, axis: AxisId) -> bool {
        self.stack_value_axes.contains(&axis)
    }

    #[must_use]
    pub fn minimum_stack_sum(&self, axis: AxisId) -> Option<f64> {
        self.minimum_stack_sums.get(&axis).copied()
    }

    #[must_use]
    pub fn maximum_stack_sum(&self, axis: AxisId) -> Option<f64> {
        self.maximum_stack_sums.get(&axis).copied()
    }

    #[must_use]
    pub fn is_updated(&self) -> bool {
        self.is_updated
    }

    /// Splits `series` into combined and standalone sets and accumulates stack sums.
    ///
    /// `axis_lookup` resolves value axes; series whose value axis cannot be
    /// resolved still take part in grouping but contribute no sums.
    pub fn update<'a, F>(&mut self, series: &[&SeriesModel], stack_axis: &AxisModel, axis_lookup: F)
    where
        F: Fn(AxisId) -> Option<&'a AxisModel>,
    {
        if self.is_updated {
            return;
        }

        self.stack_axis = Some(stack_axis.id());

        for model in series.iter().filter(|model| model.is_visible) {
            let stack_value_axis = model.other_axis(stack_axis.id());
            if !self.stack_value_axes.contains(&stack_value_axis) {
                self.stack_value_axes.push(stack_value_axis);
            }

            if model.combine_mode == CombineMode::None {
                self.non_combined_series.push(model.id);
                continue;
            }

            let index = self.combined_series_index(model.combine_mode, stack_value_axis, stack_axis.id());
            self.combined_series[index].series.push(model.id);
            self.has_combination = true;
        }

        if self.has_combination {
            for index in 0..self.combined_series.len() {
                self.process_series(index, series, stack_axis, &axis_lookup);
            }
        }

        debug!(
            stack_axis = stack_axis.id().0,
            combined = self.combined_series.len(),
            non_combined = self.non_combined_series.len(),
            "combine strategy updated"
        );
        self.is_updated = true;
    }

    pub fn reset(&mut self) {
        self.combined_series.clear();
        self.non_combined_series.clear();
        self.has_combination = false;
        self.minimum_stack_sums.clear();
        self.maximum_stack_sums.clear();
        self.stack_value_axes.clear();
        self.stack_axis = None;
        self.is_updated = false;
    }

    fn combined_series_index(
        &mut self,
        combine_mode: CombineMode,
        stack_value_axis: AxisId,
        stack_axis: AxisId,
    ) -> usize {
        if let Some(index) = self
            .combined_series
            .iter()
            .position(|combined| combined.matches(combine_mode, stack_value_axis))
        {
            return index;
        }

        let combine_index = self.combined_series.len();
        self.combined_series.push(CombinedSeries {
            combine_mode,
            combine_index,
            stack_axis,
            stack_value_axis,
            series: Vec::new(),
            groups: Vec::new(),
        });
        combine_index
    }

    fn process_series<'a, F>(
        &mut self,
        index: usize,
        series: &[&SeriesModel],
        stack_axis: &AxisModel,
        axis_lookup: &F,
    ) where
        F: Fn(AxisId) -> Option<&'a AxisModel>,
    {
        let mut groups_by_key: IndexMap<CategoryKey, usize> = IndexMap::new();
        let members = self.combined_series[index].series.clone();

        for model in series
            .iter()
            .filter(|model| model.is_visible && members.contains(&model.id))
        {
            let stack_value_axis_id = model.other_axis(stack_axis.id());
            let stack_value_axis = axis_lookup(stack_value_axis_id);

            let mut min = *self
                .minimum_stack_sums
                .entry(stack_value_axis_id)
                .or_insert(f64::INFINITY);
            let mut max = *self
                .maximum_stack_sums
                .entry(stack_value_axis_id)
                .or_insert(f64::NEG_INFINITY);

            let combined = &mut self.combined_series[index];
            for (point_index, point) in model.points().iter().enumerate() {
                let Some(key) = stack_axis.combine_group_key(model, point) else {
                    continue;
                };

                let group_index = *groups_by_key.entry(key.clone()).or_insert_with(|| {
                    combined.groups.push(CombineGroup::new(key));
                    combined.groups.len() - 1
                });

                let group = &mut combined.groups[group_index];
                let stack_index = group.stack_index(model);
                let stack = &mut group.stacks[stack_index];
                stack.points.push(model.point_ref(point_index));

                let Some(value_axis) = stack_value_axis else {
                    continue;
                };
                let value = model.value_for_axis(point, stack_value_axis_id);
                let Some(sum) = value_axis.stack_sum_value(value, &mut stack.raw) else {
                    continue;
                };

                if sum.positive {
                    stack.positive_sum = sum.transformed;
                } else {
                    stack.negative_sum = sum.transformed;
                }

                min = min.min(stack.negative_sum);
                max = max.max(stack.positive_sum);
            }

            trace!(
                series = model.id.0,
                value_axis = stack_value_axis_id.0,
                min,
                max,
                "stack sums accumulated"
            );
            self.minimum_stack_sums.insert(stack_value_axis_id, min);
            self.maximum_stack_sums.insert(stack_value_axis_id, max);
        }
    }
}
