use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::axis::{AxisModel, ChartView, StackAggregationContext};
use crate::combine::CombineStrategy;
use crate::core::{
    AxisHorizontalLocation, AxisId, AxisType, AxisValue, AxisVerticalLocation, Rect, SeriesId,
    SeriesModel, Size, Thickness,
};
use crate::error::{AxisError, AxisResult};
use crate::render::AxisPresenter;

use super::InvalidationLevel;

/// Arrange passes allowed while axes keep resizing after label fitting.
const MAX_ARRANGE_PASSES: usize = 10;

/// Cartesian plot area owning axes, series and per-stack-axis combine strategies.
///
/// `update_layout` drives every axis through update → plot → measure →
/// arrange. Stack axes and their combine strategies are always updated
/// before value axes because value ranges depend on the stack sums.
#[derive(Debug, Clone)]
pub struct ChartArea {
    axes: IndexMap<AxisId, AxisModel>,
    series: Vec<SeriesModel>,
    strategies: IndexMap<AxisId, CombineStrategy>,
    view: ChartView,
    plot_area: Rect,
    axes_update_needed: bool,
}

impl Default for ChartArea {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartArea {
    #[must_use]
    pub fn new() -> Self {
        Self {
            axes: IndexMap::new(),
            series: Vec::new(),
            strategies: IndexMap::new(),
            view: ChartView::default(),
            plot_area: Rect::EMPTY,
            axes_update_needed: true,
        }
    }

    pub fn add_axis(&mut self, mut axis: AxisModel) -> AxisResult<()> {
        let id = axis.id();
        if self.axes.contains_key(&id) {
            return Err(AxisError::invalid("axis", format!("duplicate axis id {}", id.0)));
        }
        axis.set_view(self.view);
        self.axes.insert(id, axis);
        self.invalidate(InvalidationLevel::Full);
        Ok(())
    }

    pub fn remove_axis(&mut self, id: AxisId) -> Option<AxisModel> {
        let removed = self.axes.shift_remove(&id)?;
        self.invalidate(InvalidationLevel::Full);
        Some(removed)
    }

    pub fn add_series(&mut self, series: SeriesModel) -> AxisResult<()> {
        if self.series.iter().any(|known| known.id == series.id) {
            return Err(AxisError::invalid(
                "series",
                format!("duplicate series id {}", series.id.0),
            ));
        }
        self.series.push(series);
        self.invalidate(InvalidationLevel::Full);
        Ok(())
    }

    pub fn remove_series(&mut self, id: SeriesId) -> Option<SeriesModel> {
        let index = self.series.iter().position(|known| known.id == id)?;
        let removed = self.series.remove(index);
        self.invalidate(InvalidationLevel::Full);
        Some(removed)
    }

    #[must_use]
    pub fn axis(&self, id: AxisId) -> Option<&AxisModel> {
        self.axes.get(&id)
    }

    /// Mutable axis access; property changes are picked up by the next layout.
    pub fn axis_mut(&mut self, id: AxisId) -> Option<&mut AxisModel> {
        self.axes.get_mut(&id)
    }

    pub fn axes(&self) -> impl Iterator<Item = &AxisModel> {
        self.axes.values()
    }

    #[must_use]
    pub fn series(&self) -> &[SeriesModel] {
        &self.series
    }

    /// Mutable series access; the area is fully invalidated.
    pub fn series_mut(&mut self, id: SeriesId) -> Option<&mut SeriesModel> {
        let index = self.series.iter().position(|known| known.id == id)?;
        self.invalidate(InvalidationLevel::Full);
        self.series.get_mut(index)
    }

    #[must_use]
    pub fn combine_strategy(&self, stack_axis: AxisId) -> Option<&CombineStrategy> {
        self.strategies.get(&stack_axis)
    }

    #[must_use]
    pub fn view(&self) -> ChartView {
        self.view
    }

    pub fn set_view(&mut self, view: ChartView) {
        self.view = view;
        for axis in self.axes.values_mut() {
            axis.set_view(view);
        }
    }

    /// Plot area computed by the last `update_layout`.
    #[must_use]
    pub fn plot_area(&self) -> Rect {
        self.plot_area
    }

    pub fn invalidate(&mut self, level: InvalidationLevel) {
        match level {
            InvalidationLevel::Full => {
                for axis in self.axes.values_mut() {
                    axis.reset_state();
                }
                self.strategies.clear();
                self.axes_update_needed = true;
            }
            InvalidationLevel::Axes => {
                for axis in self.axes.values_mut() {
                    axis.invalidate_measure();
                }
            }
            InvalidationLevel::None => {}
        }
    }

    /// Runs a full layout pass and returns the resulting plot area.
    pub fn update_layout(
        &mut self,
        available: Size,
        presenter: Option<&dyn AxisPresenter>,
    ) -> AxisResult<Rect> {
        let pending = self
            .axes
            .values_mut()
            .fold(InvalidationLevel::None, |level, axis| {
                level.max(axis.take_invalidation())
            });
        self.invalidate(pending);

        if self.axes_update_needed {
            self.update_axes();
            self.axes_update_needed = false;
        }

        let available_rect = Rect::new(0.0, 0.0, available.width, available.height);
        let plot_area = self.arrange_axes(available_rect, presenter)?;

        for axis in self.axes.values_mut() {
            axis.apply_layout_rounding(axis.desired_arrange_rect());
            axis.update_ticks_visibility(plot_area);
        }
        self.plot_area = plot_area;

        debug!(
            axes = self.axes.len(),
            series = self.series.len(),
            x = plot_area.x,
            y = plot_area.y,
            width = plot_area.width,
            height = plot_area.height,
            "chart area laid out"
        );
        Ok(plot_area)
    }

    fn update_axes(&mut self) {
        if self.series.is_empty() {
            for axis in self.axes.values_mut() {
                axis.reset();
            }
            return;
        }

        let mut by_stack_axis: IndexMap<AxisId, Vec<&SeriesModel>> = IndexMap::new();
        let mut by_value_axis: IndexMap<AxisId, Vec<&SeriesModel>> = IndexMap::new();
        for model in &self.series {
            for axis_id in [model.category_axis, model.value_axis] {
                let Some(axis) = self.axes.get(&axis_id) else {
                    warn!(series = model.id.0, axis = axis_id.0, "series references an unknown axis");
                    continue;
                };
                let target = if axis.kind().supports_combined_plot() {
                    &mut by_stack_axis
                } else {
                    &mut by_value_axis
                };
                target.entry(axis_id).or_default().push(model);
            }
        }

        for (axis_id, series) in &by_stack_axis {
            let Some(stack_axis) = self.axes.get(axis_id) else {
                continue;
            };
            let axes = &self.axes;
            self.strategies
                .entry(*axis_id)
                .or_default()
                .update(series, stack_axis, |id| axes.get(&id));
            update_axis(&mut self.axes, &self.strategies, *axis_id, series.clone());
        }

        for (axis_id, series) in &by_value_axis {
            update_axis(&mut self.axes, &self.strategies, *axis_id, series.clone());
        }

        // axes no series points at still get a range
        let idle: Vec<AxisId> = self
            .axes
            .values()
            .filter(|axis| !axis.is_updated())
            .map(AxisModel::id)
            .collect();
        for axis_id in idle {
            update_axis(&mut self.axes, &self.strategies, axis_id, Vec::new());
        }
    }

    fn arrange_axes(
        &mut self,
        available: Rect,
        presenter: Option<&dyn AxisPresenter>,
    ) -> AxisResult<Rect> {
        let mut stacks = self.prepare_stacks(available.size(), presenter)?;
        let mut plot_area = plot_area_rect(available, &stacks);

        for pass in 0.. {
            if pass > MAX_ARRANGE_PASSES {
                warn!(passes = pass, "axis arrange did not settle");
                break;
            }

            let mut is_arrange_valid = true;
            for stack in &mut stacks {
                let mut edge = stack.side.start_edge(plot_area);
                for axis_id in &stack.axes {
                    let Some(axis) = self.axes.get_mut(axis_id) else {
                        continue;
                    };
                    let before = axis.desired_size();
                    let rect = stack.side.axis_rect(plot_area, edge, before);
                    edge = stack.side.next_edge(rect);
                    axis.arrange(presenter, rect)?;

                    let after = axis.desired_size();
                    if stack.side.is_vertical_axis() {
                        if after.width != before.width {
                            stack.desired_width += after.width - before.width;
                            is_arrange_valid = false;
                        }
                    } else if after.height != before.height {
                        stack.desired_height += after.height - before.height;
                        is_arrange_valid = false;
                    }
                }
            }

            if is_arrange_valid {
                break;
            }
            plot_area = plot_area_rect(available, &stacks);
            trace!(pass, "axis sizes changed during arrange");
        }

        Ok(plot_area)
    }

    fn prepare_stacks(
        &mut self,
        available: Size,
        presenter: Option<&dyn AxisPresenter>,
    ) -> AxisResult<[AxisStack; 4]> {
        let mut stacks = [
            AxisStack::new(StackSide::Left),
            AxisStack::new(StackSide::Top),
            AxisStack::new(StackSide::Right),
            AxisStack::new(StackSide::Bottom),
        ];

        for axis in self.axes.values() {
            let side = match axis.axis_type() {
                AxisType::Second => match axis.options().horizontal_location {
                    AxisHorizontalLocation::Left => StackSide::Left,
                    AxisHorizontalLocation::Right => StackSide::Right,
                },
                AxisType::First => match axis.options().vertical_location {
                    AxisVerticalLocation::Bottom => StackSide::Bottom,
                    AxisVerticalLocation::Top => StackSide::Top,
                },
            };
            if let Some(stack) = stacks.iter_mut().find(|stack| stack.side == side) {
                stack.axes.push(axis.id());
            }
        }

        for stack in &mut stacks {
            for axis_id in stack.axes.clone() {
                let Some(axis) = self.axes.get_mut(&axis_id) else {
                    continue;
                };
                axis.measure(presenter, available)?;
                stack.add_measured(axis.desired_size(), axis.desired_margin());
            }
        }
        Ok(stacks)
    }

    /// Data values under a plot-area point for the given horizontal and vertical axes.
    #[must_use]
    pub fn convert_point_to_data(
        &self,
        point: (f64, f64),
        first_axis: AxisId,
        second_axis: AxisId,
    ) -> (Option<AxisValue>, Option<AxisValue>) {
        let virtual_rect = self.virtual_plot_area();
        let pan_x = self.view.plot_origin_x * self.plot_area.width;
        let pan_y = self.view.plot_origin_y * self.plot_area.height;

        let first = self
            .axis_of_type(first_axis, AxisType::First)
            .and_then(|axis| axis.convert_physical_to_data(point.0 - pan_x, virtual_rect));
        let second = self
            .axis_of_type(second_axis, AxisType::Second)
            .and_then(|axis| axis.convert_physical_to_data(point.1 - pan_y, virtual_rect));
        (first, second)
    }

    /// Physical point of a data pair; `NaN` where an axis cannot place its value.
    #[must_use]
    pub fn convert_data_to_point(
        &self,
        data: (&AxisValue, &AxisValue),
        first_axis: AxisId,
        second_axis: AxisId,
    ) -> (f64, f64) {
        let virtual_rect = self.virtual_plot_area();

        let x = self
            .axis_of_type(first_axis, AxisType::First)
            .filter(|axis| axis.is_updated())
            .and_then(|axis| axis.create_plot_info(data.0))
            .map_or(f64::NAN, |info| {
                virtual_rect.x + info.normalized_position() * virtual_rect.width
            });
        let y = self
            .axis_of_type(second_axis, AxisType::Second)
            .filter(|axis| axis.is_updated())
            .and_then(|axis| axis.create_plot_info(data.1))
            .map_or(f64::NAN, |info| {
                virtual_rect.y + (1.0 - info.normalized_position()) * virtual_rect.height
            });
        (x, y)
    }

    fn axis_of_type(&self, id: AxisId, axis_type: AxisType) -> Option<&AxisModel> {
        self.axes
            .get(&id)
            .filter(|axis| axis.axis_type() == axis_type)
    }

    fn virtual_plot_area(&self) -> Rect {
        Rect::new(
            self.plot_area.x,
            self.plot_area.y,
            self.plot_area.width * self.view.zoom_width,
            self.plot_area.height * self.view.zoom_height,
        )
    }
}

fn update_axis(
    axes: &mut IndexMap<AxisId, AxisModel>,
    strategies: &IndexMap<AxisId, CombineStrategy>,
    axis_id: AxisId,
    series: Vec<&SeriesModel>,
) {
    let Some(axis) = axes.get_mut(&axis_id) else {
        return;
    };
    let context = StackAggregationContext::build(
        axis_id,
        axis.kind().carries_stack_values(),
        series,
        strategies.values(),
    );
    axis.update(&context);
    axis.plot(&context);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackSide {
    Left,
    Top,
    Right,
    Bottom,
}

impl StackSide {
    /// Left and right stacks hold vertical (`Second`) axes.
    fn is_vertical_axis(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    fn start_edge(self, plot_area: Rect) -> f64 {
        match self {
            Self::Left => plot_area.x,
            Self::Top => plot_area.y,
            Self::Right => plot_area.right(),
            Self::Bottom => plot_area.bottom(),
        }
    }

    /// Slot of the next axis; stacks grow away from the plot area.
    fn axis_rect(self, plot_area: Rect, edge: f64, desired: Size) -> Rect {
        match self {
            Self::Left => Rect::new(
                edge - desired.width,
                plot_area.y,
                desired.width,
                plot_area.height,
            ),
            Self::Top => Rect::new(
                plot_area.x,
                edge - desired.height,
                plot_area.width,
                desired.height,
            ),
            Self::Right => Rect::new(edge, plot_area.y, desired.width, plot_area.height),
            Self::Bottom => Rect::new(plot_area.x, edge, plot_area.width, desired.height),
        }
    }

    fn next_edge(self, rect: Rect) -> f64 {
        match self {
            Self::Left => rect.x,
            Self::Top => rect.y,
            Self::Right => rect.right(),
            Self::Bottom => rect.bottom(),
        }
    }
}

#[derive(Debug, Clone)]
struct AxisStack {
    side: StackSide,
    axes: Vec<AxisId>,
    desired_width: f64,
    desired_height: f64,
    desired_margin: Thickness,
}

impl AxisStack {
    fn new(side: StackSide) -> Self {
        Self {
            side,
            axes: Vec::new(),
            desired_width: 0.0,
            desired_height: 0.0,
            desired_margin: Thickness::default(),
        }
    }

    fn add_measured(&mut self, size: Size, margin: Thickness) {
        self.desired_width += size.width;
        self.desired_height += size.height;
        self.desired_margin.left = self.desired_margin.left.max(margin.left);
        self.desired_margin.top = self.desired_margin.top.max(margin.top);
        self.desired_margin.right = self.desired_margin.right.max(margin.right);
        self.desired_margin.bottom = self.desired_margin.bottom.max(margin.bottom);
    }
}

/// Plot rectangle left after reserving room for every stack and its margins.
fn plot_area_rect(available: Rect, stacks: &[AxisStack; 4]) -> Rect {
    let [left, top, right, bottom] = stacks;

    let x = (left.desired_width + left.desired_margin.left + left.desired_margin.right)
        .max(top.desired_margin.left.max(bottom.desired_margin.left));
    let y = (top.desired_height + top.desired_margin.top + top.desired_margin.bottom)
        .max(left.desired_margin.top.max(right.desired_margin.top));
    let right_edge = available.width
        - (right.desired_width + right.desired_margin.left + right.desired_margin.right)
            .max(top.desired_margin.right.max(bottom.desired_margin.right));
    let bottom_edge = available.height
        - (bottom.desired_height + bottom.desired_margin.top + bottom.desired_margin.bottom)
            .max(left.desired_margin.bottom.max(right.desired_margin.bottom));

    Rect::new(
        x.round(),
        y.round(),
        (right_edge - x).max(0.0).round(),
        (bottom_edge - y).max(0.0).round(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_area_reserves_stack_extents_and_margins() {
        let mut left = AxisStack::new(StackSide::Left);
        left.add_measured(Size::new(40.0, 0.0), Thickness::default());
        let top = AxisStack::new(StackSide::Top);
        let right = AxisStack::new(StackSide::Right);
        let mut bottom = AxisStack::new(StackSide::Bottom);
        bottom.add_measured(
            Size::new(0.0, 30.0),
            Thickness {
                right: 12.0,
                ..Thickness::default()
            },
        );

        let rect = plot_area_rect(
            Rect::new(0.0, 0.0, 400.0, 300.0),
            &[left, top, right, bottom],
        );
        assert_eq!(rect, Rect::new(40.0, 0.0, 348.0, 270.0));
    }

    #[test]
    fn stacks_grow_away_from_the_plot_area() {
        let plot = Rect::new(50.0, 10.0, 300.0, 200.0);
        let desired = Size::new(20.0, 15.0);
        assert_eq!(
            StackSide::Left.axis_rect(plot, plot.x, desired),
            Rect::new(30.0, 10.0, 20.0, 200.0)
        );
        assert_eq!(
            StackSide::Bottom.axis_rect(plot, plot.bottom(), desired),
            Rect::new(50.0, 210.0, 300.0, 15.0)
        );
        assert_eq!(StackSide::Top.next_edge(Rect::new(0.0, 5.0, 1.0, 1.0)), 5.0);
    }
}
