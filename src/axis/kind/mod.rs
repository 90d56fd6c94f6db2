pub mod categorical;
pub mod date_time;
pub mod numerical;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::axis::label_format::{LabelFormat, LabelValue};
use crate::axis::plot_info::AxisPlotInfo;
use crate::axis::stack_context::StackAggregationContext;
use crate::axis::tick::AxisTick;
use crate::combine::StackSums;
use crate::core::{
    AxisId, AxisPlotMode, AxisValue, CategoryKey, DataPoint, PointRef, SeriesModel, ValueRange,
};

pub use categorical::{AxisCategory, CategoricalAxis, CategoricalOptions};
pub use date_time::{DateTimeAxis, DateTimeOptions, TimeSlot};
pub use numerical::{NumericalAxis, NumericalOptions, NumericalScale, StackSumValue};

/// Upper bound on ticks produced by one generation pass.
pub(crate) const MAX_GENERATED_TICKS: usize = 10_000;

/// Axis-level inputs every kind needs during a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct KindEnv {
    pub axis: AxisId,
    pub is_inverse: bool,
    pub zoom: f64,
}

/// Clamps a visible range to `[0, 1]`, mirrored when the axis is inverse.
pub(crate) fn visible_window(
    visible_range: ValueRange<Decimal>,
    is_inverse: bool,
) -> (Decimal, Decimal) {
    if is_inverse {
        (
            (Decimal::ONE - visible_range.maximum).max(Decimal::ZERO),
            (Decimal::ONE - visible_range.minimum).min(Decimal::ONE),
        )
    } else {
        (
            visible_range.minimum.max(Decimal::ZERO),
            visible_range.maximum.min(Decimal::ONE),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisKindTag {
    Linear,
    Logarithmic,
    DateTime,
    Categorical,
}

/// Domain-specific half of an axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisKind {
    Numerical(NumericalAxis),
    DateTime(DateTimeAxis),
    Categorical(CategoricalAxis),
}

impl AxisKind {
    #[must_use]
    pub fn tag(&self) -> AxisKindTag {
        match self {
            Self::Numerical(axis) if axis.scale().is_logarithmic() => AxisKindTag::Logarithmic,
            Self::Numerical(_) => AxisKindTag::Linear,
            Self::DateTime(_) => AxisKindTag::DateTime,
            Self::Categorical(_) => AxisKindTag::Categorical,
        }
    }

    /// Whether the axis can act as the stack axis of combined series.
    #[must_use]
    pub fn supports_combined_plot(&self) -> bool {
        !matches!(self, Self::Numerical(_))
    }

    /// Whether stacked series accumulate their values on this axis.
    #[must_use]
    pub fn carries_stack_values(&self) -> bool {
        matches!(self, Self::Numerical(_))
    }

    #[must_use]
    pub fn actual_plot_mode(&self) -> AxisPlotMode {
        match self {
            Self::Numerical(_) => AxisPlotMode::OnTicks,
            Self::DateTime(axis) => axis.actual_plot_mode(),
            Self::Categorical(axis) => axis.actual_plot_mode(),
        }
    }

    pub(crate) fn update_core(&mut self, context: &StackAggregationContext<'_>, env: &KindEnv) {
        match self {
            Self::Numerical(axis) => axis.update_core(context),
            Self::DateTime(axis) => axis.update_core(context, env),
            Self::Categorical(axis) => axis.update_core(context),
        }
    }

    pub(crate) fn plot_core(
        &self,
        context: &StackAggregationContext<'_>,
        env: &KindEnv,
        plot_infos: &mut IndexMap<PointRef, AxisPlotInfo>,
    ) {
        match self {
            Self::Numerical(axis) => axis.plot_core(context, env, plot_infos),
            Self::DateTime(axis) => axis.plot_core(env, plot_infos),
            Self::Categorical(axis) => axis.plot_core(env, plot_infos),
        }
    }

    pub(crate) fn generate_ticks(
        &mut self,
        visible_range: ValueRange<Decimal>,
        env: &KindEnv,
    ) -> Vec<AxisTick> {
        match self {
            Self::Numerical(axis) => axis.generate_ticks(visible_range, env),
            Self::DateTime(axis) => axis.generate_ticks(visible_range, env),
            Self::Categorical(axis) => axis.generate_ticks(visible_range, env),
        }
    }

    pub(crate) fn label_value(&self, tick: &AxisTick) -> LabelValue {
        match self {
            Self::Numerical(_) => NumericalAxis::label_value(tick),
            Self::DateTime(_) => DateTimeAxis::label_value(tick),
            Self::Categorical(axis) => axis.label_value(tick),
        }
    }

    /// Format used when neither a formatter nor a format string is set.
    pub(crate) fn default_label_format(&self) -> Option<LabelFormat> {
        match self {
            Self::Numerical(axis) => Some(axis.default_label_format()),
            Self::DateTime(axis) => Some(axis.default_label_format()),
            Self::Categorical(_) => None,
        }
    }

    /// Returns `true` when plot infos must be recomputed.
    pub(crate) fn on_zoom_changed(&mut self, zoom: f64) -> bool {
        match self {
            Self::Numerical(axis) => {
                axis.on_zoom_changed(zoom);
                false
            }
            Self::DateTime(axis) => axis.on_zoom_changed(zoom),
            Self::Categorical(_) => false,
        }
    }

    pub(crate) fn reset_state(&mut self) {
        match self {
            Self::Numerical(axis) => axis.reset_state(),
            Self::DateTime(axis) => axis.reset_state(),
            Self::Categorical(_) => {}
        }
    }

    pub(crate) fn reset(&mut self) {
        self.reset_state();
        match self {
            Self::DateTime(axis) => axis.reset(),
            Self::Categorical(axis) => axis.reset(),
            Self::Numerical(_) => {}
        }
    }

    /// Key grouping points into stacks when this axis is the stack axis.
    #[must_use]
    pub fn combine_group_key(
        &self,
        axis: AxisId,
        series: &SeriesModel,
        point: &DataPoint,
    ) -> Option<CategoryKey> {
        match self {
            Self::Numerical(_) => Some(CategoryKey::Index(point.collection_index + 1)),
            Self::DateTime(_) | Self::Categorical(_) => {
                CategoricalAxis::category_key(series, point, axis)
            }
        }
    }

    pub(crate) fn stack_sum_value(
        &self,
        value: Option<&AxisValue>,
        sums: &mut StackSums,
    ) -> Option<StackSumValue> {
        match self {
            Self::Numerical(axis) => axis.stack_sum_value(value, sums),
            Self::DateTime(_) | Self::Categorical(_) => None,
        }
    }

    /// Step offset applied before mapping a coordinate back to data.
    pub(crate) fn physical_step_offset(&self) -> f64 {
        match self {
            Self::Categorical(axis) => axis.physical_step_offset(),
            Self::Numerical(_) | Self::DateTime(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_window_clamps_and_mirrors() {
        let range = ValueRange::new(Decimal::new(-2, 1), Decimal::new(6, 1));
        assert_eq!(
            visible_window(range, false),
            (Decimal::ZERO, Decimal::new(6, 1))
        );
        assert_eq!(
            visible_window(range, true),
            (Decimal::new(4, 1), Decimal::ONE)
        );
    }

    #[test]
    fn only_numerical_axes_carry_stack_values() {
        let linear = AxisKind::Numerical(NumericalAxis::new(NumericalScale::Linear));
        let categorical = AxisKind::Categorical(CategoricalAxis::new());
        assert!(linear.carries_stack_values());
        assert!(!linear.supports_combined_plot());
        assert!(categorical.supports_combined_plot());
        assert_eq!(categorical.tag(), AxisKindTag::Categorical);
    }
}
