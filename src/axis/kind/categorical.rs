use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{KindEnv, MAX_GENERATED_TICKS, visible_window};
use crate::axis::label_format::LabelValue;
use crate::axis::layout::reflect;
use crate::axis::plot_info::AxisPlotInfo;
use crate::axis::stack_context::StackAggregationContext;
use crate::axis::tick::AxisTick;
use crate::core::primitives::decimals_are_close;
use crate::core::{
    AxisId, AxisPlotMode, CategoryKey, DataPoint, PointRef, SeriesModel, ValueRange,
    select_plot_mode,
};

pub const DEFAULT_GAP_LENGTH: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoricalOptions {
    pub gap_length: f64,
    /// `None` lets the attached series decide.
    pub plot_mode: Option<AxisPlotMode>,
    pub major_tick_interval: usize,
    pub auto_group: bool,
}

impl Default for CategoricalOptions {
    fn default() -> Self {
        Self {
            gap_length: DEFAULT_GAP_LENGTH,
            plot_mode: None,
            major_tick_interval: 1,
            auto_group: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisCategory {
    pub key: CategoryKey,
    pub points: Vec<PointRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalAxis {
    options: CategoricalOptions,
    categories: Vec<AxisCategory>,
    actual_plot_mode: AxisPlotMode,
}

impl Default for CategoricalAxis {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoricalAxis {
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: CategoricalOptions::default(),
            categories: Vec::new(),
            actual_plot_mode: AxisPlotMode::BetweenTicks,
        }
    }

    #[must_use]
    pub fn options(&self) -> &CategoricalOptions {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut CategoricalOptions {
        &mut self.options
    }

    #[must_use]
    pub fn categories(&self) -> &[AxisCategory] {
        &self.categories
    }

    #[must_use]
    pub fn actual_plot_mode(&self) -> AxisPlotMode {
        self.actual_plot_mode
    }

    pub(crate) fn reset(&mut self) {
        self.categories.clear();
    }

    /// Key a point is grouped under: its category, else its one-based index.
    #[must_use]
    pub fn category_key(series: &SeriesModel, point: &DataPoint, axis: AxisId) -> Option<CategoryKey> {
        match series.value_for_axis(point, axis) {
            Some(value) => value.category_key(),
            None => Some(CategoryKey::Index(point.collection_index + 1)),
        }
    }

    /// Major tick interval reduced proportionally to the zoom factor.
    #[must_use]
    pub fn major_tick_interval(&self, zoom: f64) -> usize {
        let scale = (zoom + 0.5) as usize;
        (self.options.major_tick_interval / scale.max(1)).max(1)
    }

    fn relative_step(&self, count: usize) -> f64 {
        match self.actual_plot_mode {
            AxisPlotMode::BetweenTicks | AxisPlotMode::OnTicksPadded => 1.0 / count as f64,
            AxisPlotMode::OnTicks if count == 1 => 1.0,
            AxisPlotMode::OnTicks => 1.0 / (count - 1) as f64,
        }
    }

    pub(crate) fn update_core(&mut self, context: &StackAggregationContext<'_>) {
        self.actual_plot_mode = match self.options.plot_mode {
            Some(plot_mode) => plot_mode,
            None => select_plot_mode(context.series.iter().copied()),
        };

        self.categories.clear();
        let mut by_key: IndexMap<CategoryKey, usize> = IndexMap::new();

        for model in context.series.iter().filter(|model| model.is_visible) {
            for (index, point) in model.points().iter().enumerate() {
                let Some(key) = Self::category_key(model, point, context.axis) else {
                    continue;
                };

                let category = if self.options.auto_group {
                    *by_key.entry(key.clone()).or_insert_with(|| {
                        self.categories.push(AxisCategory {
                            key,
                            points: Vec::new(),
                        });
                        self.categories.len() - 1
                    })
                } else {
                    self.categories.push(AxisCategory {
                        key,
                        points: Vec::new(),
                    });
                    self.categories.len() - 1
                };
                self.categories[category].points.push(model.point_ref(index));
            }
        }

        trace!(
            axis = context.axis.0,
            categories = self.categories.len(),
            plot_mode = ?self.actual_plot_mode,
            "categories rebuilt"
        );
    }

    pub(crate) fn plot_core(&self, env: &KindEnv, plot_infos: &mut IndexMap<PointRef, AxisPlotInfo>) {
        let count = self.categories.len();
        if count == 0 {
            return;
        }

        let step = self.relative_step(count);
        let length = step - self.options.gap_length * step;
        let offset = self.slot_offset(step);

        let mut value = 0.0;
        for category in &self.categories {
            let position = if env.is_inverse {
                1.0 - value - offset
            } else {
                value + offset
            };
            for point in &category.points {
                plot_infos.insert(
                    *point,
                    AxisPlotInfo::Categorical {
                        category_key: category.key.clone(),
                        value,
                        position,
                        length,
                    },
                );
            }
            value += step;
        }
    }

    fn slot_offset(&self, step: f64) -> f64 {
        if self.actual_plot_mode == AxisPlotMode::OnTicks {
            0.0
        } else {
            step / 2.0
        }
    }

    pub(crate) fn generate_ticks(
        &self,
        visible_range: ValueRange<Decimal>,
        env: &KindEnv,
    ) -> Vec<AxisTick> {
        let category_count = self.categories.len();
        if category_count == 0 {
            return Vec::new();
        }

        let tick_interval = self.major_tick_interval(env.zoom);
        let tick_count = if self.actual_plot_mode == AxisPlotMode::OnTicks {
            category_count
        } else {
            category_count + 1
        };
        let tick_step = if tick_count == 1 {
            Decimal::ONE
        } else {
            Decimal::ONE / Decimal::from(tick_count - 1)
        };

        // widen the window to whole category steps
        let widened = ValueRange::new(
            visible_range.minimum - visible_range.minimum % tick_step,
            visible_range.maximum + tick_step - visible_range.maximum % tick_step,
        );
        let (mut start, end) = visible_window(widened, env.is_inverse);
        if self.actual_plot_mode == AxisPlotMode::OnTicksPadded {
            start = tick_step / Decimal::TWO;
        }

        let mut virtual_index = (start / tick_step).round_dp(10).trunc().to_usize().unwrap_or(0);
        let mut current = start;
        let mut empty_ticks = 0usize;
        let mut ticks = Vec::new();

        while (current < end || decimals_are_close(current, end)) && ticks.len() < MAX_GENERATED_TICKS {
            if empty_ticks == 0 {
                ticks.push(
                    AxisTick::major(current, reflect(current, env.is_inverse))
                        .with_virtual_index(virtual_index),
                );
                empty_ticks = tick_interval - 1;
            } else {
                empty_ticks -= 1;
            }
            current += tick_step;
            virtual_index += 1;
        }
        ticks
    }

    pub(crate) fn label_value(&self, tick: &AxisTick) -> LabelValue {
        self.categories
            .get(tick.virtual_index)
            .map_or(LabelValue::Empty, |category| {
                LabelValue::Category(category.key.clone())
            })
    }

    /// Plot info for a category key, if the axis knows it.
    #[must_use]
    pub fn create_plot_info(&self, key: &CategoryKey, is_inverse: bool) -> Option<AxisPlotInfo> {
        let index = self.categories.iter().position(|category| &category.key == key)?;
        let step = self.relative_step(self.categories.len());
        let value = index as f64 * step;
        let offset = self.slot_offset(step);
        Some(AxisPlotInfo::Categorical {
            category_key: key.clone(),
            value,
            position: if is_inverse {
                1.0 - value - offset
            } else {
                value + offset
            },
            length: step - self.options.gap_length * step,
        })
    }

    /// Offset applied to relative positions before picking a category.
    pub(crate) fn physical_step_offset(&self) -> f64 {
        if self.categories.is_empty() || self.actual_plot_mode != AxisPlotMode::OnTicks {
            return 0.0;
        }
        0.5 * self.relative_step(self.categories.len())
    }

    /// Category covering a relative position computed with `physical_step_offset`.
    #[must_use]
    pub fn category_at(&self, relative_position: f64) -> Option<&CategoryKey> {
        let count = self.categories.len();
        if count == 0 {
            return None;
        }
        let index = (relative_position / self.relative_step(count)).trunc();
        if index < 0.0 || index > (count - 1) as f64 {
            return None;
        }
        self.categories.get(index as usize).map(|category| &category.key)
    }
}
