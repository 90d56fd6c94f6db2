use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::axis::label_format::{ContentFormatterFn, LabelFormat, LabelValue};
use crate::axis::tick::{AxisTick, backward_length, forward_length};
use crate::core::primitives::{decimal_is_one, decimal_to_f64};
use crate::core::{AxisPlotMode, Rect, Size};
use crate::error::AxisResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub content: String,
    pub value: LabelValue,
    pub normalized_position: f64,
    pub is_visible: bool,
    /// Index of the tick this label was generated for.
    pub tick_index: usize,
    /// Size used for layout; rotated bounds when labels are rotated.
    pub desired_size: Size,
    /// Size reported by the presenter.
    pub untransformed_desired_size: Size,
    pub layout_slot: Rect,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisTitle {
    pub content: Option<String>,
    pub desired_size: Size,
    pub layout_slot: Rect,
}

pub(crate) struct LabelPolicy<'a> {
    pub offset: usize,
    pub interval: usize,
    pub plot_mode: AxisPlotMode,
    pub is_inverse: bool,
    pub formatter: Option<&'a ContentFormatterFn>,
    pub format: Option<&'a LabelFormat>,
}

/// Builds labels for the major ticks of an already linked tick list.
///
/// Label indices are written back into `AxisTick::associated_label`.
pub(crate) fn generate_labels<F>(
    ticks: &mut [AxisTick],
    policy: &LabelPolicy<'_>,
    label_value: F,
) -> AxisResult<Vec<AxisLabel>>
where
    F: Fn(&AxisTick) -> LabelValue,
{
    let mut labels = Vec::new();
    let mut skipped = 0usize;
    let mut skip_count = 1usize;

    for index in 0..ticks.len() {
        if !ticks[index].is_major() {
            continue;
        }
        if skipped < policy.offset {
            skipped += 1;
            continue;
        }
        if skip_count > 1 {
            skip_count -= 1;
            continue;
        }

        let normalized = ticks[index].normalized_value;
        let edge = if policy.is_inverse {
            Decimal::ONE - normalized
        } else {
            normalized
        };
        // no segment follows the terminal tick
        if policy.plot_mode == AxisPlotMode::BetweenTicks && decimal_is_one(edge) {
            break;
        }

        let value = label_value(&ticks[index]);
        let content = match (policy.formatter, policy.format) {
            (Some(formatter), _) => formatter(&value)?,
            (None, Some(format)) => format.apply(&value),
            (None, None) => value.to_string(),
        };

        let position = if policy.plot_mode == AxisPlotMode::BetweenTicks {
            let mut length = forward_length(ticks, index);
            if length.is_zero() {
                length = backward_length(ticks, index);
            }
            normalized + length / Decimal::TWO
        } else {
            normalized
        };

        ticks[index].associated_label = Some(labels.len());
        labels.push(AxisLabel {
            content,
            value,
            normalized_position: decimal_to_f64(position),
            is_visible: true,
            tick_index: index,
            desired_size: Size::EMPTY,
            untransformed_desired_size: Size::EMPTY,
            layout_slot: Rect::EMPTY,
        });

        skip_count = policy.interval;
    }

    Ok(labels)
}
