use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TickType {
    #[default]
    Major,
    Minor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TickPosition {
    First,
    #[default]
    Inner,
    Last,
}

/// One marked position along an axis.
///
/// `previous`/`next` are indices into the owning tick list and
/// `associated_label` indexes the label list of the same axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    /// Domain value; the meaning depends on the axis kind.
    pub value: Decimal,
    pub normalized_value: Decimal,
    pub tick_type: TickType,
    pub position: TickPosition,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub virtual_index: usize,
    pub associated_label: Option<usize>,
    pub layout_slot: Rect,
    pub is_visible: bool,
}

impl AxisTick {
    #[must_use]
    pub fn major(value: Decimal, normalized_value: Decimal) -> Self {
        Self {
            value,
            normalized_value,
            tick_type: TickType::Major,
            position: TickPosition::Inner,
            previous: None,
            next: None,
            virtual_index: 0,
            associated_label: None,
            layout_slot: Rect::EMPTY,
            is_visible: true,
        }
    }

    #[must_use]
    pub fn minor(value: Decimal, normalized_value: Decimal) -> Self {
        Self {
            tick_type: TickType::Minor,
            ..Self::major(value, normalized_value)
        }
    }

    #[must_use]
    pub fn with_virtual_index(mut self, virtual_index: usize) -> Self {
        self.virtual_index = virtual_index;
        self
    }

    #[must_use]
    pub fn is_major(&self) -> bool {
        self.tick_type == TickType::Major
    }

    #[must_use]
    pub fn normalized_f64(&self) -> f64 {
        crate::core::primitives::decimal_to_f64(self.normalized_value)
    }
}

/// Normalized gap to the next tick in `ticks`, zero for the last one.
#[must_use]
pub fn forward_length(ticks: &[AxisTick], index: usize) -> Decimal {
    let tick = &ticks[index];
    tick.next
        .map_or(Decimal::ZERO, |next| ticks[next].normalized_value - tick.normalized_value)
}

/// Normalized gap to the previous tick in `ticks`, zero for the first one.
#[must_use]
pub fn backward_length(ticks: &[AxisTick], index: usize) -> Decimal {
    let tick = &ticks[index];
    tick.previous.map_or(Decimal::ZERO, |previous| {
        tick.normalized_value - ticks[previous].normalized_value
    })
}

/// Links, offsets and marks generated ticks the way an axis stores them.
///
/// The first `major_tick_offset` major ticks are dropped together with the
/// minor ticks preceding them. Returns the kept ticks and their major count.
#[must_use]
pub fn link_ticks(
    generated: impl IntoIterator<Item = AxisTick>,
    major_tick_offset: usize,
) -> (Vec<AxisTick>, usize) {
    let mut ticks: Vec<AxisTick> = Vec::new();
    let mut skipped_majors = 0usize;
    let mut major_count = 0usize;

    for mut tick in generated {
        if skipped_majors < major_tick_offset {
            if tick.is_major() {
                skipped_majors += 1;
            }
            continue;
        }

        let index = ticks.len();
        tick.position = TickPosition::Inner;
        tick.previous = index.checked_sub(1);
        tick.next = None;
        tick.associated_label = None;
        if let Some(previous) = ticks.last_mut() {
            previous.next = Some(index);
        }
        if tick.is_major() {
            major_count += 1;
        }
        ticks.push(tick);
    }

    if let Some(first) = ticks.first_mut() {
        first.position = TickPosition::First;
    }
    if ticks.len() > 1 {
        if let Some(last) = ticks.last_mut() {
            last.position = TickPosition::Last;
        }
    }

    (ticks, major_count)
}
