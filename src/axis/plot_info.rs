use serde::{Deserialize, Serialize};

use crate::core::CategoryKey;

/// Normalized placement of one data point along an axis.
///
/// Numerical variants are expressed relative to the plot origin so bars can
/// grow from it; snap indices point at the major tick the value sits on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxisPlotInfo {
    Numerical {
        normalized_value: f64,
        normalized_origin: f64,
        plot_origin_offset: f64,
        snap_tick_index: Option<usize>,
    },
    NumericalRange {
        normalized_low: f64,
        normalized_high: f64,
        normalized_origin: f64,
        snap_tick_index: Option<usize>,
        snap_base_tick_index: Option<usize>,
    },
    Ohlc {
        normalized_open: f64,
        normalized_high: f64,
        normalized_low: f64,
        normalized_close: f64,
        normalized_origin: f64,
        snap_open_tick_index: Option<usize>,
        snap_close_tick_index: Option<usize>,
    },
    Categorical {
        category_key: CategoryKey,
        /// Start of the slot, before inverse reflection.
        value: f64,
        /// Slot center in normalized space.
        position: f64,
        length: f64,
    },
}

impl AxisPlotInfo {
    /// Primary normalized coordinate of the point.
    #[must_use]
    pub fn normalized_position(&self) -> f64 {
        match self {
            Self::Numerical {
                normalized_value, ..
            } => *normalized_value,
            Self::NumericalRange {
                normalized_high, ..
            } => *normalized_high,
            Self::Ohlc {
                normalized_close, ..
            } => *normalized_close,
            Self::Categorical { position, .. } => *position,
        }
    }

    #[must_use]
    pub fn snap_tick_index(&self) -> Option<usize> {
        match self {
            Self::Numerical {
                snap_tick_index, ..
            }
            | Self::NumericalRange {
                snap_tick_index, ..
            } => *snap_tick_index,
            Self::Ohlc {
                snap_close_tick_index,
                ..
            } => *snap_close_tick_index,
            Self::Categorical { .. } => None,
        }
    }
}
