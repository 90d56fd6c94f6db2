use std::fmt;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::types::{AxisId, AxisPlotMode, CombineMode, SeriesId};

/// Hashable category identity used for grouping and stacking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryKey {
    Text(String),
    Number(OrderedFloat<f64>),
    DateTime(DateTime<Utc>),
    /// One-based position of a point without a category value.
    Index(usize),
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => write!(f, "{}", value.0),
            Self::DateTime(time) => write!(f, "{}", time.format("%Y-%m-%d %H:%M:%S")),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for CategoryKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CategoryKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CategoryKey {
    fn from(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }
}

/// Per-point value as seen by one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxisValue {
    Number(f64),
    Range {
        low: f64,
        high: f64,
    },
    Ohlc {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
    DateTime(DateTime<Utc>),
    Category(CategoryKey),
}

impl AxisValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(time) => Some(*time),
            _ => None,
        }
    }

    /// Key this value contributes when it is used as a category.
    #[must_use]
    pub fn category_key(&self) -> Option<CategoryKey> {
        match self {
            Self::Category(key) => Some(key.clone()),
            Self::Number(value) if value.is_finite() => Some(CategoryKey::from(*value)),
            Self::DateTime(time) => Some(CategoryKey::DateTime(*time)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub category: Option<AxisValue>,
    pub value: Option<AxisValue>,
    pub collection_index: usize,
}

impl DataPoint {
    #[must_use]
    pub fn new(category: Option<AxisValue>, value: Option<AxisValue>) -> Self {
        Self {
            category,
            value,
            collection_index: 0,
        }
    }

    #[must_use]
    pub fn numeric(category: impl Into<CategoryKey>, value: f64) -> Self {
        Self::new(
            Some(AxisValue::Category(category.into())),
            Some(AxisValue::Number(value)),
        )
    }

    #[must_use]
    pub fn timed(time: DateTime<Utc>, value: f64) -> Self {
        Self::new(
            Some(AxisValue::DateTime(time)),
            Some(AxisValue::Number(value)),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// Identifies a point inside the series set of a chart area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointRef {
    pub series: SeriesId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesModel {
    pub id: SeriesId,
    pub is_visible: bool,
    pub combine_mode: CombineMode,
    pub stack_group: Option<String>,
    pub default_plot_mode: AxisPlotMode,
    /// Axis carrying the point categories (or timestamps).
    pub category_axis: AxisId,
    /// Axis carrying the point values.
    pub value_axis: AxisId,
    points: Vec<DataPoint>,
}

impl SeriesModel {
    #[must_use]
    pub fn new(id: SeriesId, category_axis: AxisId, value_axis: AxisId) -> Self {
        Self {
            id,
            is_visible: true,
            combine_mode: CombineMode::None,
            stack_group: None,
            default_plot_mode: AxisPlotMode::OnTicks,
            category_axis,
            value_axis,
            points: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_combine_mode(mut self, combine_mode: CombineMode) -> Self {
        self.combine_mode = combine_mode;
        self
    }

    #[must_use]
    pub fn with_stack_group(mut self, stack_group: impl Into<String>) -> Self {
        self.stack_group = Some(stack_group.into());
        self
    }

    #[must_use]
    pub fn with_default_plot_mode(mut self, plot_mode: AxisPlotMode) -> Self {
        self.default_plot_mode = plot_mode;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, is_visible: bool) -> Self {
        self.is_visible = is_visible;
        self
    }

    #[must_use]
    pub fn with_points(mut self, points: impl IntoIterator<Item = DataPoint>) -> Self {
        self.set_points(points);
        self
    }

    pub fn set_points(&mut self, points: impl IntoIterator<Item = DataPoint>) {
        self.points = points
            .into_iter()
            .enumerate()
            .map(|(index, mut point)| {
                point.collection_index = index;
                point
            })
            .collect();
    }

    pub fn push_point(&mut self, mut point: DataPoint) {
        point.collection_index = self.points.len();
        self.points.push(point);
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn point_ref(&self, index: usize) -> PointRef {
        PointRef {
            series: self.id,
            index,
        }
    }

    #[must_use]
    pub fn uses_axis(&self, axis: AxisId) -> bool {
        self.category_axis == axis || self.value_axis == axis
    }

    /// The value a point exposes to `axis`, if the series is attached to it.
    #[must_use]
    pub fn value_for_axis<'a>(&self, point: &'a DataPoint, axis: AxisId) -> Option<&'a AxisValue> {
        if self.value_axis == axis {
            point.value.as_ref()
        } else if self.category_axis == axis {
            point.category.as_ref()
        } else {
            None
        }
    }

    /// The axis opposite to `axis` for this series.
    #[must_use]
    pub fn other_axis(&self, axis: AxisId) -> AxisId {
        if self.category_axis == axis {
            self.value_axis
        } else {
            self.category_axis
        }
    }
}

/// Plot mode requested by a set of series: between-ticks wins, then padded.
#[must_use]
pub fn select_plot_mode<'a>(series: impl IntoIterator<Item = &'a SeriesModel>) -> AxisPlotMode {
    let mut mode = AxisPlotMode::OnTicks;
    for model in series {
        match model.default_plot_mode {
            AxisPlotMode::BetweenTicks => return AxisPlotMode::BetweenTicks,
            AxisPlotMode::OnTicksPadded => mode = AxisPlotMode::OnTicksPadded,
            AxisPlotMode::OnTicks => {}
        }
    }
    mode
}
