use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::axis::{AxisKindTag, AxisLabel, AxisModel, AxisPlotInfo, AxisTick, ChartView};
use crate::core::{AxisId, AxisType, CategoryKey, PointRef, Rect, Size, Thickness, ValueRange};
use crate::error::{AxisError, AxisResult};

use super::ChartArea;

pub const AXIS_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;
pub const CHART_AREA_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Serializable deterministic axis state used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSnapshot {
    pub id: AxisId,
    pub axis_type: AxisType,
    pub kind: AxisKindTag,
    pub visible_range: ValueRange<Decimal>,
    pub numerical_range: Option<ValueRange<f64>>,
    pub date_time_range: Option<ValueRange<DateTime<Utc>>>,
    pub categories: Vec<CategoryKey>,
    pub major_tick_count: usize,
    pub ticks: Vec<AxisTick>,
    pub labels: Vec<AxisLabel>,
    pub desired_size: Size,
    pub desired_margin: Thickness,
    pub arrange_rect: Rect,
    /// Ordered like the plot pass visited the points.
    pub plot_infos: Vec<(PointRef, AxisPlotInfo)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartAreaSnapshot {
    pub plot_area: Rect,
    pub view: ChartView,
    pub axes: Vec<AxisSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: AxisSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartAreaSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: ChartAreaSnapshot,
}

impl AxisModel {
    #[must_use]
    pub fn snapshot(&self) -> AxisSnapshot {
        AxisSnapshot {
            id: self.id(),
            axis_type: self.axis_type(),
            kind: self.kind_tag(),
            visible_range: self.visible_range(),
            numerical_range: self.numerical().map(|axis| axis.actual_range()),
            date_time_range: self.date_time_axis().and_then(|axis| axis.actual_range()),
            categories: self
                .categorical_axis()
                .map(|axis| {
                    axis.categories()
                        .iter()
                        .map(|category| category.key.clone())
                        .collect()
                })
                .unwrap_or_default(),
            major_tick_count: self.major_tick_count(),
            ticks: self.ticks().to_vec(),
            labels: self.labels().to_vec(),
            desired_size: self.desired_size(),
            desired_margin: self.desired_margin(),
            arrange_rect: self.desired_arrange_rect(),
            plot_infos: self
                .plot_infos()
                .iter()
                .map(|(point, info)| (*point, info.clone()))
                .collect(),
        }
    }
}

impl ChartArea {
    #[must_use]
    pub fn snapshot(&self) -> ChartAreaSnapshot {
        ChartAreaSnapshot {
            plot_area: self.plot_area(),
            view: self.view(),
            axes: self.axes().map(AxisModel::snapshot).collect(),
        }
    }
}

impl AxisSnapshot {
    pub fn to_json_pretty(&self) -> AxisResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            AxisError::Serialization(format!("failed to serialize axis snapshot: {e}"))
        })
    }

    pub fn to_json_contract_v1_pretty(&self) -> AxisResult<String> {
        let payload = AxisSnapshotJsonContractV1 {
            schema_version: AXIS_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            AxisError::Serialization(format!("failed to serialize axis snapshot contract v1: {e}"))
        })
    }

    /// Accepts both a bare snapshot and a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> AxisResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<AxisSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: AxisSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            AxisError::Serialization(format!("failed to parse axis snapshot json payload: {e}"))
        })?;
        if payload.schema_version != AXIS_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(AxisError::Serialization(format!(
                "unsupported axis snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

impl ChartAreaSnapshot {
    pub fn to_json_pretty(&self) -> AxisResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            AxisError::Serialization(format!("failed to serialize chart area snapshot: {e}"))
        })
    }

    pub fn to_json_contract_v1_pretty(&self) -> AxisResult<String> {
        let payload = ChartAreaSnapshotJsonContractV1 {
            schema_version: CHART_AREA_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            AxisError::Serialization(format!(
                "failed to serialize chart area snapshot contract v1: {e}"
            ))
        })
    }

    pub fn from_json_compat_str(input: &str) -> AxisResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<ChartAreaSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: ChartAreaSnapshotJsonContractV1 =
            serde_json::from_str(input).map_err(|e| {
                AxisError::Serialization(format!(
                    "failed to parse chart area snapshot json payload: {e}"
                ))
            })?;
        if payload.schema_version != CHART_AREA_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(AxisError::Serialization(format!(
                "unsupported chart area snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}
