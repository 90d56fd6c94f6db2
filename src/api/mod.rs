mod chart_area;
mod invalidation;
mod snapshot;

pub use chart_area::ChartArea;
pub use invalidation::InvalidationLevel;
pub use snapshot::{
    AXIS_SNAPSHOT_JSON_SCHEMA_V1, AxisSnapshot, AxisSnapshotJsonContractV1,
    CHART_AREA_SNAPSHOT_JSON_SCHEMA_V1, ChartAreaSnapshot, ChartAreaSnapshotJsonContractV1,
};
