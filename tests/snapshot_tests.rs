use chart_axis::api::{
    AXIS_SNAPSHOT_JSON_SCHEMA_V1, AxisSnapshotJsonContractV1, CHART_AREA_SNAPSHOT_JSON_SCHEMA_V1,
};
use chart_axis::axis::AxisKindTag;
use chart_axis::core::{
    AxisId, AxisPlotMode, AxisType, CategoryKey, DataPoint, SeriesId, SeriesModel, Size,
};
use chart_axis::{AxisError, AxisModel, AxisSnapshot, ChartArea, ChartAreaSnapshot, NullPresenter};

fn laid_out_chart() -> ChartArea {
    let mut value_axis = AxisModel::linear(AxisId(1), AxisType::Second);
    value_axis
        .set_numerical_range(Some(0.0), Some(100.0))
        .expect("valid range");
    value_axis.set_major_step(25.0).expect("valid step");

    let mut area = ChartArea::new();
    area.add_axis(AxisModel::categorical(AxisId(0), AxisType::First))
        .expect("category axis");
    area.add_axis(value_axis).expect("value axis");
    area.add_series(
        SeriesModel::new(SeriesId(7), AxisId(0), AxisId(1))
            .with_default_plot_mode(AxisPlotMode::BetweenTicks)
            .with_points([
                DataPoint::numeric("north", 25.0),
                DataPoint::numeric("south", 50.0),
            ]),
    )
    .expect("series");
    area.update_layout(Size::new(320.0, 240.0), Some(&NullPresenter::default()))
        .expect("layout");
    area
}

#[test]
fn axis_snapshot_captures_ticks_labels_and_plot_infos() {
    let area = laid_out_chart();
    let snapshot = area.axis(AxisId(0)).expect("category axis").snapshot();

    assert_eq!(snapshot.kind, AxisKindTag::Categorical);
    assert_eq!(
        snapshot.categories,
        vec![CategoryKey::from("north"), CategoryKey::from("south")]
    );
    assert_eq!(snapshot.ticks.len(), 3);
    assert_eq!(snapshot.labels.len(), 2);
    assert_eq!(snapshot.plot_infos.len(), 2);
    assert_eq!(snapshot.plot_infos[0].0.series, SeriesId(7));
    assert!(snapshot.numerical_range.is_none());

    let value_snapshot = area.axis(AxisId(1)).expect("value axis").snapshot();
    assert_eq!(value_snapshot.kind, AxisKindTag::Linear);
    assert!(value_snapshot.numerical_range.is_some());
    assert_eq!(value_snapshot.major_tick_count, 5);
}

#[test]
fn axis_snapshot_contract_round_trips() {
    let area = laid_out_chart();
    let snapshot = area.axis(AxisId(1)).expect("value axis").snapshot();

    let json = snapshot
        .to_json_contract_v1_pretty()
        .expect("contract should serialize");
    let payload: AxisSnapshotJsonContractV1 =
        serde_json::from_str(&json).expect("contract should parse");
    assert_eq!(payload.schema_version, AXIS_SNAPSHOT_JSON_SCHEMA_V1);

    let restored = AxisSnapshot::from_json_compat_str(&json).expect("compat parse");
    assert_eq!(restored.id, snapshot.id);
    let values = |snapshot: &AxisSnapshot| {
        snapshot
            .ticks
            .iter()
            .map(|tick| (tick.value, tick.normalized_value))
            .collect::<Vec<_>>()
    };
    assert_eq!(values(&restored), values(&snapshot));
    let contents: Vec<&str> = restored
        .labels
        .iter()
        .map(|label| label.content.as_str())
        .collect();
    assert_eq!(contents, vec!["0", "25", "50", "75", "100"]);
}

#[test]
fn bare_snapshot_json_is_accepted() {
    let area = laid_out_chart();
    let snapshot = area.snapshot();
    let json = snapshot.to_json_pretty().expect("snapshot should serialize");

    let restored = ChartAreaSnapshot::from_json_compat_str(&json).expect("compat parse");
    assert_eq!(restored.plot_area, snapshot.plot_area);
    assert_eq!(restored.axes.len(), 2);
    assert_eq!(restored.axes[0].id, AxisId(0));
    assert_eq!(restored.axes[1].labels.len(), 5);
}

#[test]
fn unknown_schema_version_is_rejected() {
    let area = laid_out_chart();
    let json = area
        .snapshot()
        .to_json_contract_v1_pretty()
        .expect("contract should serialize");

    let mut value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    value["schema_version"] = serde_json::json!(CHART_AREA_SNAPSHOT_JSON_SCHEMA_V1 + 1);
    let tampered = serde_json::to_string(&value).expect("json should serialize");

    let error = ChartAreaSnapshot::from_json_compat_str(&tampered).expect_err("must be rejected");
    assert!(matches!(error, AxisError::Serialization(message) if message.contains("schema version")));
}

#[test]
fn malformed_json_is_a_serialization_error() {
    assert!(matches!(
        AxisSnapshot::from_json_compat_str("{\"schema_version\": 1}"),
        Err(AxisError::Serialization(_))
    ));
}
