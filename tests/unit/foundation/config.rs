use super::*;

#[test]
fn partial_config_keeps_defaults() {
    let cfg = PipelineConfig::from_reader(
        r#"{"limits":{"maxCommands":10},"enrichment":{"enabled":false}}"#.as_bytes(),
    )
    .unwrap();
    assert_eq!(cfg.limits.max_commands, 10);
    assert_eq!(cfg.limits.max_batch_depth, 8);
    assert!(!cfg.enrichment.enabled);
    assert_eq!(cfg.stabilizer, StabilizerOpts::default());
}

#[test]
fn default_minimums_match_category_table() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.enrichment.min_shapes.get("tree"), Some(&2));
    assert_eq!(cfg.enrichment.min_shapes.get("house"), Some(&3));
    assert_eq!(cfg.enrichment.min_shapes.get("person"), Some(&4));
}

#[test]
fn degenerate_limits_are_rejected() {
    let err = PipelineConfig::from_reader(r#"{"limits":{"maxShapesPerObject":61}}"#.as_bytes())
        .unwrap_err();
    assert!(err.to_string().contains("config error:"));

    let err =
        PipelineConfig::from_reader(r#"{"limits":{"maxBatchDepth":0}}"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("maxBatchDepth"));
}

#[test]
fn missing_file_is_a_config_error() {
    let err = PipelineConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, SceneError::Config(_)));
}
