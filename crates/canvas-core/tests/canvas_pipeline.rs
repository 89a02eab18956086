//! Creation, arrangement and grouping through successive scheduler runs.

use canvas_core::{Action, ActionScheduler, ActionType, CanvasState, ExecutorRegistry};
use canvas_grouping::RelationshipGrouper;
use canvas_layout::{ElementId, Point, SpatialLayoutEngine};
use canvas_quota::QuotaConfig;
use canvas_test_utils::{chart, create_chart, create_metric, manual_governor, ScriptedExecutor};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn scheduler() -> (ActionScheduler, Arc<ScriptedExecutor>) {
    let remote = Arc::new(ScriptedExecutor::new());
    let mut registry =
        ExecutorRegistry::with_builtin(SpatialLayoutEngine::default(), RelationshipGrouper::default());
    for action_type in ActionType::ALL.into_iter().filter(|t| t.weight().is_remote()) {
        registry.register(action_type, remote.clone());
    }
    let (governor, _clock) = manual_governor(QuotaConfig::unpaced());
    (ActionScheduler::new(registry, governor), remote)
}

fn position(canvas: &CanvasState, id: &str) -> Point {
    canvas.get(&ElementId::from(id)).unwrap().position
}

#[tokio::test]
async fn created_elements_never_overlap() {
    let (scheduler, _remote) = scheduler();
    let actions: Vec<Action> = (0..6)
        .map(|i| create_chart(&format!("c{i}"), &["Region"], &["Revenue"]))
        .collect();

    let mut canvas = CanvasState::new();
    let report = scheduler.run(actions, &mut canvas).await;

    assert_eq!(report.succeeded(), 6);
    assert_eq!(canvas.len(), 6);
    assert_eq!(canvas.first_overlap(), None);
}

#[tokio::test]
async fn grid_arrangement_of_four_metrics() {
    let (scheduler, _remote) = scheduler();
    let mut canvas = CanvasState::new();
    let created = scheduler
        .run(
            (0..4).map(|i| create_metric(&format!("m{i}"), "Revenue")).collect(),
            &mut canvas,
        )
        .await;
    assert_eq!(created.succeeded(), 4);

    let report = scheduler
        .run(
            vec![Action::Arrange {
                strategy: Some("grid".into()),
                elements: Vec::new(),
            }],
            &mut canvas,
        )
        .await;

    assert!(report.results[0].status.is_success());
    assert_eq!(report.results[0].elements.len(), 4);
    assert_eq!(position(&canvas, "m0"), Point::new(0.0, 0.0));
    assert_eq!(position(&canvas, "m1"), Point::new(220.0, 0.0));
    assert_eq!(position(&canvas, "m2"), Point::new(0.0, 120.0));
    assert_eq!(position(&canvas, "m3"), Point::new(220.0, 120.0));
}

#[tokio::test]
async fn repeated_arrangement_is_stable() {
    let (scheduler, _remote) = scheduler();
    let mut canvas = CanvasState::from_elements([
        chart("a", 0.0, 0.0, &["Region"], &["Revenue"]),
        chart("b", 900.0, 40.0, &["Region"], &["Cost"]),
        chart("c", 0.0, 700.0, &["Month"], &["Sessions"]),
    ]);
    let arrange = || Action::Arrange {
        strategy: Some("hero".into()),
        elements: Vec::new(),
    };

    scheduler.run(vec![arrange()], &mut canvas).await;
    let first: Vec<Point> = canvas.elements().map(|e| e.position).collect();
    scheduler.run(vec![arrange()], &mut canvas).await;
    let second: Vec<Point> = canvas.elements().map(|e| e.position).collect();

    assert_eq!(first, second);
    assert_eq!(canvas.first_overlap(), None);
}

#[tokio::test]
async fn suggested_strategy_is_reported() {
    let (scheduler, _remote) = scheduler();
    let mut canvas = CanvasState::from_elements([
        chart("a", 0.0, 0.0, &["Region"], &["Revenue"]),
        chart("b", 500.0, 0.0, &["Region"], &["Cost"]),
    ]);

    let report = scheduler
        .run(
            vec![Action::Arrange {
                strategy: None,
                elements: Vec::new(),
            }],
            &mut canvas,
        )
        .await;

    let message = report.results[0].message.clone().unwrap();
    assert!(message.starts_with("arranged 2 elements with "), "{message}");
}

#[tokio::test]
async fn semantic_grouping_adds_zones_without_moving_elements() {
    let (scheduler, _remote) = scheduler();
    let mut canvas = CanvasState::from_elements([
        chart("rev", 0.0, 0.0, &["Region"], &["Revenue"]),
        chart("cost", 500.0, 0.0, &["Region"], &["Cost"]),
        chart("visits", 1000.0, 0.0, &["Month"], &["Sessions"]),
    ]);
    let before: Vec<Point> = canvas.elements().map(|e| e.position).collect();

    let report = scheduler
        .run(
            vec![Action::GroupSemantic {
                criterion: "financial".into(),
                padding: Some(10.0),
            }],
            &mut canvas,
        )
        .await;

    assert!(report.results[0].status.is_success());
    let labels: Vec<&str> = canvas.zones().iter().map(|z| z.label.as_str()).collect();
    assert_eq!(labels, vec!["Revenue", "Cost"]);
    let after: Vec<Point> = canvas.elements().map(|e| e.position).collect();
    assert_eq!(before, after);
    assert_eq!(canvas.first_overlap(), None);
}

#[test]
fn actions_parse_from_tagged_json() {
    let raw = r#"[
        { "type": "create_chart", "id": "c1", "dimensions": ["Region"], "measures": ["Revenue"] },
        { "type": "generate_insights", "id": "i1", "chart": "c1" },
        { "type": "arrange", "strategy": "comparison" },
        { "type": "group_semantic", "criterion": "by region" }
    ]"#;
    let actions: Vec<Action> = serde_json::from_str(raw).unwrap();
    let types: Vec<ActionType> = actions.iter().map(Action::action_type).collect();
    assert_eq!(
        types,
        vec![
            ActionType::CreateChart,
            ActionType::GenerateInsights,
            ActionType::Arrange,
            ActionType::GroupSemantic,
        ]
    );
    assert!(actions[0].is_remote());
    assert!(!actions[2].is_remote());
}
