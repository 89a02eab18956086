//! Testing utilities for the canvas workspace
//!
//! Shared fixtures, a virtual-time governor and scripted remote executors.

#![allow(missing_docs)]

use async_trait::async_trait;
use canvas_core::{Action, ActionExecutor, CanvasState, ExecutorError, ExecutorOutput};
use canvas_layout::{CanvasElement, ChartFields, ElementKind, LayoutConfig, Point, Size};
use canvas_quota::{ManualClock, QuotaConfig, QuotaGovernor};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Midday in the default quota timezone, far from any day rollover
pub fn quiet_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 20, 0, 0).unwrap()
}

pub fn manual_governor(config: QuotaConfig) -> (Arc<QuotaGovernor>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(quiet_start()));
    let governor = Arc::new(QuotaGovernor::with_clock(config, clock.clone()));
    (governor, clock)
}

pub fn manual_governor_with_usage(
    config: QuotaConfig,
    calls_today: u32,
) -> (Arc<QuotaGovernor>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(quiet_start()));
    let governor =
        Arc::new(QuotaGovernor::with_clock(config, clock.clone()).with_usage(calls_today));
    (governor, clock)
}

pub fn chart(id: &str, x: f64, y: f64, dimensions: &[&str], measures: &[&str]) -> CanvasElement {
    CanvasElement::new(id, ElementKind::Chart, Point::new(x, y), Size::new(400.0, 300.0).unwrap())
        .unwrap()
        .with_fields(ChartFields::new(dimensions.iter().copied(), measures.iter().copied()))
}

pub fn metric(id: &str, x: f64, y: f64) -> CanvasElement {
    CanvasElement::new(id, ElementKind::Metric, Point::new(x, y), Size::new(200.0, 100.0).unwrap())
        .unwrap()
}

pub fn create_chart(id: &str, dimensions: &[&str], measures: &[&str]) -> Action {
    Action::CreateChart {
        id: id.into(),
        dimensions: dimensions.iter().map(ToString::to_string).collect(),
        measures: measures.iter().map(ToString::to_string).collect(),
        title: None,
        size: None,
    }
}

pub fn create_metric(id: &str, label: &str) -> Action {
    Action::CreateMetric {
        id: id.into(),
        expression: format!("@{label}.Sum"),
        label: label.to_string(),
    }
}

pub fn insights(id: &str, chart: &str) -> Action {
    Action::GenerateInsights {
        id: id.into(),
        chart: chart.into(),
    }
}

pub fn annotation(id: &str, text: &str) -> Action {
    Action::AddAnnotation {
        id: id.into(),
        text: text.to_string(),
        anchor: None,
    }
}

/// What a [`ScriptedExecutor`] does on its next call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    RateLimit,
    Fail(String),
}

/// Remote stand-in answering from a queue of outcomes
///
/// Succeeds once the queue is empty. Successful calls return the action's
/// draft element.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    layout: LayoutConfig,
    script: Mutex<VecDeque<Outcome>>,
    calls: Mutex<Vec<Action>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripted(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Action> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ActionExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        action: &Action,
        _canvas: &CanvasState,
    ) -> Result<ExecutorOutput, ExecutorError> {
        self.calls.lock().push(action.clone());
        let outcome = self.script.lock().pop_front().unwrap_or(Outcome::Succeed);
        match outcome {
            Outcome::Succeed => Ok(match action.draft_element(&self.layout)? {
                Some(element) => ExecutorOutput::elements(vec![element]),
                None => ExecutorOutput::default(),
            }),
            Outcome::RateLimit => Err(ExecutorError::RateLimited("scripted 429".into())),
            Outcome::Fail(reason) => Err(ExecutorError::Failed(reason)),
        }
    }
}
