//! `canvas-pipeline` command-line interface
//!
//! Previews layouts and runs synthetic batches through the scheduler.

use anyhow::{bail, Context, Result};
use canvas_core::{
    Action, ActionScheduler, ActionType, CanvasState, ExecutorRegistry, PipelineConfig,
    SimulatedRemoteExecutor,
};
use canvas_grouping::RelationshipGrouper;
use canvas_layout::{
    ElementKind, ElementSpec, LayoutConfig, LayoutPlan, LayoutStrategy, SpatialLayoutEngine,
};
use canvas_quota::{ManualClock, QuotaGovernor};
use clap::{value_parser, Arg, ArgAction, Command};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const MEASURES: [&str; 4] = ["Revenue", "Cost", "Profit", "Sessions"];
const DIMENSIONS: [&str; 3] = ["Region", "Month", "Channel"];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("canvas-pipeline")
        .version(canvas_core::VERSION)
        .about("Quota-aware canvas action pipeline")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("layout")
                .about("Arrange element specs and print the plan")
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .default_value("grid")
                        .help("Layout strategy name"),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .help("JSON file holding an array of element specs"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run a synthetic batch through the scheduler in virtual time")
                .arg(
                    Arg::new("actions")
                        .long("actions")
                        .default_value("12")
                        .value_parser(value_parser!(usize))
                        .help("Number of actions to submit"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Jitter seed for reproducibility"),
                )
                .arg(
                    Arg::new("rate-limit-every")
                        .long("rate-limit-every")
                        .default_value("0")
                        .value_parser(value_parser!(u64))
                        .help("Answer every n-th remote call with a rate limit; 0 disables"),
                )
                .arg(
                    Arg::new("priority-tiers")
                        .long("priority-tiers")
                        .action(ArgAction::SetTrue)
                        .help("Run data, insight, then presentation actions"),
                ),
        )
        .subcommand(Command::new("config").about("Print the effective configuration"));

    let matches = cli.get_matches();
    let config = PipelineConfig::from_env().context("invalid CANVAS_* configuration")?;

    match matches.subcommand() {
        Some(("layout", args)) => {
            let name = args
                .get_one::<String>("strategy")
                .map_or("grid", String::as_str);
            let specs = match args.get_one::<String>("input") {
                Some(path) => {
                    let raw = std::fs::read_to_string(path)
                        .with_context(|| format!("reading {path}"))?;
                    serde_json::from_str::<Vec<ElementSpec>>(&raw)
                        .with_context(|| format!("parsing element specs from {path}"))?
                }
                None => sample_specs(),
            };

            let plan = layout_plan(config.layout, name, &specs)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Some(("simulate", args)) => {
            let count = args.get_one::<usize>("actions").copied().unwrap_or(12);
            let seed = args.get_one::<u64>("seed").copied().unwrap_or(42);
            let rate_limit_every = args.get_one::<u64>("rate-limit-every").copied().unwrap_or(0);
            let priority_tiers = args.get_flag("priority-tiers") || config.scheduler.priority_tiers;

            let report = simulate(config, count, seed, rate_limit_every, priority_tiers).await;
            println!("{}", report.summary());
        }
        Some(("config", _)) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Some((other, _)) => bail!("unknown subcommand: {other}"),
        None => bail!("no subcommand given"),
    }

    Ok(())
}

/// Unknown strategy names fall back to the grid
fn layout_plan(layout: LayoutConfig, strategy: &str, specs: &[ElementSpec]) -> Result<LayoutPlan> {
    let engine = SpatialLayoutEngine::new(layout);
    Ok(engine.arrange(specs, LayoutStrategy::from_name(strategy), &[])?)
}

fn sample_specs() -> Vec<ElementSpec> {
    vec![
        ElementSpec::new("revenue", ElementKind::Metric),
        ElementSpec::new("orders", ElementKind::Metric),
        ElementSpec::new("trend", ElementKind::Chart),
        ElementSpec::new("regions", ElementKind::Chart),
        ElementSpec::new("detail", ElementKind::Table),
    ]
}

async fn simulate(
    config: PipelineConfig,
    count: usize,
    seed: u64,
    rate_limit_every: u64,
    priority_tiers: bool,
) -> canvas_core::RunReport {
    let clock = Arc::new(ManualClock::starting_now());
    let governor = Arc::new(QuotaGovernor::with_clock(
        config.quota.clone().with_jitter_seed(seed),
        clock.clone(),
    ));
    let engine = SpatialLayoutEngine::new(config.layout.clone());
    let remote = Arc::new(
        SimulatedRemoteExecutor::new(config.layout.clone()).with_rate_limit_every(rate_limit_every),
    );

    let mut registry =
        ExecutorRegistry::with_builtin(engine.clone(), RelationshipGrouper::new(config.grouping));
    for action_type in ActionType::ALL.into_iter().filter(|t| t.weight().is_remote()) {
        registry.register(action_type, remote.clone());
    }

    let scheduler = ActionScheduler::new(registry, governor)
        .with_engine(engine)
        .with_config(config.scheduler.with_priority_tiers(priority_tiers));

    let actions = synthetic_actions(count);
    let mut canvas = CanvasState::new();
    let report = scheduler.run(actions, &mut canvas).await;
    info!(
        elements = canvas.len(),
        zones = canvas.zones().len(),
        virtual_wait_ms = u64::try_from(clock.total_slept().as_millis()).unwrap_or(u64::MAX),
        remote_calls = remote.calls(),
        "simulation finished"
    );
    report
}

/// Repeating mix of chart, metric, insight and annotation actions, closed by
/// an arrangement and a semantic grouping
fn synthetic_actions(count: usize) -> Vec<Action> {
    let body = count.saturating_sub(2);
    let mut actions = Vec::with_capacity(count);
    let mut last_chart = None;

    for i in 0..body {
        let action = match i % 4 {
            0 => {
                let id = format!("chart-{i}");
                last_chart = Some(id.clone());
                Action::CreateChart {
                    id: id.into(),
                    dimensions: vec![DIMENSIONS[(i / 4) % DIMENSIONS.len()].to_string()],
                    measures: vec![MEASURES[(i / 4) % MEASURES.len()].to_string()],
                    title: None,
                    size: None,
                }
            }
            1 => Action::CreateMetric {
                id: format!("metric-{i}").into(),
                expression: format!("@{}.Sum", MEASURES[(i / 4) % MEASURES.len()]),
                label: format!("Total {}", MEASURES[(i / 4) % MEASURES.len()]),
            },
            2 => match &last_chart {
                Some(chart) => Action::GenerateInsights {
                    id: format!("insights-{i}").into(),
                    chart: chart.clone().into(),
                },
                None => Action::CreateTable {
                    id: format!("table-{i}").into(),
                    source: None,
                    size: None,
                },
            },
            _ => Action::AddAnnotation {
                id: format!("note-{i}").into(),
                text: format!("Step {i}"),
                anchor: last_chart.clone().map(Into::into),
            },
        };
        actions.push(action);
    }

    if count >= 1 {
        actions.push(Action::Arrange {
            strategy: None,
            elements: Vec::new(),
        });
    }
    if count >= 2 {
        actions.push(Action::GroupSemantic {
            criterion: "financial".into(),
            padding: None,
        });
    }
    actions
}
