use crate::infra::{parse_week_ending, InMemorySubmissionRepository};
use chrono::Utc;
use clap::Args;
use kt_tracker::config::AppConfig;
use kt_tracker::error::AppError;
use kt_tracker::scoring::{
    normalise_week_ending, RagStatus, ScoreInput, ScoringEngine, ScoringWeights, WeekEnding,
};
use kt_tracker::tracking::{
    Org, PortfolioDashboard, SubmissionRequest, TowerId, TrackingService,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Progress against the transfer plan (0-100)
    #[arg(long)]
    pub(crate) progress: f64,
    /// Share of in-scope knowledge areas covered (0-100)
    #[arg(long)]
    pub(crate) coverage: f64,
    /// Receiving team confidence (0-100)
    #[arg(long)]
    pub(crate) confidence: f64,
    /// Operational readiness (0-100)
    #[arg(long)]
    pub(crate) operational: f64,
    /// Quality of delivered artefacts (0-100)
    #[arg(long)]
    pub(crate) quality: f64,
    /// Mark the submission as having an active blocker
    #[arg(long)]
    pub(crate) blocker: bool,
}

#[derive(Args, Debug)]
pub(crate) struct WeekArgs {
    /// Any date or RFC 3339 timestamp. Defaults to now.
    #[arg(value_parser = parse_week_ending)]
    pub(crate) date: Option<WeekEnding>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting week to seed (any day of the week). Defaults to the current week.
    #[arg(long, value_parser = parse_week_ending)]
    pub(crate) week_ending: Option<WeekEnding>,
    /// Print the dashboard as JSON instead of a table.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let input = ScoreInput {
        progress_score: args.progress,
        coverage_score: args.coverage,
        confidence_score: args.confidence,
        operational_score: args.operational,
        quality_score: args.quality,
        has_active_blocker: args.blocker,
    };

    let engine = ScoringEngine::new(config.scoring);
    let result = engine.score(&input);

    println!("Score breakdown");
    for component in engine.breakdown(&input) {
        println!(
            "- {:<12} {:>5.1} x {:.2} = {:>5.2}",
            component.label, component.score, component.weight, component.contribution
        );
    }
    println!(
        "Total score: {} | RAG: {}{}",
        result.total_score,
        result.rag_status.label(),
        if input.has_active_blocker {
            " (active blocker)"
        } else {
            ""
        }
    );
    Ok(())
}

pub(crate) fn run_week(args: WeekArgs) -> Result<(), AppError> {
    let week_ending = args
        .date
        .unwrap_or_else(|| normalise_week_ending(Utc::now()));
    println!("{week_ending}");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let week_ending = args
        .week_ending
        .unwrap_or_else(|| normalise_week_ending(Utc::now()));
    let service = TrackingService::new(
        Arc::new(InMemorySubmissionRepository::default()),
        ScoringWeights::default(),
    );

    for request in sample_portfolio(week_ending) {
        service.submit(request)?;
    }

    let dashboard = service.dashboard(week_ending)?;
    if args.json {
        match serde_json::to_string_pretty(&dashboard) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Dashboard payload unavailable: {err}"),
        }
        return Ok(());
    }

    println!("KT tracking demo");
    render_dashboard(&dashboard);

    let summary = service.update_weights(confidence_heavy_weights())?;
    println!(
        "\nConfidence-weighted rubric applied (version {}): {} submissions rescored, {} changed status",
        summary.version, summary.records, summary.status_changes
    );
    render_dashboard(&service.dashboard(week_ending)?);

    Ok(())
}

fn render_dashboard(dashboard: &PortfolioDashboard) {
    println!("\nWeek ending {}", dashboard.week_ending);
    match dashboard.average_total_score {
        Some(average) => println!(
            "{} submissions | average total {:.1}",
            dashboard.submissions, average
        ),
        None => println!("No submissions recorded"),
    }

    let counts: Vec<String> = dashboard
        .rag_counts
        .iter()
        .map(|count| format!("{} {}", count.status.label(), count.towers))
        .collect();
    println!("Tower status: {}", counts.join(" | "));

    println!("\nTowers (worst first)");
    for entry in &dashboard.towers {
        let total = |org: Org| {
            let result = match org {
                Org::Twg => entry.twg,
                Org::Tcs => entry.tcs,
            };
            result
                .map(|result| format!("{} {}", result.total_score, result.rag_status.label()))
                .unwrap_or_else(|| "awaiting".to_string())
        };
        let variance = match entry.variance {
            Some(gap) if entry.variance_flagged => format!("{gap:.0} pts FLAGGED"),
            Some(gap) => format!("{gap:.0} pts"),
            None => "n/a".to_string(),
        };
        println!(
            "- {:<14} {:<5} | TWG {:<10} | TCS {:<10} | variance {}{}",
            entry.tower_id.0,
            entry.headline_status.label(),
            total(Org::Twg),
            total(Org::Tcs),
            variance,
            if entry.has_active_blocker {
                " | blocker"
            } else {
                ""
            }
        );
    }

    if !dashboard.flagged_towers.is_empty() {
        let towers: Vec<&str> = dashboard
            .flagged_towers
            .iter()
            .map(|tower| tower.0.as_str())
            .collect();
        println!("Variance review needed: {}", towers.join(", "));
    }
    if dashboard
        .towers
        .iter()
        .all(|entry| entry.headline_status == RagStatus::Green)
    {
        println!("All towers green");
    }
}

fn confidence_heavy_weights() -> ScoringWeights {
    ScoringWeights {
        progress_weight: 0.1,
        coverage_weight: 0.1,
        confidence_weight: 0.4,
        operational_weight: 0.2,
        quality_weight: 0.2,
        ..ScoringWeights::default()
    }
}

fn sample_portfolio(week_ending: WeekEnding) -> Vec<SubmissionRequest> {
    let entry = |tower: &str, org: Org, scores: [f64; 5], blocker: bool, note: &str| {
        let [progress, coverage, confidence, operational, quality] = scores;
        SubmissionRequest {
            tower_id: TowerId(tower.to_string()),
            org,
            week_ending: week_ending.to_string(),
            scores: ScoreInput {
                progress_score: progress,
                coverage_score: coverage,
                confidence_score: confidence,
                operational_score: operational,
                quality_score: quality,
                has_active_blocker: blocker,
            },
            narrative: Some(note.to_string()),
        }
    };

    vec![
        entry(
            "service-desk",
            Org::Twg,
            [85.0, 80.0, 75.0, 80.0, 85.0],
            false,
            "Shadowing complete; reverse shadowing under way",
        ),
        entry(
            "service-desk",
            Org::Tcs,
            [80.0, 80.0, 70.0, 75.0, 80.0],
            false,
            "Runbooks reviewed for all tier-one queues",
        ),
        entry(
            "network",
            Org::Twg,
            [90.0, 90.0, 60.0, 60.0, 60.0],
            false,
            "Sessions delivered ahead of plan",
        ),
        entry(
            "network",
            Org::Tcs,
            [60.0, 55.0, 45.0, 50.0, 55.0],
            false,
            "Confidence low on firewall change process",
        ),
        entry(
            "payments",
            Org::Twg,
            [70.0, 65.0, 60.0, 70.0, 70.0],
            true,
            "SME unavailable until access request is approved",
        ),
        entry(
            "data-platform",
            Org::Tcs,
            [40.0, 35.0, 30.0, 45.0, 40.0],
            false,
            "Environment access still pending",
        ),
    ]
}
