use super::domain::{Org, SubmissionRecord, TowerId};
use crate::scoring::{variance, RagStatus, ScoreResult, ScoringEngine, WeekEnding};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TowerHealthEntry {
    pub tower_id: TowerId,
    pub twg: Option<ScoreResult>,
    pub tcs: Option<ScoreResult>,
    /// Worst status reported by either organisation.
    pub headline_status: RagStatus,
    pub variance: Option<f64>,
    pub variance_flagged: bool,
    pub has_active_blocker: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RagCount {
    pub status: RagStatus,
    pub towers: usize,
}

/// Programme view of every tower that reported for one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioDashboard {
    pub week_ending: WeekEnding,
    pub submissions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_total_score: Option<f64>,
    pub rag_counts: Vec<RagCount>,
    pub flagged_towers: Vec<TowerId>,
    pub awaiting_counterpart: Vec<TowerId>,
    pub towers: Vec<TowerHealthEntry>,
}

#[derive(Default)]
struct TowerPair<'a> {
    twg: Option<&'a SubmissionRecord>,
    tcs: Option<&'a SubmissionRecord>,
}

pub(crate) fn build_dashboard(
    week_ending: WeekEnding,
    records: &[SubmissionRecord],
    engine: &ScoringEngine,
) -> PortfolioDashboard {
    let mut pairs: BTreeMap<&TowerId, TowerPair<'_>> = BTreeMap::new();
    let mut submissions = 0usize;
    let mut total_points = 0u32;

    for record in records
        .iter()
        .filter(|record| record.key.week_ending == week_ending)
    {
        submissions += 1;
        total_points += u32::from(record.result.total_score);
        let pair = pairs.entry(&record.key.tower_id).or_default();
        match record.key.org {
            Org::Twg => pair.twg = Some(record),
            Org::Tcs => pair.tcs = Some(record),
        }
    }

    let mut towers: Vec<TowerHealthEntry> = pairs
        .into_iter()
        .filter_map(|(tower_id, pair)| tower_entry(tower_id, pair, engine))
        .collect();
    towers.sort_by(|a, b| {
        a.headline_status
            .cmp(&b.headline_status)
            .then_with(|| a.tower_id.cmp(&b.tower_id))
    });

    let rag_counts = RagStatus::ordered()
        .into_iter()
        .map(|status| RagCount {
            status,
            towers: towers
                .iter()
                .filter(|entry| entry.headline_status == status)
                .count(),
        })
        .collect();

    let flagged_towers = towers
        .iter()
        .filter(|entry| entry.variance_flagged)
        .map(|entry| entry.tower_id.clone())
        .collect();

    let awaiting_counterpart = towers
        .iter()
        .filter(|entry| entry.variance.is_none())
        .map(|entry| entry.tower_id.clone())
        .collect();

    let average_total_score = if submissions > 0 {
        let mean = f64::from(total_points) / submissions as f64;
        Some((mean * 10.0).round() / 10.0)
    } else {
        None
    };

    PortfolioDashboard {
        week_ending,
        submissions,
        average_total_score,
        rag_counts,
        flagged_towers,
        awaiting_counterpart,
        towers,
    }
}

fn tower_entry(
    tower_id: &TowerId,
    pair: TowerPair<'_>,
    engine: &ScoringEngine,
) -> Option<TowerHealthEntry> {
    let twg = pair.twg.map(|record| record.result);
    let tcs = pair.tcs.map(|record| record.result);
    let headline_status = [twg, tcs]
        .into_iter()
        .flatten()
        .map(|result| result.rag_status)
        .min()?;

    let variance = variance::between(
        twg.map(|result| f64::from(result.total_score)),
        tcs.map(|result| f64::from(result.total_score)),
    );
    let variance_flagged = variance.map(|gap| engine.is_flagged(gap)).unwrap_or(false);
    let has_active_blocker = [pair.twg, pair.tcs]
        .into_iter()
        .flatten()
        .any(|record| record.input.has_active_blocker);

    Some(TowerHealthEntry {
        tower_id: tower_id.clone(),
        twg,
        tcs,
        headline_status,
        variance,
        variance_flagged,
        has_active_blocker,
    })
}
