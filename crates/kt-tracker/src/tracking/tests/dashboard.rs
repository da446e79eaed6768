use super::common::*;

use crate::scoring::RagStatus;
use crate::tracking::domain::{Org, TowerId};

fn seed_portfolio() -> crate::tracking::TrackingService<MemoryRepository> {
    let (service, _) = build_service();
    let submissions = [
        request("architecture", Org::Twg, MONDAY, 80.0),
        request("architecture", Org::Tcs, "2026-02-18", 78.0),
        request("billing", Org::Twg, FRIDAY, 80.0),
        request("billing", Org::Tcs, FRIDAY, 55.0),
        request("payments", Org::Twg, "2026-02-21", 90.0),
        request("payments", Org::Twg, "2026-02-27", 10.0),
    ];
    for (index, mut submission) in submissions.into_iter().enumerate() {
        if index == 4 {
            submission.scores.has_active_blocker = true;
        }
        service.submit(submission).expect("seed submission");
    }
    service
}

#[test]
fn dashboard_orders_towers_worst_first() {
    let service = seed_portfolio();

    let dashboard = service.dashboard(week()).expect("dashboard builds");

    let order: Vec<(&str, RagStatus)> = dashboard
        .towers
        .iter()
        .map(|entry| (entry.tower_id.0.as_str(), entry.headline_status))
        .collect();
    assert_eq!(
        order,
        vec![
            ("payments", RagStatus::Red),
            ("billing", RagStatus::Amber),
            ("architecture", RagStatus::Green),
        ]
    );
    assert!(dashboard.towers[0].has_active_blocker);
}

#[test]
fn dashboard_counts_statuses_and_flags_variance() {
    let service = seed_portfolio();

    let dashboard = service.dashboard(week()).expect("dashboard builds");

    let counts: Vec<(RagStatus, usize)> = dashboard
        .rag_counts
        .iter()
        .map(|count| (count.status, count.towers))
        .collect();
    assert_eq!(
        counts,
        vec![
            (RagStatus::Red, 1),
            (RagStatus::Amber, 1),
            (RagStatus::Green, 1),
        ]
    );
    assert_eq!(dashboard.submissions, 5);
    assert_eq!(dashboard.average_total_score, Some(76.6));
    assert_eq!(dashboard.flagged_towers, vec![TowerId("billing".to_string())]);
    assert_eq!(
        dashboard.awaiting_counterpart,
        vec![TowerId("payments".to_string())]
    );

    let billing = dashboard
        .towers
        .iter()
        .find(|entry| entry.tower_id.0 == "billing")
        .expect("billing present");
    assert_eq!(billing.variance, Some(25.0));
    assert!(billing.variance_flagged);
}

#[test]
fn dashboard_for_an_empty_week_has_no_average() {
    let service = seed_portfolio();

    let dashboard = service
        .dashboard("2026-03-06".parse().expect("valid week"))
        .expect("dashboard builds");

    assert_eq!(dashboard.submissions, 0);
    assert!(dashboard.towers.is_empty());
    assert_eq!(dashboard.average_total_score, None);
    assert!(dashboard.rag_counts.iter().all(|count| count.towers == 0));
}
