use super::domain::SubmissionRecord;
use serde::Serialize;
use std::io::Write;

const HEADERS: [&str; 12] = [
    "Tower",
    "Week Ending",
    "Org",
    "Progress",
    "Coverage",
    "Confidence",
    "Operational",
    "Quality",
    "Active Blocker",
    "Total Score",
    "RAG",
    "Weights Version",
];

#[derive(Debug, Serialize)]
struct SubmissionRow<'a> {
    tower: &'a str,
    week_ending: String,
    org: &'static str,
    progress: f64,
    coverage: f64,
    confidence: f64,
    operational: f64,
    quality: f64,
    has_active_blocker: bool,
    total_score: u8,
    rag: &'static str,
    weights_version: u32,
}

impl<'a> From<&'a SubmissionRecord> for SubmissionRow<'a> {
    fn from(record: &'a SubmissionRecord) -> Self {
        Self {
            tower: &record.key.tower_id.0,
            week_ending: record.key.week_ending.to_string(),
            org: record.key.org.label(),
            progress: record.input.progress_score,
            coverage: record.input.coverage_score,
            confidence: record.input.confidence_score,
            operational: record.input.operational_score,
            quality: record.input.quality_score,
            has_active_blocker: record.input.has_active_blocker,
            total_score: record.result.total_score,
            rag: record.result.rag_status.label(),
            weights_version: record.weights_version,
        }
    }
}

/// Writes one row per submission ordered by week, tower, then organisation.
/// The header row is always present, even for an empty store.
pub(crate) fn write_submissions<W: Write>(
    records: &[SubmissionRecord],
    writer: W,
) -> Result<usize, csv::Error> {
    let mut ordered: Vec<&SubmissionRecord> = records.iter().collect();
    ordered.sort_by(|a, b| {
        a.key
            .week_ending
            .cmp(&b.key.week_ending)
            .then_with(|| a.key.tower_id.cmp(&b.key.tower_id))
            .then_with(|| a.key.org.cmp(&b.key.org))
    });

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HEADERS)?;
    for record in &ordered {
        csv_writer.serialize(SubmissionRow::from(*record))?;
    }
    csv_writer.flush()?;

    Ok(ordered.len())
}
