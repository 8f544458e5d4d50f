use crate::models::{OutcomeRecord, ScanReport, ScanStatus};
use crate::utils::{format_duration, truncate_middle};

const LABEL_WIDTH: usize = 48;

/// Plain-text table of hits, one row per hit in completion order.
pub fn format_hits_table(report: &ScanReport) -> String {
    let hits: Vec<&OutcomeRecord> = report.hits().collect();
    if hits.is_empty() {
        return "No hits.\n".to_string();
    }

    let rows: Vec<(String, String, String, String)> = hits
        .iter()
        .map(|h| {
            (
                truncate_middle(&h.label(), LABEL_WIDTH),
                h.status.map(|s| s.to_string()).unwrap_or_else(|| "---".into()),
                h.reason.clone(),
                h.response_length.map(|l| l.to_string()).unwrap_or_default(),
            )
        })
        .collect();

    let w_label = rows.iter().map(|r| r.0.chars().count()).max().unwrap_or(0).max("CANDIDATE".len());
    let w_reason = rows.iter().map(|r| r.2.chars().count()).max().unwrap_or(0).max("REASON".len());

    let mut out = format!(
        "{:<w_label$}  {:<6}  {:<w_reason$}  {}\n",
        "CANDIDATE", "STATUS", "REASON", "LENGTH"
    );
    for (label, status, reason, length) in rows {
        out.push_str(&format!("{:<w_label$}  {:<6}  {:<w_reason$}  {}\n", label, status, reason, length));
    }
    out
}

/// One-line scan summary.
pub fn format_summary(report: &ScanReport) -> String {
    let counts = &report.counts;
    match report.status {
        ScanStatus::NothingToDo => "Nothing to do: the candidate set is empty".to_string(),
        status => format!(
            "Scan {} ({}): {}/{} probes, {} hit(s), {} miss(es), {} error(s) in {}",
            status,
            report.scan_id,
            counts.completed,
            counts.total,
            counts.hits,
            counts.misses(),
            counts.errors,
            format_duration(report.duration_ms),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScanCounts, Verdict};
    use chrono::Utc;

    fn record(index: usize, path: &str, verdict: Verdict, reason: &str) -> OutcomeRecord {
        OutcomeRecord {
            index,
            username: None,
            password: None,
            path: Some(path.into()),
            parameter: None,
            payload: None,
            url: None,
            status: Some(200),
            verdict,
            reason: reason.into(),
            response_length: Some(512),
            server: None,
            content_type: None,
            elapsed_ms: 3,
            attempts: 1,
            error: None,
        }
    }

    fn report(status: ScanStatus, outcomes: Vec<OutcomeRecord>) -> ScanReport {
        ScanReport {
            scan_id: "abc".into(),
            target: "http://example.com".into(),
            status,
            started_at: Utc::now(),
            duration_ms: 1500,
            counts: ScanCounts { total: 4, completed: outcomes.len(), hits: 1, errors: 0 },
            outcomes,
            saved_to: Vec::new(),
        }
    }

    #[test]
    fn test_hits_table_lists_only_hits() {
        let r = report(
            ScanStatus::Completed,
            vec![record(0, "admin", Verdict::Hit, "status:200"), record(1, "x", Verdict::Miss, "")],
        );
        let table = format_hits_table(&r);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("CANDIDATE"));
        assert!(lines[1].starts_with("/admin"));
        assert!(lines[1].contains("status:200"));
    }

    #[test]
    fn test_hits_table_empty() {
        assert_eq!(format_hits_table(&report(ScanStatus::Completed, Vec::new())), "No hits.\n");
    }

    #[test]
    fn test_summary_line() {
        let r = report(
            ScanStatus::Cancelled,
            vec![record(0, "admin", Verdict::Hit, "status:200"), record(1, "x", Verdict::Miss, "")],
        );
        assert_eq!(
            format_summary(&r),
            "Scan cancelled (abc): 2/4 probes, 1 hit(s), 1 miss(es), 0 error(s) in 1.5s"
        );
    }

    #[test]
    fn test_summary_nothing_to_do() {
        assert!(format_summary(&report(ScanStatus::NothingToDo, Vec::new())).starts_with("Nothing to do"));
    }
}
