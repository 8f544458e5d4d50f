pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else if ms < 3_600_000 {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = ms / 3_600_000;
        let mins = (ms % 3_600_000) / 60_000;
        format!("{}h {}m", hours, mins)
    }
}

/// Requests per second over the elapsed time, 0 when nothing elapsed.
pub fn format_rate(count: usize, elapsed_ms: u64) -> String {
    if elapsed_ms == 0 {
        return "0.0 req/s".to_string();
    }
    format!("{:.1} req/s", count as f64 * 1000.0 / elapsed_ms as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(125_000), "2m 5s");
        assert_eq!(format_duration(3_660_000), "1h 1m");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(10, 0), "0.0 req/s");
        assert_eq!(format_rate(50, 2000), "25.0 req/s");
    }
}
