use chrono::{DateTime, Utc};

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Human readable age of `then` relative to `now`, e.g. "5m ago" or "2d ago".
/// Hours round up from 30 minutes and days from 12 hours.
pub fn age_display(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// Byte count as "512 B", "1.5 KB" or "2.0 MB"
pub fn bytes_display(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Crème brûlée", 8), "Crème...");
    }

    #[test]
    fn test_age_display() {
        let now = Utc::now();
        assert_eq!(age_display(now, now), "just now");
        assert_eq!(age_display(now + Duration::minutes(5), now), "just now");
        assert_eq!(age_display(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(age_display(now - Duration::minutes(89), now), "1h ago");
        assert_eq!(age_display(now - Duration::minutes(90), now), "2h ago");
        assert_eq!(age_display(now - Duration::hours(36), now), "2d ago");
        assert_eq!(age_display(now - Duration::hours(30), now), "1d ago");
    }

    #[test]
    fn test_bytes_display() {
        assert_eq!(bytes_display(512), "512 B");
        assert_eq!(bytes_display(1536), "1.5 KB");
        assert_eq!(bytes_display(2 * 1024 * 1024), "2.0 MB");
    }
}
