/// Escape text for inclusion in HTML element content or attributes.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Human phrasing of a duration: "a moment", "3 minutes", "an hour".
///
/// Units are truncated, never rounded up, so "119 seconds" reads as
/// "a minute".
#[must_use]
pub fn natural_delta(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    match seconds {
        0 => "a moment".into(),
        1 => "a second".into(),
        s if s < MINUTE => format!("{s} seconds"),
        s if s < 2 * MINUTE => "a minute".into(),
        s if s < HOUR => format!("{} minutes", s / MINUTE),
        s if s < 2 * HOUR => "an hour".into(),
        s if s < DAY => format!("{} hours", s / HOUR),
        s if s < 2 * DAY => "a day".into(),
        s if s < MONTH => format!("{} days", s / DAY),
        s if s < 2 * MONTH => "a month".into(),
        s if s < YEAR => format!("{} months", s / MONTH),
        s if s < 2 * YEAR => "a year".into(),
        s => format!("{} years", s / YEAR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn natural_delta_small_values() {
        assert_eq!(natural_delta(0), "a moment");
        assert_eq!(natural_delta(1), "a second");
        assert_eq!(natural_delta(42), "42 seconds");
    }

    #[test]
    fn natural_delta_minutes_and_hours() {
        assert_eq!(natural_delta(60), "a minute");
        assert_eq!(natural_delta(119), "a minute");
        assert_eq!(natural_delta(180), "3 minutes");
        assert_eq!(natural_delta(3_600), "an hour");
        assert_eq!(natural_delta(5 * 3_600 + 59), "5 hours");
    }

    #[test]
    fn natural_delta_long_values() {
        assert_eq!(natural_delta(86_400), "a day");
        assert_eq!(natural_delta(3 * 86_400), "3 days");
        assert_eq!(natural_delta(45 * 86_400), "a month");
        assert_eq!(natural_delta(100 * 86_400), "3 months");
        assert_eq!(natural_delta(400 * 86_400), "a year");
        assert_eq!(natural_delta(3 * 365 * 86_400), "3 years");
    }
}
