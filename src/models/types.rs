use crate::models::models::TimeWindow;

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::SevenDays => "7d",
            TimeWindow::SixtyDays => "60d",
        }
    }

    /// Parses a query-string value. Anything unrecognized falls back to the
    /// 60-day window, matching the public endpoint's default.
    pub fn parse_or_default(value: &str) -> TimeWindow {
        match value {
            "7d" => TimeWindow::SevenDays,
            _ => TimeWindow::SixtyDays,
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            TimeWindow::SevenDays => 7,
            TimeWindow::SixtyDays => 60,
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_windows() {
        assert_eq!(TimeWindow::parse_or_default("7d"), TimeWindow::SevenDays);
        assert_eq!(TimeWindow::parse_or_default("60d"), TimeWindow::SixtyDays);
    }

    #[test]
    fn test_parse_falls_back_to_sixty_days() {
        for bad in ["", "1y", "5y", "7D", "sixty"] {
            assert_eq!(TimeWindow::parse_or_default(bad), TimeWindow::SixtyDays);
        }
    }
}
