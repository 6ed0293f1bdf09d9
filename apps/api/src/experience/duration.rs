use crate::experience::models::{CanonicalMonth, Tenure, YearMonth};

pub const UNKNOWN_DURATION: &str = "Duration unknown";
pub const INVALID_DURATION: &str = "Invalid duration";
pub const LESS_THAN_A_MONTH: &str = "Less than 1 month";

/// Signed month count between two canonical months.
pub fn months_between(start: YearMonth, end: YearMonth) -> i32 {
    start.months_until(end)
}

/// Computes the month count and phrase for a `start..end` span.
///
/// - unknown start (or end) → `0`, "Duration unknown"
/// - end before start → `0`, "Invalid duration"
/// - same month → `0`, "Less than 1 month"
/// - otherwise "N year(s), M month(s)"
pub fn duration(start: CanonicalMonth, end: CanonicalMonth) -> Tenure {
    let (Some(start), Some(end)) = (start.known(), end.known()) else {
        return Tenure {
            months: 0,
            text: UNKNOWN_DURATION.to_string(),
        };
    };

    let months = months_between(start, end);
    if months < 0 {
        return Tenure {
            months: 0,
            text: INVALID_DURATION.to_string(),
        };
    }

    let months = months as u32;
    Tenure {
        months,
        text: format_months(months),
    }
}

/// Year/month phrasing shared by positions, stints and the grand total.
pub fn format_months(months: u32) -> String {
    if months == 0 {
        return LESS_THAN_A_MONTH.to_string();
    }

    let years = months / 12;
    let remainder = months % 12;

    match (years, remainder) {
        (0, m) => plural(m, "month"),
        (y, 0) => plural(y, "year"),
        (y, m) => format!("{}, {}", plural(y, "year"), plural(m, "month")),
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(year: i32, month: u32) -> CanonicalMonth {
        CanonicalMonth::Known(YearMonth::new(year, month).unwrap())
    }

    #[test]
    fn test_same_month_is_less_than_one_month() {
        let d = duration(known(2022, 1), known(2022, 1));
        assert_eq!(d.months, 0);
        assert_eq!(d.text, "Less than 1 month");
    }

    #[test]
    fn test_exactly_one_year() {
        let d = duration(known(2022, 1), known(2023, 1));
        assert_eq!(d.months, 12);
        assert_eq!(d.text, "1 year");
    }

    #[test]
    fn test_negative_span_is_invalid() {
        let d = duration(known(2022, 1), known(2021, 1));
        assert_eq!(d.months, 0);
        assert_eq!(d.text, "Invalid duration");
    }

    #[test]
    fn test_unknown_start() {
        let d = duration(CanonicalMonth::Unknown, known(2021, 1));
        assert_eq!(d.months, 0);
        assert_eq!(d.text, "Duration unknown");
    }

    #[test]
    fn test_years_and_months() {
        let d = duration(known(2019, 3), known(2021, 8));
        assert_eq!(d.months, 29);
        assert_eq!(d.text, "2 years, 5 months");
    }

    #[test]
    fn test_singular_agreement() {
        assert_eq!(format_months(1), "1 month");
        assert_eq!(format_months(13), "1 year, 1 month");
        assert_eq!(format_months(25), "2 years, 1 month");
        assert_eq!(format_months(14), "1 year, 2 months");
        assert_eq!(format_months(11), "11 months");
        assert_eq!(format_months(36), "3 years");
    }

    #[test]
    fn test_crosses_year_boundary() {
        let d = duration(known(2022, 11), known(2023, 2));
        assert_eq!(d.months, 3);
        assert_eq!(d.text, "3 months");
    }
}
