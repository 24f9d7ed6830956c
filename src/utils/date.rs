use chrono::NaiveDate;

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Use the date given on the command line, or today.
pub fn resolve_date(s: Option<&str>) -> Option<NaiveDate> {
    match s {
        Some(d) => parse_date(d),
        None => Some(today()),
    }
}
