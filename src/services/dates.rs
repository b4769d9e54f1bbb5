use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored in place of a date that could not be parsed.
pub const INVALID_DATE: &str = "Invalid date format";

/// Normalize a `YYYY-MM-DD` date. Unparseable input degrades to
/// [`INVALID_DATE`] instead of failing the request.
///
/// Only the canonical spelling is accepted: chrono alone would also take
/// one-digit fields, leading whitespace and a `+` sign.
pub fn format_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => {
            let formatted = date.format(DATE_FORMAT).to_string();
            if formatted == raw {
                formatted
            } else {
                tracing::error!(date = raw, "Date is not in YYYY-MM-DD form");
                INVALID_DATE.to_string()
            }
        }
        Err(e) => {
            tracing::error!(error = %e, date = raw, "Invalid date format");
            INVALID_DATE.to_string()
        }
    }
}
