//! Caption rendering and the clock it reads the date from.
//!
//! The caption is a template with a single `{date}` placeholder, e.g.
//! `"Song of Today: {date}"` renders to `"Song of Today: 2024-05-01"`. The
//! date is the local calendar date at the moment the caption is built.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fmt::Write as _;
use thiserror::Error;

/// Placeholder replaced by the formatted date.
pub const DATE_PLACEHOLDER: &str = "{date}";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaptionError {
    #[error("caption template must contain {DATE_PLACEHOLDER}")]
    MissingPlaceholder,
    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),
}

/// Source of "now" for captions and scheduling.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Render `template` for `date`.
///
/// Every `{date}` occurrence is replaced. `date_format` is a chrono
/// strftime string; an unknown specifier is an error rather than a panic.
pub fn render_caption(
    template: &str,
    date: NaiveDate,
    date_format: &str,
) -> Result<String, CaptionError> {
    if !template.contains(DATE_PLACEHOLDER) {
        return Err(CaptionError::MissingPlaceholder);
    }
    let mut formatted = String::new();
    write!(formatted, "{}", date.format(date_format))
        .map_err(|_| CaptionError::InvalidDateFormat(date_format.to_string()))?;
    Ok(template.replace(DATE_PLACEHOLDER, &formatted))
}

/// Check a template/format pair without a real date.
pub fn validate_template(template: &str, date_format: &str) -> Result<(), CaptionError> {
    render_caption(template, NaiveDate::MIN, date_format).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn renders_default_caption() {
        let caption = render_caption("Song of Today: {date}", may_first(), "%Y-%m-%d").unwrap();
        assert_eq!(caption, "Song of Today: 2024-05-01");
    }

    #[test]
    fn custom_format() {
        let caption = render_caption("{date} ♪", may_first(), "%d.%m.%Y").unwrap();
        assert_eq!(caption, "01.05.2024 ♪");
    }

    #[test]
    fn every_placeholder_is_replaced() {
        let caption = render_caption("{date}/{date}", may_first(), "%m").unwrap();
        assert_eq!(caption, "05/05");
    }

    #[test]
    fn missing_placeholder_rejected() {
        assert_eq!(
            render_caption("Song of Today", may_first(), "%Y"),
            Err(CaptionError::MissingPlaceholder)
        );
    }

    #[test]
    fn bad_format_rejected() {
        assert_eq!(
            validate_template("{date}", "%Q"),
            Err(CaptionError::InvalidDateFormat("%Q".into()))
        );
        assert!(validate_template("Song of Today: {date}", "%Y-%m-%d").is_ok());
    }

    #[test]
    fn today_is_date_part_of_now() {
        struct At(NaiveDateTime);
        impl Clock for At {
            fn now(&self) -> NaiveDateTime {
                self.0
            }
        }
        let clock = At(may_first().and_hms_opt(23, 59, 0).unwrap());
        assert_eq!(clock.today(), may_first());
    }
}
