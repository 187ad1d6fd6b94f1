//! Header label naming the dashboard location and the current date.

use std::fmt;

use chrono::{DateTime, Locale, TimeZone};
use serde::{Deserialize, Serialize};

/// Location shown when none is configured.
pub const DEFAULT_LOCATION: &str = "Semarang, Indonesia";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Languages the date label can be written in.
pub enum LabelLocale {
    /// Bahasa Indonesia, e.g. "Senin, 19 Oktober 2026".
    #[default]
    Indonesian,
    /// US English, e.g. "Monday, 19 October 2026".
    English,
}

impl LabelLocale {
    fn chrono_locale(self) -> Locale {
        match self {
            LabelLocale::Indonesian => Locale::id_ID,
            LabelLocale::English => Locale::en_US,
        }
    }
}

/// Date label computed once when the dashboard opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLabel(String);

impl DateLabel {
    /// Build the label for `now`, prefixed with `location` when one is given.
    #[must_use]
    pub fn new<Tz>(now: &DateTime<Tz>, location: Option<&str>, locale: LabelLocale) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let date = now
            .format_localized("%A, %d %B %Y", locale.chrono_locale())
            .to_string();

        match location.map(str::trim) {
            Some(place) if !place.is_empty() => Self(format!("📍 {place}  •  {date}")),
            _ => Self(date),
        }
    }

    /// The label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateLabel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
