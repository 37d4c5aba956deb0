//! Opening hours: time-of-day values, day windows and the open/closed check.
//!
//! Times are kept as whole minutes since midnight. A window whose closing time
//! lies before its opening time crosses midnight and is evaluated on an
//! extended clock where the closing time is shifted by one day.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

const MINUTES_PER_HOUR: u16 = 60;
const HOURS_PER_DAY: u16 = 24;
const MINUTES_PER_DAY: u16 = MINUTES_PER_HOUR * HOURS_PER_DAY;

/// Range separators accepted in `"HH:MM-HH:MM"` strings: hyphen and en dash.
const RANGE_SEPARATORS: [char; 2] = ['-', '\u{2013}'];

/// All days of the week starting on Monday.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised while parsing or evaluating opening hours.
pub enum HoursError {
    /// Text is not a `HH:MM` time or `HH:MM-HH:MM` range.
    #[error("Malformed time: {0:?}")]
    MalformedTime(String),
    /// A weekly schedule has no entry for the requested day.
    #[error("No opening hours for {0}")]
    MissingDay(Weekday),
    /// Slider position outside `1..=1440`.
    #[error("Slider value out of range: {0}")]
    SliderOutOfRange(u16),
    /// Day token is not one of `mon`..`sun`.
    #[error("Unknown day: {0:?}")]
    UnknownDay(String),
}

/// Short lowercase token used for a weekday in data files and on the command line.
#[must_use]
pub fn day_token(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// Parse a day token such as `"mon"` (case-insensitive).
///
/// # Errors
///
/// Returns [`HoursError::UnknownDay`] for anything but the seven tokens.
pub fn parse_day(token: &str) -> Result<Weekday, HoursError> {
    let wanted = token.trim().to_ascii_lowercase();
    WEEK.into_iter()
        .find(|day| day_token(*day) == wanted)
        .ok_or_else(|| HoursError::UnknownDay(token.to_owned()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// Wall-clock time of day with minute resolution, in `00:00..=23:59`.
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight, `00:00`.
    pub const MIDNIGHT: Self = Self(0);

    /// Build a time from hours and minutes; `None` when either is out of range.
    #[must_use]
    pub fn from_hm(hours: u16, minutes: u16) -> Option<Self> {
        (hours < HOURS_PER_DAY && minutes < MINUTES_PER_HOUR)
            .then(|| Self(hours * MINUTES_PER_HOUR + minutes))
    }

    /// Map a time slider position in `1..=1440` to a time of day.
    ///
    /// The last position (1440) wraps to `00:00`.
    ///
    /// # Errors
    ///
    /// Returns [`HoursError::SliderOutOfRange`] outside `1..=1440`.
    pub fn from_slider(value: u16) -> Result<Self, HoursError> {
        if !(1..=MINUTES_PER_DAY).contains(&value) {
            return Err(HoursError::SliderOutOfRange(value));
        }
        let hours = (value / MINUTES_PER_HOUR) % HOURS_PER_DAY;
        let minutes = value % MINUTES_PER_HOUR;
        Ok(Self(hours * MINUTES_PER_HOUR + minutes))
    }

    /// Slider position showing this time; midnight sits at the end of the track.
    #[must_use]
    pub fn to_slider(self) -> u16 {
        if self.0 == 0 { MINUTES_PER_DAY } else { self.0 }
    }

    /// Hour component, `0..=23`.
    #[must_use]
    pub fn hours(self) -> u16 {
        self.0 / MINUTES_PER_HOUR
    }

    /// Minute component, `0..=59`.
    #[must_use]
    pub fn minutes(self) -> u16 {
        self.0 % MINUTES_PER_HOUR
    }

    /// Minutes elapsed since midnight.
    #[must_use]
    pub fn minutes_from_midnight(self) -> u16 {
        self.0
    }

    /// Fractional hours since midnight, e.g. `19:30` is `19.5`.
    #[must_use]
    pub fn as_hours(self) -> f64 {
        f64::from(self.0) / f64::from(MINUTES_PER_HOUR)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:02}:{:02}", self.hours(), self.minutes())
    }
}

impl FromStr for TimeOfDay {
    type Err = HoursError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || HoursError::MalformedTime(text.to_owned());

        let (hours, minutes) = text.trim().split_once(':').ok_or_else(malformed)?;
        let well_formed = (1..=2).contains(&hours.len())
            && minutes.len() == 2
            && hours.bytes().chain(minutes.bytes()).all(|byte| byte.is_ascii_digit());
        if !well_formed {
            return Err(malformed());
        }

        let hours = hours.parse::<u16>().map_err(|_err| malformed())?;
        let minutes = minutes.parse::<u16>().map_err(|_err| malformed())?;
        Self::from_hm(hours, minutes).ok_or_else(malformed)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = HoursError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// Check whether `query` falls inside the window `open_from..=open_until`.
///
/// Both ends are inclusive. When `open_until` is strictly earlier than
/// `open_from` the window crosses midnight: the closing time moves to the next
/// day and a query that fails on its own clock is retried one day later.
/// Equal bounds do not wrap.
#[must_use]
pub fn is_open(open_from: TimeOfDay, open_until: TimeOfDay, query: TimeOfDay) -> bool {
    let day = u32::from(MINUTES_PER_DAY);
    let from = u32::from(open_from.0);
    let query = u32::from(query.0);

    let mut until = u32::from(open_until.0);
    if until < from {
        until += day;
    }

    let window = from..=until;
    if window.contains(&query) {
        return true;
    }
    until > day && window.contains(&(query + day))
}

/// String form of [`is_open`]; the `00:00`/`00:00` pair means closed.
///
/// # Errors
///
/// Returns [`HoursError::MalformedTime`] if any argument is not `HH:MM`.
pub fn is_open_str(open_from: &str, open_until: &str, query: &str) -> Result<bool, HoursError> {
    let hours = DayHours::from_bounds(open_from.parse()?, open_until.parse()?);
    Ok(hours.is_open(query.parse()?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Opening and closing time for one day.
pub struct TimeWindow {
    /// Opening time (inclusive).
    pub from: TimeOfDay,
    /// Closing time (inclusive); earlier than `from` when crossing midnight.
    pub until: TimeOfDay,
}

impl TimeWindow {
    /// See [`is_open`].
    #[must_use]
    pub fn contains(&self, query: TimeOfDay) -> bool {
        is_open(self.from, self.until, query)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} - {}", self.from, self.until)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Opening hours of a single day.
pub enum DayHours {
    /// Closed all day, written as `00:00 - 00:00` in source data.
    Closed,
    /// Open during one window.
    Open(TimeWindow),
}

impl DayHours {
    /// Build day hours from bounds, mapping the midnight/midnight pair to [`DayHours::Closed`].
    #[must_use]
    pub fn from_bounds(from: TimeOfDay, until: TimeOfDay) -> Self {
        if from == TimeOfDay::MIDNIGHT && until == TimeOfDay::MIDNIGHT {
            Self::Closed
        } else {
            Self::Open(TimeWindow { from, until })
        }
    }

    /// Whether the facility is open at `query` on this day.
    #[must_use]
    pub fn is_open(&self, query: TimeOfDay) -> bool {
        match self {
            Self::Closed => false,
            Self::Open(window) => window.contains(query),
        }
    }
}

impl fmt::Display for DayHours {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(formatter, "closed"),
            Self::Open(window) => write!(formatter, "{window}"),
        }
    }
}

impl FromStr for DayHours {
    type Err = HoursError;

    /// Parse `"08:00 - 20:00"`, `"08:00-20:00"` or `"08:00–20:00"`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (from, until) = text
            .split_once(RANGE_SEPARATORS)
            .ok_or_else(|| HoursError::MalformedTime(text.to_owned()))?;
        Ok(Self::from_bounds(from.parse()?, until.parse()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A day of the week plus a time on that day.
pub struct Moment {
    /// Selected day.
    pub day: Weekday,
    /// Selected time.
    pub time: TimeOfDay,
}

impl Moment {
    /// Pair a day with a time.
    #[must_use]
    pub fn new(day: Weekday, time: TimeOfDay) -> Self {
        Self { day, time }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Opening hours of a facility.
pub enum OpeningHours {
    /// Same hours every day.
    Daily(DayHours),
    /// Hours per weekday; a day without an entry is a data error.
    Weekly(HashMap<Weekday, DayHours>),
}

impl OpeningHours {
    /// Hours that apply on `day`.
    ///
    /// # Errors
    ///
    /// Returns [`HoursError::MissingDay`] if a weekly schedule lacks `day`.
    pub fn hours_on(&self, day: Weekday) -> Result<DayHours, HoursError> {
        match self {
            Self::Daily(hours) => Ok(*hours),
            Self::Weekly(days) => days.get(&day).copied().ok_or(HoursError::MissingDay(day)),
        }
    }

    /// Whether the facility is open at `moment`.
    ///
    /// # Errors
    ///
    /// Returns [`HoursError::MissingDay`] if a weekly schedule lacks the day.
    pub fn is_open_at(&self, moment: Moment) -> Result<bool, HoursError> {
        Ok(self.hours_on(moment.day)?.is_open(moment.time))
    }
}
