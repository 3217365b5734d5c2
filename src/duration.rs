//! ISO-8601 duration parsing and display.
//!
//! Result values of type `duration` arrive as ISO-8601 strings such as
//! `P1DT2H30M15.5S`. The dashboard shows them as `H:MM:SS.ffffff`, with a
//! day prefix when the duration spans at least one day.
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static ISO8601_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<sign>[-+]?)P(?:(?P<days>\d+(?:\.\d+)?)D)?(?:T(?:(?P<hours>\d+(?:\.\d+)?)H)?(?:(?P<minutes>\d+(?:\.\d+)?)M)?(?:(?P<seconds>\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("valid regex")
});

/// Error returned when a string is not an ISO-8601 duration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ISO-8601 duration: {input:?}")]
pub struct DurationParseError {
    pub input: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

/// A decoded ISO-8601 duration. All components are non-negative; the
/// direction is carried by `sign`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Duration {
    pub sign: Sign,
    pub days: f64,
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl Duration {
    /// Parse `[sign]P[nD][T[nH][nM][nS]]`. Omitted components are zero.
    pub fn parse(text: &str) -> Result<Self, DurationParseError> {
        let caps = ISO8601_DURATION_RE
            .captures(text)
            .ok_or_else(|| DurationParseError {
                input: text.to_string(),
            })?;

        let component = |name: &str| -> f64 {
            caps.name(name)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0.0)
        };

        let sign = match caps.name("sign").map(|m| m.as_str()) {
            Some("-") => Sign::Minus,
            _ => Sign::Plus,
        };

        Ok(Self {
            sign,
            days: component("days"),
            hours: component("hours"),
            minutes: component("minutes"),
            seconds: component("seconds"),
        })
    }

    /// Signed length of the duration in seconds.
    pub fn total_seconds(&self) -> f64 {
        let magnitude =
            self.days * 86_400.0 + self.hours * 3_600.0 + self.minutes * 60.0 + self.seconds;
        match self.sign {
            Sign::Plus => magnitude,
            Sign::Minus => -magnitude,
        }
    }

    /// Human-readable form, e.g. `1 day 2:30:15.500000`.
    ///
    /// Components are shown as given, not normalized: `PT90M` prints as
    /// `0:90:00.000000`.
    pub fn format(&self) -> String {
        let mut out = String::new();

        if self.sign == Sign::Minus {
            out.push('-');
        }

        if self.days > 0.0 {
            let plural = if self.days > 1.0 { "s" } else { "" };
            out.push_str(&format!("{} day{plural} ", self.days));
        }

        let whole_seconds = self.seconds.floor();
        // Rounding can reach a full second; keep the suffix at six digits.
        let micros = (((self.seconds - whole_seconds) * 1_000_000.0).round() as u64).min(999_999);

        out.push_str(&format!(
            "{}:{:0>2}:{:0>2}.{micros:06}",
            self.hours, self.minutes, whole_seconds
        ));
        out
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
