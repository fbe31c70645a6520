//! Display modes and their timing settings.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A mutually exclusive content generator for the display.
///
/// The scheduler holds an `Option<Mode>`; `None` means nothing is driving
/// the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Wall-clock time, refreshed every second.
    Clock,
    /// Randomly chosen flight codes from a fixed candidate set.
    #[serde(rename = "flight")]
    FlightMock,
    /// Canadian airport ICAO codes in a fixed rotation.
    #[serde(rename = "airports")]
    AirportCycle,
}

impl Mode {
    /// Human-readable name used in log lines.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Clock => "Clock",
            Self::FlightMock => "Flight tracking",
            Self::AirportCycle => "Airport cycling",
        }
    }

    /// Short identifier used in URLs and CLI arguments.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::FlightMock => "flight",
            Self::AirportCycle => "airports",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clock" | "time" => Ok(Self::Clock),
            "flight" | "flights" => Ok(Self::FlightMock),
            "airports" | "airport" => Ok(Self::AirportCycle),
            other => Err(format!(
                "Unknown mode '{other}'. Expected one of: clock, flight, airports"
            )),
        }
    }
}

/// Period between airport changes.
///
/// Restricted to the four choices the control surface offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CycleInterval {
    /// 2 minutes
    #[default]
    #[serde(rename = "2m")]
    TwoMinutes,
    /// 5 minutes
    #[serde(rename = "5m")]
    FiveMinutes,
    /// 15 minutes
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// 30 minutes
    #[serde(rename = "30m")]
    ThirtyMinutes,
}

impl CycleInterval {
    /// Every selectable interval, shortest first.
    pub const ALL: [Self; 4] = [
        Self::TwoMinutes,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
    ];

    /// Interval length as a [`Duration`].
    #[must_use]
    pub const fn duration(self) -> Duration {
        Duration::from_secs(self.minutes() * 60)
    }

    /// Interval length in whole minutes.
    #[must_use]
    pub const fn minutes(self) -> u64 {
        match self {
            Self::TwoMinutes => 2,
            Self::FiveMinutes => 5,
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
        }
    }

    /// Looks up an interval by its length in milliseconds.
    #[must_use]
    pub fn from_millis(millis: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.duration().as_millis() == u128::from(millis))
    }
}

impl fmt::Display for CycleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} minutes", self.minutes())
    }
}

impl FromStr for CycleInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        let minutes = value
            .strip_suffix("minutes")
            .or_else(|| value.strip_suffix("min"))
            .or_else(|| value.strip_suffix('m'))
            .map(str::trim);

        let parsed = match minutes {
            Some(m) => m.parse::<u64>().ok().and_then(|m| {
                Self::ALL.into_iter().find(|interval| interval.minutes() == m)
            }),
            None => value.parse::<u64>().ok().and_then(Self::from_millis),
        };

        parsed.ok_or_else(|| {
            format!("Invalid interval '{s}'. Expected one of: 2m, 5m, 15m, 30m")
        })
    }
}

/// Textual template for clock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClockFormat {
    /// 24-hour `HH:MM`
    #[default]
    #[serde(rename = "HH:MM")]
    HourMinute,
    /// 24-hour `HH:MM:SS`
    #[serde(rename = "HH:MM:SS")]
    HourMinuteSecond,
    /// 12-hour `h:MM AM/PM`
    #[serde(rename = "h:MM A")]
    TwelveHour,
}

impl ClockFormat {
    /// The template string as shown to users.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::HourMinute => "HH:MM",
            Self::HourMinuteSecond => "HH:MM:SS",
            Self::TwelveHour => "h:MM A",
        }
    }

    /// Renders a time of day with this template.
    ///
    /// ```
    /// use chrono::NaiveTime;
    /// use splitflap_control::models::ClockFormat;
    ///
    /// let t = NaiveTime::from_hms_opt(14, 5, 9).unwrap();
    /// assert_eq!(ClockFormat::HourMinute.render(&t), "14:05");
    /// assert_eq!(ClockFormat::TwelveHour.render(&t), "2:05 PM");
    /// ```
    #[must_use]
    pub fn render<T: Timelike>(self, time: &T) -> String {
        match self {
            Self::HourMinute => format!("{:02}:{:02}", time.hour(), time.minute()),
            Self::HourMinuteSecond => format!(
                "{:02}:{:02}:{:02}",
                time.hour(),
                time.minute(),
                time.second()
            ),
            Self::TwelveHour => {
                let (pm, hour) = time.hour12();
                let suffix = if pm { "PM" } else { "AM" };
                format!("{}:{:02} {}", hour, time.minute(), suffix)
            }
        }
    }
}

impl fmt::Display for ClockFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template())
    }
}

impl FromStr for ClockFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "HH:MM" | "hh:mm" | "24h" => Ok(Self::HourMinute),
            "HH:MM:SS" | "hh:mm:ss" | "24h-seconds" => Ok(Self::HourMinuteSecond),
            "h:MM A" | "h:mm a" | "12h" => Ok(Self::TwelveHour),
            other => Err(format!(
                "Unknown clock format '{other}'. Expected one of: HH:MM, HH:MM:SS, h:MM A"
            )),
        }
    }
}
