//! Checks and chores for the machines we babysit
//!
//! Everything in here backs one of the binaries in `src/bin`: Nagios-style
//! health checks (Foreman, Ganeti, Monetra) plus a handful of one-shot
//! reporting scripts (release watchers, database sizes, UniFi utilities).
//! See the [`scripts`](scripts/index.html) module for a rundown of each
//! installed binary.
//!
//! The checks all speak the same protocol: print exactly one
//! `SERVICE SEVERITY - details` line and exit with the matching Nagios
//! status code. The shared classification logic lives in [`check`].

use std::fmt;
use std::process;
use std::str::FromStr;

use serde::Deserialize;

pub mod check;
pub mod ganeti;
pub mod scripts;
pub mod unifi;

/// Nagios service status, ordered by severity
///
/// The variant order is load-bearing: `Ord` on this enum is how checks
/// combine multiple observations (`max` of two statuses is the worse one),
/// and the discriminant is the process exit code the monitoring agent
/// expects.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// The exit code Nagios assigns to this severity
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    /// Terminate the process, reporting this status to the monitoring agent
    pub fn exit(self) -> ! {
        process::exit(self.code())
    }

    /// Legal values for status-valued command line flags
    pub fn str_values() -> [&'static str; 4] {
        ["ok", "warning", "critical", "unknown"]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match *self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        write!(f, "{}", label)
    }
}

/// Error for strings that don't name a [`Status`]
#[derive(Debug, PartialEq)]
pub struct ParseStatusError {
    input: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "'{}' is not a status, expected one of ok, warning, critical, unknown",
            self.input
        )
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Status, ParseStatusError> {
        match s {
            "ok" => Ok(Status::Ok),
            "warning" => Ok(Status::Warning),
            "critical" => Ok(Status::Critical),
            "unknown" => Ok(Status::Unknown),
            _ => Err(ParseStatusError { input: s.into() }),
        }
    }
}

#[cfg(test)]
mod test {
    use std::cmp::max;
    use std::str::FromStr;

    use super::Status;

    #[test]
    fn exit_codes_follow_the_nagios_convention() {
        assert_eq!(Status::Ok.code(), 0);
        assert_eq!(Status::Warning.code(), 1);
        assert_eq!(Status::Critical.code(), 2);
        assert_eq!(Status::Unknown.code(), 3);
    }

    #[test]
    fn severity_order_matches_exit_codes() {
        assert!(Status::Ok < Status::Warning);
        assert!(Status::Warning < Status::Critical);
        assert!(Status::Critical < Status::Unknown);
        assert_eq!(max(Status::Ok, Status::Critical), Status::Critical);
    }

    #[test]
    fn parses_the_lowercase_names() {
        for name in &Status::str_values() {
            Status::from_str(name).unwrap();
        }
        assert_eq!(Status::from_str("warning"), Ok(Status::Warning));
        assert!(Status::from_str("WARN").is_err());
    }

    #[test]
    fn labels_are_uppercase() {
        assert_eq!(Status::Critical.to_string(), "CRITICAL");
        assert_eq!(Status::Ok.to_string(), "OK");
    }
}
