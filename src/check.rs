//! Threshold evaluation shared by the service checks
//!
//! Each check probes its service exactly once and boils the result down to
//! an [`Observation`]: what state the service is in, a one-line summary for
//! the happy path, and (for network probes) how long the request took. This
//! module turns that observation plus the operator's `--warn`/`--critical`
//! flags into the single status line the monitoring agent reads.
//!
//! The severity ladder is fixed: a hard failure is CRITICAL no matter how
//! fast the probe was, a degraded condition is WARNING on its own, and only
//! a healthy service gets classified by response time.

use std::time::Duration;

use crate::Status;

/// Response-time thresholds from the command line, in seconds
///
/// Zero means the threshold is not configured. `warn <= crit` is not
/// validated; the comparisons in [`evaluate`] run in declaration order
/// regardless of how the two relate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thresholds {
    pub warn: f64,
    pub crit: f64,
}

impl Thresholds {
    pub fn new(warn: f64, crit: f64) -> Thresholds {
        Thresholds { warn, crit }
    }

    /// True when either threshold has been set
    pub fn configured(&self) -> bool {
        self.warn != 0.0 || self.crit != 0.0
    }
}

/// The domain verdict a probe reached, before any timing is considered
#[derive(Clone, Debug, PartialEq)]
pub enum Health {
    /// Everything the probe looked at was fine
    Ok,
    /// A secondary condition tripped, worth a WARNING on its own
    Degraded(String),
    /// A hard failure, CRITICAL regardless of thresholds
    Failed(String),
}

/// Normalized result of one probe
#[derive(Clone, Debug)]
pub struct Observation {
    pub health: Health,
    /// Summary used when the service is healthy, e.g. "34 host(s) OK of 35 total"
    pub summary: String,
    /// Wall time the probe took; `None` for local, untimed probes
    pub elapsed: Option<Duration>,
}

impl Observation {
    pub fn ok<S: Into<String>>(summary: S) -> Observation {
        Observation {
            health: Health::Ok,
            summary: summary.into(),
            elapsed: None,
        }
    }

    pub fn degraded<S: Into<String>>(detail: S) -> Observation {
        Observation {
            health: Health::Degraded(detail.into()),
            summary: String::new(),
            elapsed: None,
        }
    }

    pub fn failed<S: Into<String>>(detail: S) -> Observation {
        Observation {
            health: Health::Failed(detail.into()),
            summary: String::new(),
            elapsed: None,
        }
    }

    /// Attach the probe duration
    pub fn timed(mut self, elapsed: Duration) -> Observation {
        self.elapsed = Some(elapsed);
        self
    }
}

/// The line and exit code a check run ends with
#[must_use]
#[derive(Debug, PartialEq)]
pub struct CheckResult {
    pub status: Status,
    pub message: String,
}

impl CheckResult {
    pub fn new(service: &str, status: Status, detail: &str) -> CheckResult {
        CheckResult {
            status,
            message: format!("{} {} - {}", service, status, detail),
        }
    }

    /// Shorthand for probe failures that short-circuit the evaluator
    pub fn critical(service: &str, detail: &str) -> CheckResult {
        CheckResult::new(service, Status::Critical, detail)
    }

    /// Shorthand for local misconfiguration (unreadable state files etc.)
    pub fn unknown(service: &str, detail: &str) -> CheckResult {
        CheckResult::new(service, Status::Unknown, detail)
    }

    /// Print the status line and terminate with the matching exit code
    pub fn exit(self) -> ! {
        println!("{}", self.message);
        self.status.exit()
    }
}

/// Map an observation onto the severity ladder
///
/// Domain failures win over everything, the degraded condition wins over
/// timing, and the response-time comparisons run literally in the order
/// written: not configured, `<= warn`, `<= crit`, over. With `warn` unset
/// but `crit` set the first comparison can never hold, so any measured
/// duration under `crit` lands in the WARNING branch; that matches the
/// scripts this grew out of and is left as-is.
pub fn evaluate(service: &str, observation: &Observation, thresholds: &Thresholds) -> CheckResult {
    match observation.health {
        Health::Failed(ref detail) => return CheckResult::new(service, Status::Critical, detail),
        Health::Degraded(ref detail) => return CheckResult::new(service, Status::Warning, detail),
        Health::Ok => {}
    }

    let elapsed = match (thresholds.configured(), observation.elapsed) {
        (true, Some(elapsed)) => elapsed.as_secs_f64(),
        _ => return CheckResult::new(service, Status::Ok, &observation.summary),
    };

    let timing = format!("in {:.3} seconds response time", elapsed);
    if elapsed <= thresholds.warn {
        let detail = format!("{} {}", observation.summary, timing);
        CheckResult::new(service, Status::Ok, &detail)
    } else if elapsed <= thresholds.crit {
        let detail = format!(
            "{} {} (> {} seconds)",
            observation.summary, timing, thresholds.warn
        );
        CheckResult::new(service, Status::Warning, &detail)
    } else {
        let detail = format!(
            "{} {} (> {} seconds)",
            observation.summary, timing, thresholds.crit
        );
        CheckResult::new(service, Status::Critical, &detail)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{evaluate, CheckResult, Observation, Thresholds};
    use crate::Status;

    fn healthy(elapsed_secs: f64) -> Observation {
        Observation::ok("34 host(s) OK of 35 total").timed(Duration::from_secs_f64(elapsed_secs))
    }

    #[test]
    fn unconfigured_thresholds_skip_the_timing_clause() {
        let result = evaluate("FOREMAN", &healthy(123.0), &Thresholds::default());
        assert_eq!(result.status, Status::Ok);
        assert_eq!(result.message, "FOREMAN OK - 34 host(s) OK of 35 total");
        assert!(!result.message.contains("seconds"));
    }

    #[test]
    fn untimed_probes_report_plain_ok_even_with_thresholds() {
        let observation = Observation::ok("5 service(s) active on master node");
        let result = evaluate("GANETI", &observation, &Thresholds::new(5.0, 10.0));
        assert_eq!(result.status, Status::Ok);
        assert_eq!(
            result.message,
            "GANETI OK - 5 service(s) active on master node"
        );
    }

    #[test]
    fn fast_response_is_ok() {
        let result = evaluate("FOREMAN", &healthy(3.0), &Thresholds::new(5.0, 10.0));
        assert_eq!(result.status, Status::Ok);
        assert!(result.message.contains("in 3.000 seconds response time"));
    }

    #[test]
    fn slow_response_warns_and_names_the_warn_threshold() {
        let result = evaluate("FOREMAN", &healthy(7.0), &Thresholds::new(5.0, 10.0));
        assert_eq!(result.status, Status::Warning);
        assert!(result.message.contains("in 7.000 seconds response time"));
        assert!(result.message.ends_with("(> 5 seconds)"));
    }

    #[test]
    fn very_slow_response_is_critical_and_names_the_crit_threshold() {
        let result = evaluate("FOREMAN", &healthy(15.0), &Thresholds::new(5.0, 10.0));
        assert_eq!(result.status, Status::Critical);
        assert!(result.message.contains("in 15.000 seconds response time"));
        assert!(result.message.ends_with("(> 10 seconds)"));
    }

    #[test]
    fn boundary_durations_take_the_lower_severity() {
        let thresholds = Thresholds::new(5.0, 10.0);
        assert_eq!(evaluate("X", &healthy(5.0), &thresholds).status, Status::Ok);
        assert_eq!(
            evaluate("X", &healthy(10.0), &thresholds).status,
            Status::Warning
        );
    }

    #[test]
    fn domain_failure_beats_any_thresholds() {
        let observation =
            Observation::failed("1 host(s) in error state: db1").timed(Duration::from_secs(1));
        let result = evaluate("FOREMAN", &observation, &Thresholds::new(5.0, 10.0));
        assert_eq!(result.status, Status::Critical);
        assert_eq!(
            result.message,
            "FOREMAN CRITICAL - 1 host(s) in error state: db1"
        );
    }

    #[test]
    fn degraded_condition_warns_regardless_of_timing() {
        let observation =
            Observation::degraded("6 host(s) out-of-sync: web1 web2").timed(Duration::from_secs(1));
        let result = evaluate("FOREMAN", &observation, &Thresholds::new(5.0, 10.0));
        assert_eq!(result.status, Status::Warning);
        assert!(result.message.contains("out-of-sync"));
        assert!(!result.message.contains("seconds"));
    }

    #[test]
    fn crit_only_thresholds_follow_the_literal_comparison_order() {
        // warn stays 0, so even a fast probe skips the OK branch
        let result = evaluate("MONETRA", &healthy(3.0), &Thresholds::new(0.0, 5.0));
        assert_eq!(result.status, Status::Warning);
        assert!(result.message.ends_with("(> 0 seconds)"));
    }

    #[test]
    fn inverted_thresholds_are_not_corrected() {
        let thresholds = Thresholds::new(10.0, 5.0);
        // under warn is still OK even though it is over crit
        assert_eq!(evaluate("X", &healthy(7.0), &thresholds).status, Status::Ok);
        let result = evaluate("X", &healthy(12.0), &thresholds);
        assert_eq!(result.status, Status::Critical);
        assert!(result.message.ends_with("(> 5 seconds)"));
    }

    #[test]
    fn probe_failures_build_a_critical_result_directly() {
        let result = CheckResult::critical("MONETRA", "connection timed out after 10s");
        assert_eq!(result.status, Status::Critical);
        assert_eq!(
            result.message,
            "MONETRA CRITICAL - connection timed out after 10s"
        );
    }
}
