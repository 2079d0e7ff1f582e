//! Nagios check for the status of our Foreman-managed hosts
//!
//! Reads the dashboard host counts and alerts on hosts in error state or
//! out of sync; a healthy dashboard can still warn or go critical on
//! response time if `--warn`/`--critical` are set.

use std::time::Duration;

use structopt::StructOpt;

use sysadmin_plugins::check::{self, CheckResult, Observation, Thresholds};

mod api;

use crate::api::{Dashboard, Foreman, HostFilter};

const SERVICE: &str = "FOREMAN";

/// More than this many out-of-sync hosts is worth waking someone up
const OUT_OF_SYNC_THRESHOLD: i64 = 4;

/// Check status of Foreman hosts
#[derive(StructOpt, Debug)]
#[structopt(name = "check-foreman (part of sysadmin-plugins)")]
struct Args {
    #[structopt(short = "H", long = "host", help = "hostname or IP address of server")]
    host: String,
    #[structopt(
        short = "u",
        long = "user",
        help = "username for authentication to server. Use a low-privilege admin account"
    )]
    user: String,
    #[structopt(
        short = "p",
        long = "password",
        help = "password for authentication to server"
    )]
    password: String,
    #[structopt(
        short = "t",
        long = "timeout",
        default_value = "10",
        help = "connection timeout in seconds"
    )]
    timeout: f64,
    #[structopt(
        short = "w",
        long = "warn",
        default_value = "0",
        help = "warning threshold for request duration in seconds"
    )]
    warn: f64,
    #[structopt(
        short = "c",
        long = "critical",
        default_value = "0",
        help = "critical threshold for request duration in seconds"
    )]
    critical: f64,
    #[structopt(short = "v", long = "verbose", help = "increase output verbosity")]
    verbose: bool,
}

/// How the dashboard counts classify, before looking up any hostnames
#[derive(Debug, PartialEq)]
enum Standing {
    Bad(i64),
    OutOfSync(i64),
    Healthy,
}

fn classify(dashboard: &Dashboard) -> Standing {
    if dashboard.bad_hosts != 0 {
        Standing::Bad(dashboard.bad_hosts)
    } else if dashboard.out_of_sync_hosts > OUT_OF_SYNC_THRESHOLD {
        Standing::OutOfSync(dashboard.out_of_sync_hosts)
    } else {
        Standing::Healthy
    }
}

fn observe(
    foreman: &Foreman,
    dashboard: &Dashboard,
    elapsed: Duration,
    verbose: bool,
) -> Observation {
    match classify(dashboard) {
        Standing::Bad(count) => {
            let names = hostnames_or_exit(foreman, HostFilter::Bad, verbose);
            Observation::failed(format!("{} host(s) in error state: {}", count, names))
        }
        Standing::OutOfSync(count) => {
            let names = hostnames_or_exit(foreman, HostFilter::OutOfSync, verbose);
            Observation::degraded(format!("{} host(s) out-of-sync: {}", count, names))
        }
        Standing::Healthy => Observation::ok(format!(
            "{} host(s) OK of {} total",
            dashboard.ok_hosts, dashboard.total_hosts
        ))
        .timed(elapsed),
    }
}

fn hostnames_or_exit(foreman: &Foreman, filter: HostFilter, verbose: bool) -> String {
    match foreman.hostnames(filter) {
        Ok(names) => names,
        Err(e) => {
            if verbose {
                println!("!! {}", e);
            }
            CheckResult::critical(SERVICE, &e.to_string()).exit();
        }
    }
}

fn main() {
    let args = Args::from_args();
    if args.verbose {
        println!("{:?}", args);
    }

    let foreman = match Foreman::new(&args.host, &args.user, &args.password, args.timeout) {
        Ok(foreman) => foreman,
        Err(e) => CheckResult::critical(SERVICE, &e.to_string()).exit(),
    };

    let (dashboard, elapsed) = match foreman.dashboard() {
        Ok(result) => result,
        Err(e) => {
            if args.verbose {
                println!("!! {}", e);
            }
            CheckResult::critical(SERVICE, &e.to_string()).exit();
        }
    };

    let thresholds = Thresholds::new(args.warn, args.critical);
    if args.verbose {
        if thresholds.configured() {
            println!(
                "Request completed in {:.3} seconds response time",
                elapsed.as_secs_f64()
            );
        }
        println!(
            "total: {} ok: {} oos: {} bad: {}",
            dashboard.total_hosts,
            dashboard.ok_hosts,
            dashboard.out_of_sync_hosts,
            dashboard.bad_hosts
        );
    }

    let observation = observe(&foreman, &dashboard, elapsed, args.verbose);
    check::evaluate(SERVICE, &observation, &thresholds).exit();
}

#[cfg(test)]
mod test {
    use structopt::StructOpt;

    use super::{classify, Args, Standing};
    use crate::api::Dashboard;

    fn dashboard(total: i64, ok: i64, oos: i64, bad: i64) -> Dashboard {
        Dashboard {
            total_hosts: total,
            ok_hosts: ok,
            out_of_sync_hosts: oos,
            bad_hosts: bad,
        }
    }

    #[test]
    fn defaults() {
        let args = Args::from_iter(vec![
            "check-foreman",
            "-H",
            "foreman.example.net",
            "-u",
            "monitor",
            "-p",
            "hunter2",
        ]);
        assert_eq!(args.timeout, 10.0);
        assert_eq!(args.warn, 0.0);
        assert_eq!(args.critical, 0.0);
        assert!(!args.verbose);
    }

    #[test]
    fn bad_hosts_win_over_everything() {
        assert_eq!(classify(&dashboard(35, 20, 14, 1)), Standing::Bad(1));
    }

    #[test]
    fn out_of_sync_needs_more_than_the_fixed_threshold() {
        assert_eq!(classify(&dashboard(35, 31, 4, 0)), Standing::Healthy);
        assert_eq!(classify(&dashboard(35, 30, 5, 0)), Standing::OutOfSync(5));
    }

    #[test]
    fn all_synced_is_healthy() {
        assert_eq!(classify(&dashboard(35, 35, 0, 0)), Standing::Healthy);
    }
}
