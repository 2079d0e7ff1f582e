//! Nagios check for the Ganeti daemons on this node
//!
//! Runs locally on every cluster node. Figures out which daemons this
//! node is supposed to be running (cluster master or not, systemd or SysV
//! init, Ganeti 2.x or 3.x) and alerts when any of them is not up.

use structopt::StructOpt;

use sysadmin_plugins::check::{self, CheckResult, Observation, Thresholds};
use sysadmin_plugins::ganeti::{self, GanetiError, InitSystem, NodeInfo, ServiceReport};

const SERVICE: &str = "GANETI";

/// Check Ganeti service status
#[derive(StructOpt, Debug)]
#[structopt(name = "check-ganeti (part of sysadmin-plugins)")]
struct Args {
    #[structopt(short = "v", long = "verbose", help = "increase output verbosity")]
    verbose: bool,
}

/// Probe every expected daemon, folding the results into one report
fn survey(info: &NodeInfo, verbose: bool) -> Result<ServiceReport, GanetiError> {
    let services = ganeti::expected_services(info.role, info.init_system(), info.ganeti_major);
    match info.init_system() {
        InitSystem::Systemd => {
            services
                .iter()
                .try_fold(ServiceReport::default(), |report, &service| {
                    let state = ganeti::systemd_substate(service)?;
                    if verbose {
                        println!("{}: {}", service, state);
                    }
                    Ok(report.record(service, state == "running", &state))
                })
        }
        InitSystem::SysvInit => {
            let transcript = ganeti::initd_status()?;
            if verbose {
                println!("{}", transcript);
            }
            Ok(services
                .iter()
                .fold(ServiceReport::default(), |report, &service| {
                    let running = ganeti::initd_reports_running(&transcript, service);
                    report.record(service, running, transcript.trim())
                }))
        }
    }
}

fn main() {
    let args = Args::from_args();

    let info = match NodeInfo::load() {
        Ok(info) => info,
        Err(e) => CheckResult::unknown(SERVICE, &e.to_string()).exit(),
    };
    if args.verbose {
        println!("{:?}", info);
    }

    let report = match survey(&info, args.verbose) {
        Ok(report) => report,
        Err(e) => CheckResult::critical(SERVICE, &e.to_string()).exit(),
    };

    let observation = if report.is_healthy() {
        Observation::ok(format!(
            "{} service(s) active on {} node",
            report.active, info.role
        ))
    } else {
        Observation::failed(report.failure_summary())
    };

    check::evaluate(SERVICE, &observation, &Thresholds::default()).exit();
}
