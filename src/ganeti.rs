//! Inspect the Ganeti daemons on the local node
//!
//! Which daemons have to be running depends on three things read off the
//! local disk: the OS major version (systemd vs SysV init), whether this
//! node is the cluster master, and the Ganeti major version (2.x still
//! ships ganeti-confd). The structs and parsers here keep all of that
//! testable without a cluster; only [`NodeInfo::load`], [`systemd_substate`]
//! and [`initd_status`] touch the machine.

use std::fmt;
use std::fs;
use std::io;
use std::process::Command;

use regex::Regex;

pub const REDHAT_RELEASE: &str = "/etc/redhat-release";
pub const SSCONF_RELEASE: &str = "/var/lib/ganeti/ssconf_release_version";
pub const SSCONF_MASTER_NODE: &str = "/var/lib/ganeti/ssconf_master_node";

/// Errors from reading or interpreting the node's state files
#[derive(Debug)]
pub enum GanetiError {
    Io(io::Error),
    /// A state file existed but didn't hold what we expected
    Parse(String),
}

impl fmt::Display for GanetiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GanetiError::Io(ref e) => write!(f, "{}", e),
            GanetiError::Parse(ref e) => write!(f, "{}", e),
        }
    }
}

impl From<io::Error> for GanetiError {
    fn from(e: io::Error) -> GanetiError {
        GanetiError::Io(e)
    }
}

/// This node's place in the cluster
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Role {
    Master,
    NonMaster,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Role::Master => write!(f, "master"),
            Role::NonMaster => write!(f, "non-master"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InitSystem {
    Systemd,
    SysvInit,
}

/// Major version as the first digit found on the line
///
/// "CentOS Linux release 7.9.2009 (Core)" parses as 7. Double-digit
/// majors therefore come out as their first digit, which is how the
/// check has always read these files.
pub fn major_version(line: &str) -> Option<u32> {
    line.chars().find_map(|c| c.to_digit(10))
}

/// EL7 and later boot with systemd, EL6 and earlier with SysV init
pub fn init_system(os_major: u32) -> InitSystem {
    if os_major >= 7 {
        InitSystem::Systemd
    } else {
        InitSystem::SysvInit
    }
}

/// The daemons that must be running for this node to be healthy
pub fn expected_services(role: Role, init: InitSystem, ganeti_major: u32) -> Vec<&'static str> {
    let mut services = match (init, role) {
        (InitSystem::Systemd, Role::Master) => {
            vec!["ganeti-luxid", "ganeti-noded", "ganeti-rapi", "ganeti-wconfd"]
        }
        (InitSystem::Systemd, Role::NonMaster) => vec!["ganeti-noded"],
        (InitSystem::SysvInit, Role::Master) => {
            vec!["ganeti-masterd", "ganeti-noded", "ganeti-rapi"]
        }
        (InitSystem::SysvInit, Role::NonMaster) => vec!["ganeti-noded"],
    };
    // 2.x still runs the config daemon
    if init == InitSystem::Systemd && ganeti_major == 2 {
        services.insert(0, "ganeti-confd");
    }
    services
}

/// Pull the state out of `systemctl show <unit> -p SubState` output
///
/// The output is a single `SubState=running` line; anything else comes
/// back verbatim so it can show up in the alert text.
pub fn parse_substate(output: &str) -> String {
    match output.trim().splitn(2, '=').nth(1) {
        Some(state) => state.to_lowercase(),
        None => output.trim().to_lowercase(),
    }
}

/// Whether a SysV `service ganeti status` transcript reports `service` up
pub fn initd_reports_running(status_output: &str, service: &str) -> bool {
    let pattern = format!("{}.+is running", regex::escape(service));
    // the pattern is built from a fixed service name, it always compiles
    Regex::new(&pattern)
        .map(|re| re.is_match(status_output))
        .unwrap_or(false)
}

/// A daemon that was not in its expected running state
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceFailure {
    pub name: String,
    pub state: String,
}

/// Tally of one pass over the expected daemons
///
/// Built up by folding [`record`](ServiceReport::record) over each probed
/// service, so the caller owns the accumulation instead of the probe
/// mutating shared counters.
#[derive(Debug, Default, PartialEq)]
pub struct ServiceReport {
    pub active: usize,
    pub failures: Vec<ServiceFailure>,
}

impl ServiceReport {
    pub fn record(mut self, service: &str, running: bool, state: &str) -> ServiceReport {
        if running {
            self.active += 1;
        } else {
            self.failures.push(ServiceFailure {
                name: service.into(),
                state: state.into(),
            });
        }
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.failures.is_empty()
    }

    /// `"ganeti-rapi dead; ganeti-wconfd failed;"` for the alert line
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{} {};", f.name, f.state))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Everything about the local node the check needs, read from disk
#[derive(Debug)]
pub struct NodeInfo {
    pub os_major: u32,
    pub ganeti_major: u32,
    pub role: Role,
}

impl NodeInfo {
    pub fn load() -> Result<NodeInfo, GanetiError> {
        let os_release = fs::read_to_string(REDHAT_RELEASE)?;
        let os_major = major_version(&os_release).ok_or_else(|| {
            GanetiError::Parse(format!("no version digit in {}", REDHAT_RELEASE))
        })?;

        let ganeti_release = fs::read_to_string(SSCONF_RELEASE)?;
        let ganeti_major = major_version(&ganeti_release).ok_or_else(|| {
            GanetiError::Parse(format!("no version digit in {}", SSCONF_RELEASE))
        })?;

        let master_node = fs::read_to_string(SSCONF_MASTER_NODE)?;
        let hostname = nix::unistd::gethostname()
            .map_err(|e| GanetiError::Parse(format!("cannot read hostname: {}", e)))?;
        let role = if hostname.to_string_lossy() == master_node.trim() {
            Role::Master
        } else {
            Role::NonMaster
        };

        Ok(NodeInfo {
            os_major,
            ganeti_major,
            role,
        })
    }

    pub fn init_system(&self) -> InitSystem {
        init_system(self.os_major)
    }
}

/// Ask systemd for one unit's SubState
pub fn systemd_substate(service: &str) -> Result<String, GanetiError> {
    let output = Command::new("systemctl")
        .args(&["show", service, "-p", "SubState"])
        .output()?;
    Ok(parse_substate(&String::from_utf8_lossy(&output.stdout)))
}

/// Run the SysV status command once; callers grep it per service
pub fn initd_status() -> Result<String, GanetiError> {
    let output = Command::new("service").args(&["ganeti", "status"]).output()?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn major_version_takes_the_first_digit() {
        assert_eq!(major_version("CentOS Linux release 7.9.2009 (Core)"), Some(7));
        assert_eq!(major_version("2.16.0"), Some(2));
        // double-digit majors read as their first digit, same as always
        assert_eq!(major_version("Rocky Linux release 10.0"), Some(1));
        assert_eq!(major_version("no digits here"), None);
    }

    #[test]
    fn el7_uses_systemd_el6_uses_initd() {
        assert_eq!(init_system(7), InitSystem::Systemd);
        assert_eq!(init_system(9), InitSystem::Systemd);
        assert_eq!(init_system(6), InitSystem::SysvInit);
    }

    #[test]
    fn master_nodes_expect_the_full_daemon_set() {
        assert_eq!(
            expected_services(Role::Master, InitSystem::Systemd, 3),
            vec!["ganeti-luxid", "ganeti-noded", "ganeti-rapi", "ganeti-wconfd"]
        );
        assert_eq!(
            expected_services(Role::NonMaster, InitSystem::Systemd, 3),
            vec!["ganeti-noded"]
        );
    }

    #[test]
    fn ganeti_2_still_runs_confd() {
        let services = expected_services(Role::Master, InitSystem::Systemd, 2);
        assert_eq!(services[0], "ganeti-confd");
        assert_eq!(services.len(), 5);
    }

    #[test]
    fn initd_masters_expect_masterd() {
        assert_eq!(
            expected_services(Role::Master, InitSystem::SysvInit, 2),
            vec!["ganeti-masterd", "ganeti-noded", "ganeti-rapi"]
        );
    }

    #[test]
    fn substate_parsing() {
        assert_eq!(parse_substate("SubState=running\n"), "running");
        assert_eq!(parse_substate("SubState=Dead\n"), "dead");
        assert_eq!(parse_substate("garbage"), "garbage");
    }

    #[test]
    fn initd_transcript_matching() {
        let transcript = "ganeti-noded (pid 1200) is running...\n\
                          ganeti-masterd is stopped\n\
                          ganeti-rapi (pid 1210) is running...\n";
        assert!(initd_reports_running(transcript, "ganeti-noded"));
        assert!(initd_reports_running(transcript, "ganeti-rapi"));
        assert!(!initd_reports_running(transcript, "ganeti-masterd"));
    }

    #[test]
    fn report_accumulates_by_folding() {
        let states = vec![
            ("ganeti-luxid", "running"),
            ("ganeti-noded", "running"),
            ("ganeti-rapi", "dead"),
            ("ganeti-wconfd", "failed"),
        ];
        let report = states
            .into_iter()
            .fold(ServiceReport::default(), |report, (name, state)| {
                report.record(name, state == "running", state)
            });
        assert_eq!(report.active, 2);
        assert!(!report.is_healthy());
        assert_eq!(
            report.failure_summary(),
            "ganeti-rapi dead; ganeti-wconfd failed;"
        );
    }

    #[test]
    fn all_running_is_healthy() {
        let report = ServiceReport::default().record("ganeti-noded", true, "running");
        assert!(report.is_healthy());
        assert_eq!(report.active, 1);
        assert_eq!(report.failure_summary(), "");
    }
}
