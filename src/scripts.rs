//! Documentation about the various scripts contained herein
//!
//! - [check-foreman](#check-foreman)
//! - [check-ganeti](#check-ganeti)
//! - [check-monetra](#check-monetra)
//! - [os-release](#os-release)
//! - [db-sizes](#db-sizes)
//! - [unifi-version](#unifi-version)
//! - [unifi-logfile](#unifi-logfile)
//! - [device-report](#device-report)
//!
//! # check-foreman
//!
//! Nagios check. Reads the Foreman dashboard over HTTPS and alerts on
//! hosts in error state (CRITICAL), more than four out-of-sync hosts
//! (WARNING), or slow responses when `--warn`/`--critical` are set.
//!
//! ```plain
//! $ check-foreman --help
//! check-foreman (part of sysadmin-plugins) 0.1.0
//! Check status of Foreman hosts
//!
//! USAGE:
//!     check-foreman [FLAGS] [OPTIONS] --host <host> --user <user> --password <password>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!     -v, --verbose    increase output verbosity
//!
//! OPTIONS:
//!     -c, --critical <critical>    critical threshold for request duration in seconds [default: 0]
//!     -H, --host <host>            hostname or IP address of server
//!     -p, --password <password>    password for authentication to server
//!     -t, --timeout <timeout>      connection timeout in seconds [default: 10]
//!     -u, --user <user>            username for authentication to server. Use a low-privilege
//!                                  admin account
//!     -w, --warn <warn>            warning threshold for request duration in seconds [default: 0]
//! ```
//!
//! # check-ganeti
//!
//! Nagios check, local only. Verifies that every Ganeti daemon this node
//! should be running (by cluster role, init system and Ganeti major
//! version) is actually up.
//!
//! ```plain
//! $ check-ganeti --help
//! check-ganeti (part of sysadmin-plugins) 0.1.0
//! Check Ganeti service status
//!
//! USAGE:
//!     check-ganeti [FLAGS]
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!     -v, --verbose    increase output verbosity
//! ```
//!
//! # check-monetra
//!
//! Nagios check. Posts an MADMIN `chkpwd` transaction to the Monetra
//! transaction port and alerts unless the server answers SUCCESS /
//! INT_SUCCESS; response-time thresholds work as in check-foreman.
//!
//! ```plain
//! $ check-monetra --help
//! check-monetra (part of sysadmin-plugins) 0.1.0
//! Check Monetra Payment Server health
//!
//! USAGE:
//!     check-monetra [FLAGS] [OPTIONS] --host <host> --user <user> --password <password>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!     -v, --verbose    increase output verbosity
//!
//! OPTIONS:
//!     -c, --critical <critical>    critical threshold for request duration in seconds [default: 0]
//!     -H, --host <host>            hostname or IP address of server
//!     -p, --password <password>    password for authentication to server
//!     -t, --timeout <timeout>      connection timeout in seconds [default: 10]
//!     -u, --user <user>            username for authentication to server. Use a low-privilege
//!                                  admin account
//!     -w, --warn <warn>            warning threshold for request duration in seconds [default: 0]
//! ```
//!
//! # os-release
//!
//! Prints when a given Rocky, Alma or CentOS release showed up on the
//! mirrors, with the mirror's timestamp reformatted for humans:
//!
//! ```plain
//! $ os-release -r 9.3
//! Rocky 9.3 was released or updated on November 18, 2023 at 3:04 AM
//! ```
//!
//! # db-sizes
//!
//! Prints per-schema MySQL sizes in MB with a total, using the
//! connection info in `./.my.cnf`:
//!
//! ```plain
//! $ db-sizes
//! Size (MB) Name
//!    4,102  members
//!      310  inventory
//! -----------------------------
//!    4,412  TOTAL
//! ```
//!
//! # unifi-version
//!
//! Shows the UniFi controller version plus the firmware bundled for the
//! AP models we run; `--all` lists every versioned bundle.
//!
//! # unifi-logfile
//!
//! Prints the (deeply unguessable) syslog-ng log path for a named access
//! point:
//!
//! ```plain
//! $ unifi-logfile teff
//! /usr/local/groundwork/common/var/log/syslog-ng/("U7PG2,788a208667f5,v3.9.40.9098")/("U7PG2,788a208667f5,v3.9.40.9098").log
//! ```
//!
//! # device-report
//!
//! Tallies CrashPlan backup devices by alert state and renders a list or
//! CSV report, printed or mailed through the local relay. `--type
//! version` adds healthy machines to the details so the report doubles
//! as a software inventory.
