//! Print the syslog-ng log path for a named access point
//!
//! The path embeds the AP's model, MAC and firmware version, so nobody
//! should have to remember it; the device table lives in the library.

use std::process;

use structopt::StructOpt;

use sysadmin_plugins::unifi;

/// Print the full path to the syslog-ng log file for a UniFi access point
#[derive(StructOpt, Debug)]
#[structopt(name = "unifi-logfile (part of sysadmin-plugins)")]
struct Args {
    #[structopt(name = "NAME", help = "device name, e.g. teff")]
    name: String,
}

fn main() {
    let args = Args::from_args();
    match unifi::device_by_name(&args.name) {
        Some(device) => println!("{}", unifi::logfile_path(device)),
        None => {
            eprintln!("ERROR: Unknown device {}", args.name);
            process::exit(1);
        }
    }
}
