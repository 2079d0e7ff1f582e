//! Show the UniFi controller version and the firmware it bundles
//!
//! By default only the AP models we actually run are listed; `--all`
//! dumps every bundle in the index that carries a version.

use std::fs::{self, File};
use std::process;

use structopt::StructOpt;

use sysadmin_plugins::unifi::{self, FirmwareBundles};

/// Display UniFi Controller installed version and bundled device firmware
#[derive(StructOpt, Debug)]
#[structopt(name = "unifi-version (part of sysadmin-plugins)")]
struct Args {
    #[structopt(short = "a", long = "all", help = "show all bundled firmware")]
    all: bool,
}

fn load() -> Result<(String, FirmwareBundles), String> {
    let raw_version = fs::read_to_string(unifi::CONTROLLER_VERSION_FILE)
        .map_err(|e| format!("{}: {}", unifi::CONTROLLER_VERSION_FILE, e))?;
    let version = unifi::controller_version(&raw_version).to_string();

    let file = File::open(unifi::FIRMWARE_BUNDLES_FILE)
        .map_err(|e| format!("{}: {}", unifi::FIRMWARE_BUNDLES_FILE, e))?;
    let bundles: FirmwareBundles = serde_json::from_reader(file)
        .map_err(|e| format!("{}: {}", unifi::FIRMWARE_BUNDLES_FILE, e))?;

    Ok((version, bundles))
}

fn main() {
    let args = Args::from_args();

    let (version, bundles) = load().unwrap_or_else(|e| {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    });

    println!("UniFi Controller {}", version);

    if args.all {
        for bundle in bundles.values() {
            if let (Some(display), Some(version)) = (&bundle.display, &bundle.version) {
                println!("{} {}", display, version);
            }
        }
    } else {
        for device in unifi::INSTALLED_DISPLAY_NAMES {
            for bundle in bundles.values() {
                if bundle.display.as_deref() == Some(*device) {
                    if let Some(version) = &bundle.version {
                        println!("{} {}", device, version);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use structopt::StructOpt;

    use super::Args;

    #[test]
    fn all_flag() {
        assert!(!Args::from_iter(vec!["unifi-version"]).all);
        assert!(Args::from_iter(vec!["unifi-version", "-a"]).all);
        assert!(Args::from_iter(vec!["unifi-version", "--all"]).all);
    }
}
