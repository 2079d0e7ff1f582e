//! The UniFi access points we run, and where the controller keeps things
//!
//! The device table is maintained by hand: update it when an AP is added,
//! swapped, or picks up new firmware. The syslog path format has to match
//! what syslog-ng derives from the AP's hello, which bakes the model, MAC
//! and firmware version into the directory name.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Where syslog-ng files per-device logs
pub const SYSLOG_ROOT: &str = "/usr/local/groundwork/common/var/log/syslog-ng";

/// The controller's own version marker
pub const CONTROLLER_VERSION_FILE: &str = "/opt/UniFi/webapps/ROOT/app-unifi/.version";

/// Index of firmware images bundled with the controller
pub const FIRMWARE_BUNDLES_FILE: &str = "/opt/UniFi/dl/firmware/bundles.json";

/// One deployed access point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Device {
    pub name: &'static str,
    pub model: &'static str,
    pub mac: &'static str,
    pub version: &'static str,
}

/// Currently installed devices
pub const DEVICES: &[Device] = &[
    Device { name: "buckwheat", model: "U7PG2", mac: "fcecda34e2f5", version: "3.9.40.9098" },
    Device { name: "chia", model: "U7P", mac: "44d9e7903567", version: "3.9.40.9098" },
    Device { name: "corn", model: "U7PG2", mac: "fcecda371f1c", version: "3.9.40.9098" },
    Device { name: "fonio", model: "U7P", mac: "44d9e7903452", version: "3.9.40.9098" },
    Device { name: "milo", model: "U7PG2", mac: "802aa81664f1", version: "3.9.40.9098" },
    Device { name: "sorghum", model: "U7P", mac: "44d9e790350e", version: "3.9.40.9098" },
    Device { name: "teff", model: "U7PG2", mac: "788a208667f5", version: "3.9.40.9098" },
    Device { name: "wheat", model: "U7PG2", mac: "802aa8166684", version: "3.9.40.9098" },
];

/// AP models we have deployed, named the way the bundle index displays them
pub const INSTALLED_DISPLAY_NAMES: &[&str] =
    &["UniFi AP-Pro", "UniFi AP-AC-Pro", "UniFi AP-AC-Pro Gen2"];

pub fn device_by_name(name: &str) -> Option<&'static Device> {
    DEVICES.iter().find(|d| d.name == name)
}

/// Full path to the syslog-ng log file for one access point
///
/// syslog-ng names the directory (and the file inside it) after the
/// device's hello string, parentheses and quotes included.
pub fn logfile_path(device: &Device) -> String {
    let hello = format!(
        "(\"{},{},v{}\")",
        device.model, device.mac, device.version
    );
    format!("{}/{}/{}.log", SYSLOG_ROOT, hello, hello)
}

/// The controller version file carries a build tag after a dash; the
/// human-facing version is everything before it
pub fn controller_version(raw: &str) -> &str {
    match raw.find('-') {
        Some(idx) => &raw[..idx],
        None => raw.trim_end(),
    }
}

/// One entry from `bundles.json`
///
/// Not every bundle describes a device firmware; entries missing either
/// field are skipped by the callers.
#[derive(Debug, Deserialize)]
pub struct FirmwareBundle {
    pub display: Option<String>,
    pub version: Option<String>,
}

/// The bundle index keyed by bundle id, ordered for stable output
pub type FirmwareBundles = BTreeMap<String, FirmwareBundle>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_devices_resolve() {
        let device = device_by_name("teff").unwrap();
        assert_eq!(device.model, "U7PG2");
        assert!(device_by_name("quinoa").is_none());
    }

    #[test]
    fn logfile_path_embeds_the_hello_string_twice() {
        let device = device_by_name("teff").unwrap();
        assert_eq!(
            logfile_path(device),
            "/usr/local/groundwork/common/var/log/syslog-ng\
             /(\"U7PG2,788a208667f5,v3.9.40.9098\")\
             /(\"U7PG2,788a208667f5,v3.9.40.9098\").log"
        );
    }

    #[test]
    fn controller_version_stops_at_the_build_tag() {
        assert_eq!(controller_version("5.6.40-10833-1"), "5.6.40");
        assert_eq!(controller_version("5.6.40\n"), "5.6.40");
    }

    #[test]
    fn bundle_index_tolerates_versionless_entries() {
        let raw = r#"{
            "BZ2": {"display": "UniFi AP", "version": "4.3.28.11361"},
            "U7PG2": {"display": "UniFi AP-AC-Pro", "version": "3.9.40.9098"},
            "meta": {"display": "Bundle Metadata"}
        }"#;
        let bundles: FirmwareBundles = serde_json::from_str(raw).unwrap();
        assert_eq!(bundles.len(), 3);
        assert!(bundles["meta"].version.is_none());
        assert_eq!(
            bundles["U7PG2"].display.as_deref(),
            Some("UniFi AP-AC-Pro")
        );
    }
}
