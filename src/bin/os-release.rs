//! Report when a given Rocky, Alma or CentOS release hit the mirrors
//!
//! Walks that distro's mirror list and scrapes the directory index of the
//! first one that answers. CentOS mirrors serve a structured index table;
//! the Alma and Rocky listings are plain enough that the date is just the
//! column between runs of whitespace.

use std::process;

use chrono::NaiveDateTime;
use regex::Regex;
use reqwest::blocking::Client;
use structopt::StructOpt;

const MIRROR_TIMEOUT_SECS: u64 = 10;

const ALMA_MIRRORS: &[&str] = &[
    "http://nyc.mirrors.clouvider.net/almalinux/",
    "http://mirror.cogentco.com/pub/linux/almalinux/",
    "http://iad.mirror.rackspace.com/almalinux/",
    "http://mirror.interserver.net/almalinux/",
];

const CENTOS_MIRRORS: &[&str] = &[
    "http://mirror.centos.org/centos/",
    "http://mirrors.lga7.us.voxel.net/centos/",
    "http://mirror.cc.columbia.edu/pub/linux/centos/",
    "http://mirror.es.its.nyu.edu/centos/",
];

const ROCKY_MIRRORS: &[&str] = &[
    "http://dl.rockylinux.org/pub/rocky/",
    "http://mirror.cogentco.com/pub/linux/rocky/",
    "http://iad.mirror.rackspace.com/rocky/",
    "http://nyc.mirrors.clouvider.net/rocky/",
];

#[derive(Clone, Copy, Debug, PartialEq)]
enum Os {
    Alma,
    CentOs,
    Rocky,
}

impl Os {
    fn name(self) -> &'static str {
        match self {
            Os::Alma => "Alma",
            Os::CentOs => "CentOS",
            Os::Rocky => "Rocky",
        }
    }

    fn mirrors(self) -> &'static [&'static str] {
        match self {
            Os::Alma => ALMA_MIRRORS,
            Os::CentOs => CENTOS_MIRRORS,
            Os::Rocky => ROCKY_MIRRORS,
        }
    }
}

/// Determine if a particular release of Rocky, Alma or CentOS Linux is available
#[derive(StructOpt, Debug)]
#[structopt(name = "os-release (part of sysadmin-plugins)")]
struct Args {
    #[structopt(short = "a", long = "alma", help = "check AlmaLinux")]
    alma: bool,
    #[structopt(short = "c", long = "centos", help = "check CentOS")]
    centos: bool,
    #[structopt(short = "r", long = "rocky", help = "check Rocky Linux")]
    rocky: bool,
    #[structopt(name = "VERSION", help = "target OS version (n.n)")]
    version: String,
}

fn pick_os(args: &Args) -> Result<Os, &'static str> {
    match (args.alma, args.centos, args.rocky) {
        (true, false, false) => Ok(Os::Alma),
        (false, true, false) => Ok(Os::CentOs),
        (false, false, true) => Ok(Os::Rocky),
        _ => Err("ERROR: must specify exactly one OS: -a, -c or -r"),
    }
}

/// Index of the first mirror that answers
fn fetch_listing(os: Os) -> Option<String> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(MIRROR_TIMEOUT_SECS))
        .build()
        .ok()?;
    for url in os.mirrors() {
        if let Ok(response) = client.get(*url).send() {
            if let Ok(body) = response.text() {
                return Some(body);
            }
        }
    }
    None
}

/// Version directory and raw date cell from each row of a structured
/// index table that mentions the target version
fn structured_releases(page: &str, target: &str) -> Vec<(String, String)> {
    // index rows look like
    //   <td ...><a href="7.9.2009/">7.9.2009/</a></td><td ...>2020-11-12 14:30  </td>
    let row = Regex::new(
        "<td[^>]*><a href=\"[^\"]*\">([^<]+)</a></td>\\s*<td[^>]*>([^<]+)</td>",
    )
    .unwrap();
    row.captures_iter(page)
        .filter(|caps| caps[1].contains(target))
        .map(|caps| {
            (
                caps[1].trim_end_matches('/').to_string(),
                caps[2].trim().to_string(),
            )
        })
        .collect()
}

/// Date column from an unstructured listing line: the first run of text
/// between double-space gaps
fn unstructured_release_date(line: &str) -> Option<String> {
    let gap = Regex::new("\\s\\s+(.+?)\\s\\s+").unwrap();
    gap.captures(line).map(|caps| caps[1].to_string())
}

/// Re-render a mirror timestamp as "November 18, 2023 at 3:04 AM"
fn format_date(raw: &str) -> Option<String> {
    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%d-%b-%Y %H:%M", "%Y-%m-%d %H:%M:%S"];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|d| d.format("%B %-d, %Y at %-I:%M %p").to_string())
}

fn report_structured(page: &str, os: Os, target: &str) {
    for (version, raw_date) in structured_releases(page, target) {
        match format_date(&raw_date) {
            Some(date) => println!(
                "{} {} was released or updated on {}",
                os.name(),
                version,
                date
            ),
            None => println!(
                "{} {} was released or updated, date undetermined",
                os.name(),
                version
            ),
        }
    }
}

fn report_unstructured(page: &str, os: Os, target: &str) {
    for line in page.lines() {
        if !line.contains(target) || line.contains("RC") {
            continue;
        }
        match unstructured_release_date(line).and_then(|raw| format_date(&raw)) {
            Some(date) => println!(
                "{} {} was released or updated on {}",
                os.name(),
                target,
                date
            ),
            None => println!(
                "{} {} was released or updated, date undetermined",
                os.name(),
                target
            ),
        }
    }
}

fn main() {
    let args = Args::from_args();
    let os = match pick_os(&args) {
        Ok(os) => os,
        Err(msg) => {
            println!("{}", msg);
            process::exit(1);
        }
    };

    let page = match fetch_listing(os) {
        Some(page) => page,
        None => {
            println!("ERROR: Unable to connect to any {} mirror", os.name());
            process::exit(1);
        }
    };

    match os {
        Os::CentOs => report_structured(&page, os, &args.version),
        Os::Alma | Os::Rocky => report_unstructured(&page, os, &args.version),
    }
}

#[cfg(test)]
mod test {
    use structopt::StructOpt;

    use super::*;

    #[test]
    fn exactly_one_os_flag_is_required() {
        let args = Args::from_iter(vec!["os-release", "-r", "9.3"]);
        assert_eq!(pick_os(&args), Ok(Os::Rocky));

        let args = Args::from_iter(vec!["os-release", "-r", "-c", "9.3"]);
        assert!(pick_os(&args).is_err());

        let args = Args::from_iter(vec!["os-release", "9.3"]);
        assert!(pick_os(&args).is_err());
    }

    #[test]
    fn structured_index_rows_parse() {
        let page = r#"<table>
            <tr><td class="indexcolicon"><img src="/icons/folder.png"></td>
                <td class="indexcolname"><a href="7.9.2009/">7.9.2009/</a></td>
                <td class="indexcollastmod">2020-11-12 14:30  </td></tr>
            <tr><td class="indexcolicon"><img src="/icons/folder.png"></td>
                <td class="indexcolname"><a href="8.5.2111/">8.5.2111/</a></td>
                <td class="indexcollastmod">2021-11-16 17:14  </td></tr>
        </table>"#;
        assert_eq!(
            structured_releases(page, "7.9"),
            vec![("7.9.2009".to_string(), "2020-11-12 14:30".to_string())]
        );
        assert!(structured_releases(page, "6.1").is_empty());
    }

    #[test]
    fn unstructured_lines_yield_the_date_column() {
        let line = r#"<a href="9.3/">9.3/</a>                  2023-11-18 03:04    -"#;
        assert_eq!(
            unstructured_release_date(line),
            Some("2023-11-18 03:04".to_string())
        );
        assert_eq!(unstructured_release_date("9.3"), None);
    }

    #[test]
    fn mirror_dates_reformat() {
        assert_eq!(
            format_date("2023-11-18 03:04"),
            Some("November 18, 2023 at 3:04 AM".to_string())
        );
        assert_eq!(
            format_date("16-Nov-2021 17:14"),
            Some("November 16, 2021 at 5:14 PM".to_string())
        );
        assert_eq!(format_date("not a date"), None);
    }
}
