//! Backup device report for the CrashPlan server
//!
//! Pulls the active computer list from the server API, tallies devices by
//! alert state, and renders either a readable list or a CSV. The result
//! goes to stdout or out through the local mail relay.

use std::fmt;
use std::process;
use std::str::FromStr;

use chrono::DateTime;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{Message, SmtpTransport, Transport};
use reqwest::blocking::Client;
use serde::Deserialize;
use structopt::StructOpt;

const API_PORT: u16 = 4285;
const SENDER: &str = "CrashPlan PROe <crashplan@localhost>";
const CSV_FILENAME: &str = "Crashplan Device Report.csv";

#[derive(Clone, Copy, Debug, PartialEq)]
enum ReportFormat {
    List,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "list" => Ok(ReportFormat::List),
            "csv" => Ok(ReportFormat::Csv),
            _ => Err(format!("unknown format: {}", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ReportType {
    Status,
    Version,
}

impl FromStr for ReportType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "status" => Ok(ReportType::Status),
            "version" => Ok(ReportType::Version),
            _ => Err(format!("unknown report type: {}", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum OutputMode {
    Mail,
    Print,
}

impl FromStr for OutputMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "mail" => Ok(OutputMode::Mail),
            "print" => Ok(OutputMode::Print),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

/// Generate Crashplan PROe device report
#[derive(StructOpt, Debug)]
#[structopt(name = "device-report (part of sysadmin-plugins)")]
struct Args {
    #[structopt(short = "H", long = "host", help = "hostname of the CrashPlan server")]
    host: String,
    #[structopt(short = "u", long = "user", help = "API username")]
    user: String,
    #[structopt(short = "p", long = "password", help = "API password")]
    password: String,
    #[structopt(
        short = "f",
        long = "format",
        default_value = "list",
        possible_values = &["list", "csv"],
        help = "format of report"
    )]
    format: ReportFormat,
    #[structopt(
        short = "o",
        long = "output",
        default_value = "mail",
        possible_values = &["mail", "print"],
        help = "mail -- send via email, print -- send to stdout"
    )]
    output: OutputMode,
    #[structopt(
        short = "r",
        long = "recipient",
        default_value = "sysadmin@localhost",
        help = "recipient for email output"
    )]
    recipient: String,
    #[structopt(
        short = "t",
        long = "type",
        default_value = "status",
        possible_values = &["status", "version"],
        help = "type of report"
    )]
    report_type: ReportType,
    #[structopt(short = "v", long = "verbose", help = "increase output verbosity")]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: ComputerList,
}

#[derive(Debug, Deserialize)]
struct ComputerList {
    computers: Vec<Computer>,
}

/// One device as the Computer API returns it
///
/// Everything except the name and alert state is optional; devices that
/// have never completed a backup come back with whole sections missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Computer {
    name: String,
    alert_state: i64,
    remote_address: Option<String>,
    os_name: Option<String>,
    os_version: Option<String>,
    product_version: Option<String>,
    java_version: Option<String>,
    backup_usage: Vec<BackupUsage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BackupUsage {
    alert_states: Vec<String>,
    last_backup: Option<String>,
    percent_complete: Option<f64>,
}

enum ReportError {
    Http(reqwest::Error),
    Mail(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReportError::Http(ref e) => write!(f, "{}", e),
            ReportError::Mail(ref e) => write!(f, "{}", e),
        }
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        ReportError::Http(e)
    }
}

fn fetch_computers(args: &Args) -> Result<Vec<Computer>, ReportError> {
    let (srt_key, srt_dir) = match args.report_type {
        ReportType::Status => ("lastBackup", "desc"),
        ReportType::Version => ("name", "asc"),
    };
    let client = Client::builder()
        .danger_accept_invalid_certs(true)
        .build()?;
    let url = format!("https://{}:{}/api/Computer", args.host, API_PORT);
    let envelope: Envelope = client
        .get(&url)
        .query(&[
            ("active", "true"),
            ("incBackupUsage", "true"),
            ("srtKey", srt_key),
            ("srtDir", srt_dir),
        ])
        .basic_auth(&args.user, Some(&args.password))
        .send()?
        .json()?;
    Ok(envelope.data.computers)
}

/// "03/10/17, 4:00 PM" out of the API's ISO timestamps
fn format_backup_date(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|d| d.format("%m/%d/%y, %-I:%M %p").to_string())
}

/// Detail block for one computer, or None when any field it needs is
/// missing (those devices still count in the totals)
fn detail(computer: &Computer, format: ReportFormat) -> Option<String> {
    let usage = computer.backup_usage.get(0)?;
    let alert = usage.alert_states.get(0)?;
    let last_backup = format_backup_date(usage.last_backup.as_deref()?)?;
    let percent = usage.percent_complete? as i64;

    match format {
        ReportFormat::List => Some(format!(
            "Computer: {}\n\
             Alert State: {}\n\
             OS/Version: {}/{}\n\
             Last Backup Date: {}\n\
             Percent Complete: {}\n\n",
            computer.name,
            alert,
            computer.os_name.as_deref()?,
            computer.os_version.as_deref()?,
            last_backup,
            percent,
        )),
        ReportFormat::Csv => Some(format!(
            "{},{},{},{},{},{},{},{},{}\n",
            computer.name,
            computer.remote_address.as_deref()?.split(':').next()?,
            computer.os_name.as_deref()?,
            computer.os_version.as_deref()?,
            computer.product_version.as_deref()?,
            computer.java_version.as_deref()?,
            alert,
            last_backup,
            percent,
        )),
    }
}

fn build_report(computers: &[Computer], report_type: ReportType, format: ReportFormat) -> String {
    let mut total_ok = 0;
    let mut total_warning = 0;
    let mut total_critical = 0;
    let mut details = String::new();

    for computer in computers {
        match computer.alert_state {
            2 => {
                total_critical += 1;
                details.push_str(&detail(computer, format).unwrap_or_default());
            }
            1 => {
                total_warning += 1;
                details.push_str(&detail(computer, format).unwrap_or_default());
            }
            0 => {
                total_ok += 1;
                if report_type == ReportType::Version {
                    details.push_str(&detail(computer, format).unwrap_or_default());
                }
            }
            _ => {}
        }
    }

    match format {
        ReportFormat::List => {
            let mut report = format!(
                "Total OK: {}\n\
                 Total Warning: {}\n\
                 Total Critical: {}\n",
                total_ok, total_warning, total_critical
            );
            if !details.is_empty() {
                report.push_str("\nDETAILS\n----------------------------------------\n");
                report.push_str(&details);
            }
            report
        }
        ReportFormat::Csv => {
            let mut report = String::from(
                "Computer,IP Address,OS Name,OS Version,Crashplan Version,\
                 Java Version,Alert State,Last Backup Date,Percent Complete\n",
            );
            report.push_str(&details);
            report
        }
    }
}

fn send_email(report: String, format: ReportFormat, recipient: &str) -> Result<(), ReportError> {
    let to: Mailbox = recipient
        .parse()
        .map_err(|_| ReportError::Mail(format!("Bad Syntax in {}", recipient)))?;
    let from: Mailbox = SENDER
        .parse()
        .map_err(|e| ReportError::Mail(format!("bad sender address: {}", e)))?;

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject("Device Status");

    let message = match format {
        ReportFormat::List => builder.body(report),
        ReportFormat::Csv => {
            let csv_type = ContentType::parse("text/csv")
                .map_err(|e| ReportError::Mail(e.to_string()))?;
            builder.multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(String::from(
                        "Device report attached.\n",
                    )))
                    .singlepart(Attachment::new(CSV_FILENAME.to_string()).body(report, csv_type)),
            )
        }
    }
    .map_err(|e| ReportError::Mail(e.to_string()))?;

    // local relay, no auth
    let transport = SmtpTransport::builder_dangerous("localhost").build();
    transport
        .send(&message)
        .map_err(|e| ReportError::Mail(e.to_string()))?;
    Ok(())
}

fn main() {
    let args = Args::from_args();
    if args.verbose {
        println!("{:?}", args);
    }

    let computers = match fetch_computers(&args) {
        Ok(computers) => computers,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };
    if args.verbose {
        println!("{} active computer(s)", computers.len());
    }

    let report = build_report(&computers, args.report_type, args.format);

    match args.output {
        OutputMode::Mail => {
            if let Err(e) = send_email(report, args.format, &args.recipient) {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
        OutputMode::Print => print!("{}", report),
    }
}
