//! Nagios check for a Monetra payment server
//!
//! Health here means the server answers its transaction port and accepts
//! an MADMIN password check. The request and response are both tiny XML
//! documents; the verdict lives in the `DataTransferStatus` code plus the
//! transaction's `msoft_code`, and the server's own `verbiage` becomes the
//! human half of the status line.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use structopt::StructOpt;

use sysadmin_plugins::check::{self, CheckResult, Observation, Thresholds};

const SERVICE: &str = "MONETRA";
const MONETRA_PORT: u16 = 8666;

/// Check Monetra Payment Server health
#[derive(StructOpt, Debug)]
#[structopt(name = "check-monetra (part of sysadmin-plugins)")]
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

/// `<MonetraResp>` as the transaction port returns it
#[derive(Debug, Deserialize)]
struct MonetraResp {
    #[serde(rename = "DataTransferStatus")]
    status: TransferStatus,
    #[serde(rename = "Resp")]
    resp: Option<TransResp>,
}

#[derive(Debug, Deserialize)]
struct TransferStatus {
    #[serde(rename = "@code")]
    code: String,
}

#[derive(Debug, Deserialize)]
struct TransResp {
    msoft_code: Option<String>,
    verbiage: Option<String>,
}

enum MonetraError {
    Http(reqwest::Error),
    Xml(quick_xml::DeError),
}

impl fmt::Display for MonetraError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MonetraError::Http(ref e) => write!(f, "{}", e),
            MonetraError::Xml(ref e) => write!(f, "invalid transaction response: {}", e),
        }
    }
}

impl From<reqwest::Error> for MonetraError {
    fn from(e: reqwest::Error) -> Self {
        MonetraError::Http(e)
    }
}

impl From<quick_xml::DeError> for MonetraError {
    fn from(e: quick_xml::DeError) -> Self {
        MonetraError::Xml(e)
    }
}

/// The MADMIN password-check transaction
fn chkpwd_request(user: &str, password: &str) -> String {
    format!(
        "<?xml version=\"1.0\" ?>\n\
         <MonetraTrans>\n\
         \t<Trans identifier=\"1\">\n\
         \t\t<action>chkpwd</action>\n\
         \t\t<username>MADMIN:{}</username>\n\
         \t\t<password>{}</password>\n\
         \t</Trans>\n\
         </MonetraTrans>\n",
        user, password
    )
}

fn post_chkpwd(args: &Args) -> Result<(String, Duration), MonetraError> {
    let client = Client::builder()
        .timeout(Duration::from_secs_f64(args.timeout))
        .danger_accept_invalid_certs(true)
        .build()?;
    let url = format!("https://{}:{}", args.host, MONETRA_PORT);
    let started = Instant::now();
    let response = client
        .post(&url)
        .header(CONTENT_TYPE, "application/xml")
        .body(chkpwd_request(&args.user, &args.password))
        .send()?;
    let body = response.text()?;
    Ok((body, started.elapsed()))
}

fn observe(resp: &MonetraResp) -> Observation {
    let code = resp.status.code.as_str();
    let (msoft_code, verbiage) = match resp.resp {
        Some(ref r) => (
            r.msoft_code.as_deref().unwrap_or(""),
            r.verbiage.as_deref().unwrap_or(""),
        ),
        None => ("", ""),
    };

    if code == "SUCCESS" {
        if msoft_code == "INT_SUCCESS" {
            Observation::ok(verbiage)
        } else {
            Observation::degraded(format!("{} {} {}", code, msoft_code, verbiage))
        }
    } else {
        Observation::failed(format!("{} {} {}", code, msoft_code, verbiage))
    }
}

fn main() {
    let args = Args::from_args();
    if args.verbose {
        println!("{:?}", args);
        println!("{}", chkpwd_request(&args.user, "********"));
    }

    let (body, elapsed) = match post_chkpwd(&args) {
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
        println!("{}", body);
    }

    let resp: MonetraResp = match quick_xml::de::from_str(&body) {
        Ok(resp) => resp,
        Err(e) => CheckResult::critical(SERVICE, &MonetraError::from(e).to_string()).exit(),
    };

    let observation = observe(&resp).timed(elapsed);
    check::evaluate(SERVICE, &observation, &thresholds).exit();
}

#[cfg(test)]
mod test {
    use structopt::StructOpt;

    use sysadmin_plugins::check::Health;

    use super::{chkpwd_request, observe, Args, MonetraResp};

    fn parse(xml: &str) -> MonetraResp {
        quick_xml::de::from_str(xml).unwrap()
    }

    fn healthy_response() -> &'static str {
        r#"<MonetraResp>
             <DataTransferStatus code="SUCCESS"/>
             <Resp identifier="1">
               <code>AUTH</code>
               <msoft_code>INT_SUCCESS</msoft_code>
               <verbiage>SUCCESS</verbiage>
             </Resp>
           </MonetraResp>"#
    }

    #[test]
    fn flags_parse_with_defaults() {
        let args = Args::from_iter(vec![
            "check-monetra",
            "--host",
            "pay.example.net",
            "-u",
            "monitor",
            "-p",
            "hunter2",
        ]);
        assert_eq!(args.timeout, 10.0);
        assert_eq!(args.warn, 0.0);
    }

    #[test]
    fn request_carries_the_madmin_user() {
        let xml = chkpwd_request("monitor", "hunter2");
        assert!(xml.contains("<username>MADMIN:monitor</username>"));
        assert!(xml.contains("<action>chkpwd</action>"));
    }

    #[test]
    fn successful_chkpwd_is_healthy() {
        let observation = observe(&parse(healthy_response()));
        assert_eq!(observation.health, Health::Ok);
        assert_eq!(observation.summary, "SUCCESS");
    }

    #[test]
    fn internal_failure_degrades() {
        let resp = parse(
            r#"<MonetraResp>
                 <DataTransferStatus code="SUCCESS"/>
                 <Resp identifier="1">
                   <msoft_code>INT_TIMEOUT</msoft_code>
                   <verbiage>timed out waiting on database</verbiage>
                 </Resp>
               </MonetraResp>"#,
        );
        match observe(&resp).health {
            Health::Degraded(detail) => {
                assert_eq!(detail, "SUCCESS INT_TIMEOUT timed out waiting on database")
            }
            other => panic!("expected degraded, got {:?}", other),
        }
    }

    #[test]
    fn transfer_failure_is_a_hard_failure() {
        let resp = parse(
            r#"<MonetraResp>
                 <DataTransferStatus code="FAIL"/>
               </MonetraResp>"#,
        );
        match observe(&resp).health {
            Health::Failed(detail) => assert!(detail.starts_with("FAIL")),
            other => panic!("expected failed, got {:?}", other),
        }
    }
}
