//! Print per-schema MySQL disk usage with a total
//!
//! Connection info comes from `./.my.cnf`, the same file the mysql client
//! reads, so the script works anywhere an admin already has a login
//! configured.

use std::error::Error;
use std::fs;
use std::process;

use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Connection, MySqlConnection, Row};

const MY_CNF: &str = ".my.cnf";

const DBSIZES_SQL: &str = "SELECT table_schema AS name, \
     CAST(ROUND(SUM(data_length + index_length) / 1024 / 1024, 0) AS SIGNED) AS size \
     FROM information_schema.tables GROUP BY table_schema";

/// Connection info from the `[mysql]` (or `[client]`) section
#[derive(Debug, PartialEq)]
struct MyCnf {
    host: String,
    user: String,
    password: String,
}

/// Minimal .my.cnf reader: section headers plus `key = value` lines.
/// The password value is routinely single-quoted in these files; the
/// quotes are not part of the password.
fn parse_my_cnf(text: &str) -> Result<MyCnf, String> {
    let mut section = String::new();
    let mut host = None;
    let mut user = None;
    let mut password = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].to_lowercase();
            continue;
        }
        if section != "mysql" && section != "client" {
            continue;
        }
        let mut parts = line.splitn(2, '=');
        let key = parts.next().unwrap_or("").trim();
        let value = parts.next().unwrap_or("").trim();
        match key {
            "host" => host = Some(value.to_string()),
            "user" => user = Some(value.to_string()),
            "password" => password = Some(value.replace('\'', "")),
            _ => {}
        }
    }

    Ok(MyCnf {
        host: host.ok_or_else(|| format!("no host in {}", MY_CNF))?,
        user: user.ok_or_else(|| format!("no user in {}", MY_CNF))?,
        password: password.ok_or_else(|| format!("no password in {}", MY_CNF))?,
    })
}

/// Right-aligned, comma-grouped like the mysql client's own reports
fn commas(n: i64) -> String {
    let raw = n.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cnf = parse_my_cnf(&fs::read_to_string(MY_CNF)?)?;

    let options = MySqlConnectOptions::new()
        .host(&cnf.host)
        .username(&cnf.user)
        .password(&cnf.password);
    let mut conn = MySqlConnection::connect_with(&options).await?;
    let rows = sqlx::query(DBSIZES_SQL).fetch_all(&mut conn).await?;

    println!("Size (MB) Name");
    let mut total: i64 = 0;
    for row in &rows {
        let name: String = row.try_get("name")?;
        // schemas holding only views have no data pages at all
        let size: i64 = row.try_get::<Option<i64>, _>("size")?.unwrap_or(0);
        println!("{:>8}  {}", commas(size), name);
        total += size;
    }
    println!("-----------------------------");
    println!("{:>8}  TOTAL", commas(total));

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        println!("ERROR: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use super::{commas, parse_my_cnf};

    #[test]
    fn reads_the_mysql_section() {
        let cnf = parse_my_cnf(
            "[mysql]\n\
             host = db1.example.net\n\
             user = admin\n\
             password = 'sup&rs3cret'\n",
        )
        .unwrap();
        assert_eq!(cnf.host, "db1.example.net");
        assert_eq!(cnf.user, "admin");
        assert_eq!(cnf.password, "sup&rs3cret");
    }

    #[test]
    fn client_section_works_too() {
        let cnf = parse_my_cnf(
            "# mysql defaults\n\
             [client]\n\
             user=admin\n\
             password=plain\n\
             host=localhost\n\
             \n\
             [mysqldump]\n\
             quick\n",
        )
        .unwrap();
        assert_eq!(cnf.host, "localhost");
        assert_eq!(cnf.password, "plain");
    }

    #[test]
    fn missing_keys_are_an_error() {
        let err = parse_my_cnf("[mysql]\nuser = admin\n").unwrap_err();
        assert!(err.contains("host"));
    }

    #[test]
    fn keys_outside_known_sections_are_ignored() {
        assert!(parse_my_cnf("host = a\nuser = b\npassword = c\n").is_err());
    }

    #[test]
    fn sizes_group_by_thousands() {
        assert_eq!(commas(0), "0");
        assert_eq!(commas(999), "999");
        assert_eq!(commas(1000), "1,000");
        assert_eq!(commas(1234567), "1,234,567");
    }
}
