//! IATA carrier code to airline name, from the OpenFlights `airlines.dat` table.

use crate::error::PlannerError;
use crate::http::{read_text, send_failed};
use reqwest::Client;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

pub const UNKNOWN_AIRLINE: &str = "Unknown Airline Code";

// airlines.dat columns: id, name, alias, IATA, ICAO, callsign, country, active
const NAME_COLUMN: usize = 1;
const IATA_COLUMN: usize = 3;
const MISSING: &str = "\\N";

#[derive(Debug, Default, Clone)]
pub struct AirlineDirectory {
    names: HashMap<String, String>,
}

impl AirlineDirectory {
    #[instrument(skip(http))]
    pub async fn download(http: &Client, url: &str) -> Result<Self, PlannerError> {
        let response = http
            .get(url)
            .send()
            .await
            .map_err(|e| send_failed("airlines", e))?;
        let text = read_text("airlines", response).await?;
        let directory = Self::parse(&text);
        if directory.is_empty() {
            warn!("Airline directory download contained no IATA codes");
        } else {
            info!(airlines = directory.len(), "Loaded airline directory");
        }
        Ok(directory)
    }

    /// Rows without an IATA code are skipped; the first row wins for duplicate codes
    pub fn parse(data: &str) -> Self {
        let mut names = HashMap::new();
        for line in data.lines().filter(|line| !line.trim().is_empty()) {
            let fields = split_record(line);
            let (Some(name), Some(code)) = (
                fields.get(NAME_COLUMN).and_then(|f| present(f)),
                fields.get(IATA_COLUMN).and_then(|f| present(f)),
            ) else {
                continue;
            };
            names
                .entry(code.to_ascii_uppercase())
                .or_insert_with(|| name.to_string());
        }
        Self { names }
    }

    pub fn name(&self, code: &str) -> &str {
        self.names
            .get(&code.trim().to_ascii_uppercase())
            .map(String::as_str)
            .unwrap_or(UNKNOWN_AIRLINE)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn present(field: &str) -> Option<&str> {
    let field = field.trim();
    (!field.is_empty() && field != MISSING && field != "-").then_some(field)
}

/// Splits one CSV record, honoring double-quoted fields with `""` escapes
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"1,"Private flight",\N,"-","N/A","","",Y
2,"135 Airways",\N,"","GNL","GENERAL","United States","N"
1355,"British Airways",\N,"BA","BAW","SPEEDBIRD","United Kingdom","Y"
24,"American Airlines",\N,"AA","AAL","AMERICAN","United States","Y"
9999,"Comma, Air ""Express""",\N,"ZZ","ZZZ","","Nowhere","Y"
10000,"Later Duplicate",\N,"BA","XXX","","","N"
"#;

    #[test]
    fn test_parse_skips_rows_without_iata() {
        let directory = AirlineDirectory::parse(SAMPLE);
        assert_eq!(directory.len(), 3);
        assert_eq!(directory.name("BA"), "British Airways");
        assert_eq!(directory.name("aa"), "American Airlines");
    }

    #[test]
    fn test_quoted_commas_and_escapes() {
        let directory = AirlineDirectory::parse(SAMPLE);
        assert_eq!(directory.name("ZZ"), "Comma, Air \"Express\"");
    }

    #[test]
    fn test_unknown_code() {
        let directory = AirlineDirectory::default();
        assert_eq!(directory.name("QQ"), UNKNOWN_AIRLINE);
    }

    #[test]
    fn test_split_record() {
        assert_eq!(
            split_record(r#"1,"a,b",\N,"""q""""#),
            vec!["1", "a,b", "\\N", "\"q\""]
        );
    }
}
