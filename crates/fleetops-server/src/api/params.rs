use chrono::NaiveDate;
use fleetops_core::DomainError;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Decoded query string that keeps repeated keys.
///
/// List parameters are accepted both as `key[]=a&key[]=b` and as
/// comma-separated `key=a,b`.
#[derive(Debug, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    /// First non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn list(&self, key: &str) -> Vec<&str> {
        let bracketed = format!("{}[]", key);
        self.pairs
            .iter()
            .filter(|(k, _)| *k == key || *k == bracketed)
            .flat_map(|(_, v)| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Parsed list values, `None` when the parameter is absent
    pub fn parsed_list<T: FromStr>(&self, key: &str) -> Result<Option<Vec<T>>, AppError> {
        let values = self.list(key);
        if values.is_empty() {
            return Ok(None);
        }
        values
            .into_iter()
            .map(|v| {
                v.parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid {} value: {}", key, v)))
            })
            .collect::<Result<Vec<T>, _>>()
            .map(Some)
    }

    pub fn uuids(&self, key: &str) -> Result<Option<Vec<Uuid>>, AppError> {
        self.parsed_list(key)
    }

    /// The required `start_date`/`end_date` pair
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate), AppError> {
        let (Some(start), Some(end)) = (self.get("start_date"), self.get("end_date")) else {
            return Err(AppError::BadRequest(
                "Missing required parameters: start_date and end_date".to_string(),
            ));
        };
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end }.into());
        }
        Ok((start, end))
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {}", value)))
}
