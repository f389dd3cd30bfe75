//! Input checks that must pass before any billing or notification call is made.

use crate::error::AppError;
use crate::models::{Credentials, DateRange};
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(field: &str, raw: Option<&str>) -> Result<NaiveDate, AppError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(AppError::InvalidDate(format!("{field} is required")));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        AppError::InvalidDate(format!("{field} '{raw}' is not a valid YYYY-MM-DD date"))
    })
}

pub fn parse_date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange, AppError> {
    let start = parse_date("start_date", start)?;
    let end = parse_date("end_date", end)?;
    if start > end {
        return Err(AppError::InvalidDate(format!(
            "start_date {start} is after end_date {end}"
        )));
    }
    let range = DateRange { start, end };
    range.exclusive_end()?;
    Ok(range)
}

/// Region names look like `us-east-1` or `ap-southeast-2`.
fn region_shaped(region: &str) -> bool {
    let parts: Vec<&str> = region.split('-').collect();
    parts.len() >= 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
        && parts
            .last()
            .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()))
}

pub fn validate_credentials(
    access_key_id: Option<&str>,
    secret_access_key: Option<&str>,
    region: Option<&str>,
) -> Result<(Credentials, String), AppError> {
    let access_key_id = access_key_id.map(str::trim).unwrap_or_default();
    let secret_access_key = secret_access_key.map(str::trim).unwrap_or_default();
    let region = region.map(str::trim).unwrap_or_default();

    if access_key_id.is_empty() {
        return Err(AppError::InvalidInput("access key id is required".into()));
    }
    if secret_access_key.is_empty() {
        return Err(AppError::InvalidInput("secret access key is required".into()));
    }
    if !region_shaped(region) {
        return Err(AppError::InvalidInput(format!(
            "region '{region}' is not a valid region name"
        )));
    }

    Ok((
        Credentials {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
        },
        region.to_string(),
    ))
}
