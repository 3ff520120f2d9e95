use chrono::NaiveDate;

use crate::error::{Error, Result};

const MAX_USERNAME_LEN: usize = 32;
const MAX_ACRONYM_LEN: usize = 20;
const MAX_PLAN_NAME_LEN: usize = 50;

fn is_valid_name_char(c: char, allow_space: bool) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || (allow_space && c == ' ')
}

fn validate_name(name: &str, entity: &str, max_len: usize, allow_space: bool) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::BadRequest(format!("{entity} cannot be empty")));
    }
    if name.chars().count() > max_len {
        return Err(Error::BadRequest(format!(
            "{entity} cannot exceed {max_len} characters"
        )));
    }
    if !name.chars().all(|c| is_valid_name_char(c, allow_space)) {
        let mut allowed = "alphanumeric characters, hyphens, underscores and periods".to_string();
        if allow_space {
            allowed.push_str(" and spaces");
        }
        return Err(Error::BadRequest(format!("{entity} can only contain {allowed}")));
    }
    Ok(())
}

pub fn validate_username(name: &str) -> Result<()> {
    validate_name(name, "Username", MAX_USERNAME_LEN, false)
}

/// Task ids are `{acronym}_{n}`, so acronyms must be stable, short tokens.
pub fn validate_acronym(acronym: &str) -> Result<()> {
    validate_name(acronym, "Application acronym", MAX_ACRONYM_LEN, false)?;
    if acronym.contains('.') {
        return Err(Error::BadRequest(
            "Application acronym cannot contain periods".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_plan_name(name: &str) -> Result<()> {
    validate_name(name, "Plan name", MAX_PLAN_NAME_LEN, true)
}

pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.contains('@'));
    if !valid || email.contains(char::is_whitespace) {
        return Err(Error::BadRequest(format!("'{email}' is not a valid email address")));
    }
    Ok(())
}

pub fn validate_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(Error::BadRequest(format!(
                "End date {end} is before start date {start}"
            )));
        }
    }
    Ok(())
}
