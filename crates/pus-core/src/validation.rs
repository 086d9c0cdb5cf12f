//! Option validation
//!
//! Each command declares the option names it recognizes. Every declared
//! name is run through its checker in order and the first failure aborts.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::SHORT_HASH_LEN;
use crate::options::Options;

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Outcome of a single field check; the error is the user-facing reason
type Check = std::result::Result<(), String>;

type Checker = fn(&Options) -> Check;

/// Checker registered for an option name
fn checker(field: &str) -> Option<Checker> {
    match field {
        "task" | "event" | "note" | "done" | "collection" => Some(always),
        "limit" => Some(limit),
        "date" => Some(date),
        "in" => Some(in_collection),
        _ => None,
    }
}

/// Validate the declared options of `command`, stopping at the first failure
///
/// A declared name without a checker is itself an invalid option.
pub fn validate(command: &str, declared: &[&str], options: &Options) -> Result<()> {
    for &field in declared {
        debug!("Validation::validate {} {}", command, field);

        let check = checker(field).ok_or_else(|| {
            Error::invalid_option(command, field, format!("Unknown option '{}'.", field))
        })?;
        check(options).map_err(|reason| Error::invalid_option(command, field, reason))?;
    }
    Ok(())
}

fn always(_: &Options) -> Check {
    Ok(())
}

fn limit(options: &Options) -> Check {
    match options.limit_str() {
        Some(_) if options.parsed_limit().is_none() => Err("Limit must be a number.".into()),
        _ => Ok(()),
    }
}

fn date(options: &Options) -> Check {
    match options.date_str() {
        Some(d) if !DATE_SHAPE.is_match(d) || options.parsed_date().is_none() => {
            Err("Date is incorrect, expected YYYY-MM-DD.".into())
        }
        _ => Ok(()),
    }
}

fn in_collection(options: &Options) -> Check {
    match options.in_collection_str() {
        Some(hash) if hash.chars().count() < SHORT_HASH_LEN => Err(format!(
            "Collection hash must be at least {} characters.",
            SHORT_HASH_LEN
        )),
        _ => Ok(()),
    }
}

/// Check a positional hash argument (done, show)
pub fn require_hash(command: &str, hash: &str) -> Result<()> {
    if hash.trim().is_empty() {
        return Err(Error::invalid_option(command, "hash", "A hash is required."));
    }
    if hash.chars().count() < SHORT_HASH_LEN {
        return Err(Error::invalid_option(
            command,
            "hash",
            format!("Hash must be at least {} characters.", SHORT_HASH_LEN),
        ));
    }
    Ok(())
}
