//! Field validators shared by the forms.
//!
//! Each check takes the raw submitted text. Optional fields arrive as empty
//! strings; the checks accept them and leave "required" to [`check_required`].

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use super::{field_error, FormRules};
use crate::models::{BookStatus, Category, ItemType, Language};

static PERSON_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}][\p{L} .'\-]*$").expect("valid person name regex"));

static ASSET_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2}\d{6}$").expect("valid asset code regex"));

static ISBN_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-]").expect("valid separator regex"));

const MAX_NAME_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 8;
const MIN_TITLE_LENGTH: usize = 3;

pub fn check_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("required", "This field is required."));
    }
    Ok(())
}

/// Title of at least 3 characters once surrounding whitespace is dropped
pub fn check_title(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if !value.is_empty() && value.chars().count() < MIN_TITLE_LENGTH {
        return Err(field_error("length", "Field must be at least 3 characters long."));
    }
    Ok(())
}

/// Author first name or surname
pub fn check_author(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(field_error("author_length", "Author name can have at most 50 characters."));
    }
    if !PERSON_NAME.is_match(value) {
        return Err(field_error("author", "Author name can contain only letters."));
    }
    Ok(())
}

/// First name or surname of an account holder
pub fn check_person_name(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    if value.chars().count() > MAX_NAME_LENGTH || !PERSON_NAME.is_match(value) {
        return Err(field_error("name", "Name can contain only letters."));
    }
    Ok(())
}

pub fn check_language(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Language>()
        .map(|_| ())
        .map_err(|_| field_error("language", "Choose language from the list."))
}

pub fn check_category(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Category>()
        .map(|_| ())
        .map_err(|_| field_error("category", "Choose category from the list."))
}

pub fn check_item_type(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<ItemType>()
        .map(|_| ())
        .map_err(|_| field_error("item_type", "Choose book or magazine."))
}

pub fn check_book_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<BookStatus>()
        .map(|_| ())
        .map_err(|_| field_error("status", "Choose status from the list."))
}

/// ISBN with separators removed, upper-cased check digit
pub fn normalize_isbn(value: &str) -> String {
    ISBN_SEPARATORS.replace_all(value.trim(), "").to_uppercase()
}

fn isbn10_is_valid(digits: &[u8]) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.iter().enumerate() {
        let value = match c {
            b'0'..=b'9' => (c - b'0') as u32,
            b'X' if i == 9 => 10,
            _ => return false,
        };
        sum += value * (10 - i as u32);
    }
    sum % 11 == 0
}

fn isbn13_is_valid(digits: &[u8]) -> bool {
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let d = (c - b'0') as u32;
            if i % 2 == 0 { d } else { d * 3 }
        })
        .sum();
    sum % 10 == 0
}

pub fn check_isbn(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    let isbn = normalize_isbn(value);
    let valid = match isbn.len() {
        10 => isbn10_is_valid(isbn.as_bytes()),
        13 => isbn13_is_valid(isbn.as_bytes()),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(field_error("isbn", "Invalid ISBN number."))
    }
}

/// Publication year offered by the select
pub fn check_pub_date(value: &str, rules: &FormRules) -> Result<i32, ValidationError> {
    let year: i32 = value
        .trim()
        .parse()
        .map_err(|_| field_error("pub_date", "Choose a year from the list."))?;
    if year < rules.first_publication_year || year > rules.current_year {
        return Err(field_error("pub_date", "Choose a year from the list."));
    }
    Ok(year)
}

pub fn check_asset_code(value: &str) -> Result<(), ValidationError> {
    if !ASSET_CODE.is_match(value.trim()) {
        return Err(field_error(
            "asset_code",
            "Asset code must be two letters followed by six digits.",
        ));
    }
    Ok(())
}

/// Lower-case, upper-case, digit and special character, at least 8 long
pub fn check_password_strength(value: &str) -> Result<(), ValidationError> {
    let long_enough = value.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_lower = value.chars().any(|c| c.is_lowercase());
    let has_upper = value.chars().any(|c| c.is_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if long_enough && has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(field_error(
            "password_strength",
            "Password must have at least 8 characters, including lower and upper case letters, a digit and a special character.",
        ))
    }
}

/// Address inside the organisation's mail domain
pub fn check_email_domain(value: &str, rules: &FormRules) -> Result<(), ValidationError> {
    let domain = value.trim().rsplit_once('@').map(|(_, domain)| domain);
    match domain {
        Some(domain) if domain.eq_ignore_ascii_case(&rules.registration_domain) => Ok(()),
        _ => Err(field_error("email_domain", "Use your company email address.")),
    }
}
