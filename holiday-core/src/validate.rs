//! Boundary checks for query input.
//!
//! Country codes are checked by shape only (two characters after trimming);
//! there is no lookup against an ISO list.

/// Earliest year the upstream source covers.
pub const MIN_YEAR: i32 = 1975;

pub const COUNTRY_CODE_LEN: usize = 2;

pub fn is_valid_country_code(code: &str) -> bool {
    let trimmed = code.trim();
    !trimmed.is_empty() && trimmed.chars().count() == COUNTRY_CODE_LEN
}

/// `None` (parameter absent) is invalid. An empty list is vacuously valid.
pub fn are_valid_country_codes<S: AsRef<str>>(codes: Option<&[S]>) -> bool {
    codes.is_some_and(|codes| codes.iter().all(|c| is_valid_country_code(c.as_ref())))
}

pub fn is_valid_year(year: Option<i32>) -> bool {
    year.is_some_and(|y| y >= MIN_YEAR)
}
