//! Values derived from the form at generation time: the card identifier,
//! the issue/expiry dates and the date-of-birth display string.

use chrono::{Datelike, Days, Local, Months, NaiveDate};

use crate::form::{Field, FormFields};
use crate::{Error, Result};

/// Prefix of every generated identifier
pub const ID_PREFIX: &str = "KN-";

/// Validity period of a card, in calendar months
pub const VALIDITY_MONTHS: u32 = 6;

const DATE_FORMAT: &str = "%d-%m-%Y";

/// Build the card identifier from the stored `YYYY-MM-DD` date of birth and
/// the identifier seed: prefix, day of birth, last two characters of the
/// seed. Case is kept as entered; the card draws it upper-cased.
pub fn id_number(date_of_birth: &str, seed: &str) -> Result<String> {
    let day = date_of_birth
        .split('-')
        .nth(2)
        .ok_or_else(|| Error::InvalidField {
            field: Field::DateOfBirth,
            reason: format!("expected YYYY-MM-DD, got '{}'", date_of_birth),
        })?;
    Ok(format!("{}{}{}", ID_PREFIX, day, last_chars(seed, 2)))
}

/// Trailing `n` characters of `s` (all of `s` when it is shorter).
fn last_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    let start = s
        .char_indices()
        .nth(count - n)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &s[start..]
}

/// `YYYY-MM-DD` → `DD-MM-YYYY` by reversing the dash-separated segments.
pub fn display_date_of_birth(date_of_birth: &str) -> String {
    date_of_birth.split('-').rev().collect::<Vec<_>>().join("-")
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Issue and expiry dates of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDates {
    pub issued: NaiveDate,
    pub expires: NaiveDate,
}

impl CardDates {
    /// Expiry is the issue date advanced by [`VALIDITY_MONTHS`] calendar
    /// months, keeping the day of month. A day the target month lacks
    /// overflows into the following month (31 Aug + 6 months is 2 Mar in a
    /// leap year).
    pub fn from_issue(issued: NaiveDate) -> Result<Self> {
        let out_of_range = || Error::Other(format!("expiry date out of range for {}", issued));
        let expires = issued
            .with_day(1)
            .and_then(|first| first.checked_add_months(Months::new(VALIDITY_MONTHS)))
            .and_then(|first| first.checked_add_days(Days::new(u64::from(issued.day() - 1))))
            .ok_or_else(out_of_range)?;
        Ok(Self { issued, expires })
    }

    pub fn issued_display(&self) -> String {
        format_date(self.issued)
    }

    pub fn expires_display(&self) -> String {
        format_date(self.expires)
    }
}

/// Everything printed on a card besides the photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub name: String,
    pub id_number: String,
    pub date_of_birth: String,
    pub dates: CardDates,
}

impl CardDetails {
    pub fn derive(form: &FormFields, issued: NaiveDate) -> Result<Self> {
        let dob = form.get(Field::DateOfBirth);
        Ok(Self {
            name: form.get(Field::Name).to_uppercase(),
            id_number: id_number(dob, form.get(Field::IdentifierSeed))?,
            date_of_birth: display_date_of_birth(dob),
            dates: CardDates::from_issue(issued)?,
        })
    }

    /// Footer line, e.g. `Issued: 18-10-2026 | Expires: 18-04-2027`
    pub fn validity_line(&self) -> String {
        format!(
            "Issued: {} | Expires: {}",
            self.dates.issued_display(),
            self.dates.expires_display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn id_number_uses_day_and_last_two_seed_chars() {
        assert_eq!(id_number("1994-03-07", "123456789012").unwrap(), "KN-0712");
        assert_eq!(id_number("2001-12-31", "98").unwrap(), "KN-3198");
    }

    #[test]
    fn id_number_keeps_seed_case() {
        assert_eq!(id_number("1990-01-15", "abcxy").unwrap(), "KN-15xy");
    }

    #[test]
    fn short_seed_is_used_whole() {
        assert_eq!(id_number("1990-01-05", "7").unwrap(), "KN-057");
    }

    #[test]
    fn id_number_rejects_date_without_day() {
        let err = id_number("1990-01", "12").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: Field::DateOfBirth,
                ..
            }
        ));
    }

    #[test]
    fn date_of_birth_display_is_reversed() {
        assert_eq!(display_date_of_birth("1994-03-07"), "07-03-1994");
    }

    #[test]
    fn expiry_is_six_calendar_months_later() {
        let d = CardDates::from_issue(date(2024, 1, 31)).unwrap();
        assert_eq!(d.expires, date(2024, 7, 31));
        assert_eq!(d.issued_display(), "31-01-2024");
        assert_eq!(d.expires_display(), "31-07-2024");
    }

    #[test]
    fn expiry_overflows_past_end_of_short_month() {
        let d = CardDates::from_issue(date(2023, 8, 31)).unwrap();
        assert_eq!(d.expires_display(), "02-03-2024");
        let d = CardDates::from_issue(date(2024, 8, 31)).unwrap();
        assert_eq!(d.expires_display(), "03-03-2025");
        let d = CardDates::from_issue(date(2024, 12, 31)).unwrap();
        assert_eq!(d.expires, date(2025, 7, 1));
    }

    #[test]
    fn expiry_rolls_into_next_year() {
        let d = CardDates::from_issue(date(2026, 10, 18)).unwrap();
        assert_eq!(d.expires, date(2027, 4, 18));
    }

    #[test]
    fn details_are_derived_from_form() {
        let form = FormFields::new()
            .with(Field::Name, "Asha Rao")
            .with(Field::DateOfBirth, "1994-03-07")
            .with(Field::IdentifierSeed, "5511");
        let details = CardDetails::derive(&form, date(2026, 10, 18)).unwrap();
        assert_eq!(details.name, "ASHA RAO");
        assert_eq!(details.id_number, "KN-0711");
        assert_eq!(details.date_of_birth, "07-03-1994");
        assert_eq!(
            details.validity_line(),
            "Issued: 18-10-2026 | Expires: 18-04-2027"
        );
    }
}
