//! Field rules for user creation and replacement.
//!
//! Validation is all-or-nothing: either every field passes and a trimmed,
//! normalized [`ValidatedUser`] comes back, or a [`ValidationFailure`]
//! listing every violated field (one message per field, in declaration order).

use chrono::NaiveDate;
use thiserror::Error;
use validator::ValidateEmail;

use crate::contract::model::{Address, NewUser};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;
const PHONE_MIN: usize = 10;
const PHONE_MAX: usize = 15;
const STREET_MAX: usize = 100;
const CITY_MAX: usize = 50;
const STATE_MAX: usize = 50;
const POSTAL_CODE_MAX: usize = 20;
const COUNTRY_MAX: usize = 50;

/// A user that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<Address>,
}

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Required,
    Email,
    MinLength(usize),
    MaxLength(usize),
    DateFormat,
    /// Fallback for rules without a dedicated message.
    Invalid,
}

impl Reason {
    fn render(self, label: &str) -> String {
        match self {
            Reason::Required => format!("{label} is required"),
            Reason::Email => format!("{label} must be a valid email address"),
            Reason::MinLength(n) => format!("{label} must be at least {n} characters long"),
            Reason::MaxLength(n) => format!("{label} must be at most {n} characters long"),
            Reason::DateFormat => format!("{label} must be in YYYY-MM-DD format"),
            Reason::Invalid => format!("{label} is invalid"),
        }
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer into the request body, e.g. `/address/city`.
    pub pointer: &'static str,
    pub reason: Reason,
    pub message: String,
}

/// Aggregate error: every violation found in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
    violations: Vec<Violation>,
}

impl ValidationFailure {
    fn new(violations: Vec<Violation>) -> Self {
        let message = violations
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            message,
            violations,
        }
    }

    /// Single-field failure for checks made outside [`validate_new_user`].
    pub fn single(pointer: &'static str, label: &str, reason: Reason) -> Self {
        Self::new(vec![Violation {
            pointer,
            reason,
            message: reason.render(label),
        }])
    }

    /// Messages joined with `"; "`.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_parts(self) -> (String, Vec<Violation>) {
        (self.message, self.violations)
    }
}

/// Collects at most one violation per field.
#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn reject(&mut self, pointer: &'static str, label: &str, reason: Reason) {
        self.violations.push(Violation {
            pointer,
            reason,
            message: reason.render(label),
        });
    }

    /// Required text with a length window; returns the trimmed value.
    fn required(
        &mut self,
        pointer: &'static str,
        label: &str,
        raw: &str,
        min: usize,
        max: usize,
    ) -> String {
        let value = raw.trim();
        if value.is_empty() {
            self.reject(pointer, label, Reason::Required);
        } else {
            self.length(pointer, label, value, Some(min), max);
        }
        value.to_string()
    }

    /// Optional text; blank becomes `None`.
    fn optional(
        &mut self,
        pointer: &'static str,
        label: &str,
        raw: Option<&str>,
        min: Option<usize>,
        max: usize,
    ) -> Option<String> {
        let value = raw.map(str::trim).filter(|v| !v.is_empty())?;
        self.length(pointer, label, value, min, max);
        Some(value.to_string())
    }

    fn length(
        &mut self,
        pointer: &'static str,
        label: &str,
        value: &str,
        min: Option<usize>,
        max: usize,
    ) {
        let len = value.chars().count();
        match min {
            Some(min) if len < min => self.reject(pointer, label, Reason::MinLength(min)),
            _ if len > max => self.reject(pointer, label, Reason::MaxLength(max)),
            _ => {}
        }
    }

    fn email(&mut self, raw: &str) -> String {
        let value = raw.trim().to_string();
        if value.is_empty() {
            self.reject("/email", "Email", Reason::Required);
        } else if !value.validate_email() {
            self.reject("/email", "Email", Reason::Email);
        }
        value
    }

    fn date_of_birth(&mut self, raw: Option<&str>) -> Option<NaiveDate> {
        let value = raw.map(str::trim).filter(|v| !v.is_empty())?;
        match parse_ymd(value) {
            Some(date) => Some(date),
            None => {
                self.reject("/date_of_birth", "Date of birth", Reason::DateFormat);
                None
            }
        }
    }

    fn address(&mut self, raw: Option<&Address>) -> Option<Address> {
        let raw = raw?;
        let address = Address {
            street: self.optional(
                "/address/street",
                "Street",
                raw.street.as_deref(),
                None,
                STREET_MAX,
            ),
            city: self.optional("/address/city", "City", raw.city.as_deref(), None, CITY_MAX),
            state: self.optional(
                "/address/state",
                "State",
                raw.state.as_deref(),
                None,
                STATE_MAX,
            ),
            postal_code: self.optional(
                "/address/postal_code",
                "Postal code",
                raw.postal_code.as_deref(),
                None,
                POSTAL_CODE_MAX,
            ),
            country: self.optional(
                "/address/country",
                "Country",
                raw.country.as_deref(),
                None,
                COUNTRY_MAX,
            ),
        };
        (!address.is_empty()).then_some(address)
    }
}

/// Strict `YYYY-MM-DD`: exactly ten characters, zero-padded, a real calendar date.
fn parse_ymd(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Check every field of `input`, returning the normalized user or all violations.
pub fn validate_new_user(input: &NewUser) -> Result<ValidatedUser, ValidationFailure> {
    let mut c = Checker::default();

    let first_name = c.required("/first_name", "First name", &input.first_name, NAME_MIN, NAME_MAX);
    let last_name = c.required("/last_name", "Last name", &input.last_name, NAME_MIN, NAME_MAX);
    let email = c.email(&input.email);
    let phone = c.optional(
        "/phone",
        "Phone",
        input.phone.as_deref(),
        Some(PHONE_MIN),
        PHONE_MAX,
    );
    let date_of_birth = c.date_of_birth(input.date_of_birth.as_deref());
    let address = c.address(input.address.as_ref());

    if !c.violations.is_empty() {
        return Err(ValidationFailure::new(c.violations));
    }

    Ok(ValidatedUser {
        first_name,
        last_name,
        email,
        phone,
        date_of_birth,
        address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_render_with_field_label() {
        assert_eq!(Reason::Required.render("Email"), "Email is required");
        assert_eq!(
            Reason::MaxLength(20).render("Postal code"),
            "Postal code must be at most 20 characters long"
        );
        assert_eq!(Reason::Invalid.render("Phone"), "Phone is invalid");
    }

    fn john() -> NewUser {
        NewUser {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@x.com".into(),
            ..NewUser::default()
        }
    }

    #[test]
    fn aggregate_message_joins_in_field_order() {
        let input = NewUser {
            first_name: "".into(),
            last_name: "Doe".into(),
            email: "invalid-email".into(),
            ..NewUser::default()
        };

        let err = validate_new_user(&input).unwrap_err();
        assert_eq!(
            err.message(),
            "First name is required; Email must be a valid email address"
        );
        let pointers: Vec<_> = err.violations().iter().map(|v| v.pointer).collect();
        assert_eq!(pointers, vec!["/first_name", "/email"]);
    }

    #[test]
    fn phone_length_window() {
        let short = NewUser {
            phone: Some("123".into()),
            ..john()
        };
        let err = validate_new_user(&short).unwrap_err();
        assert_eq!(err.message(), "Phone must be at least 10 characters long");

        let ok = NewUser {
            phone: Some("1234567890".into()),
            ..john()
        };
        assert_eq!(
            validate_new_user(&ok).unwrap().phone.as_deref(),
            Some("1234567890")
        );

        let long = NewUser {
            phone: Some("1234567890123456".into()),
            ..john()
        };
        let err = validate_new_user(&long).unwrap_err();
        assert_eq!(err.message(), "Phone must be at most 15 characters long");
    }

    #[test]
    fn name_bounds_count_characters_not_bytes() {
        // two chars, four bytes
        let accented = NewUser {
            first_name: "Éa".into(),
            last_name: "Ñu".into(),
            ..john()
        };
        assert!(validate_new_user(&accented).is_ok());

        let one = NewUser {
            first_name: "J".into(),
            last_name: "D".repeat(51),
            ..john()
        };
        let err = validate_new_user(&one).unwrap_err();
        assert_eq!(
            err.message(),
            "First name must be at least 2 characters long; Last name must be at most 50 characters long"
        );
    }

    #[test]
    fn fields_are_trimmed_before_checks_and_storage() {
        let padded = NewUser {
            first_name: "  John ".into(),
            last_name: "\tDoe\n".into(),
            email: " john@x.com ".into(),
            phone: Some("   ".into()),
            ..NewUser::default()
        };
        let v = validate_new_user(&padded).unwrap();
        assert_eq!(v.first_name, "John");
        assert_eq!(v.last_name, "Doe");
        assert_eq!(v.email, "john@x.com");
        assert_eq!(v.phone, None);

        let blank_name = NewUser {
            first_name: "   ".into(),
            ..john()
        };
        assert_eq!(
            validate_new_user(&blank_name).unwrap_err().message(),
            "First name is required"
        );
    }

    #[test]
    fn date_of_birth_must_be_strict_calendar_date() {
        let ok = NewUser {
            date_of_birth: Some("1990-02-28".into()),
            ..john()
        };
        assert_eq!(
            validate_new_user(&ok).unwrap().date_of_birth,
            NaiveDate::from_ymd_opt(1990, 2, 28)
        );

        for bad in ["1990-2-28", "28/02/1990", "1990-02-30", "1990-02-28T00:00:00", "abcd-ef-gh"] {
            let input = NewUser {
                date_of_birth: Some(bad.into()),
                ..john()
            };
            let err = validate_new_user(&input).unwrap_err();
            assert_eq!(
                err.message(),
                "Date of birth must be in YYYY-MM-DD format",
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn future_date_of_birth_is_accepted() {
        let input = NewUser {
            date_of_birth: Some("2999-01-01".into()),
            ..john()
        };
        assert!(validate_new_user(&input).is_ok());
    }

    #[test]
    fn address_limits_and_normalization() {
        let input = NewUser {
            address: Some(Address {
                street: Some("s".repeat(101)),
                city: Some(" Springfield ".into()),
                state: None,
                postal_code: Some("9".repeat(21)),
                country: Some("".into()),
            }),
            ..john()
        };
        let err = validate_new_user(&input).unwrap_err();
        assert_eq!(
            err.message(),
            "Street must be at most 100 characters long; Postal code must be at most 20 characters long"
        );
        assert_eq!(err.violations()[1].pointer, "/address/postal_code");

        let blank = NewUser {
            address: Some(Address {
                street: Some("  ".into()),
                ..Address::default()
            }),
            ..john()
        };
        assert_eq!(validate_new_user(&blank).unwrap().address, None);

        let partial = NewUser {
            address: Some(Address {
                city: Some(" Springfield ".into()),
                ..Address::default()
            }),
            ..john()
        };
        let addr = validate_new_user(&partial).unwrap().address.unwrap();
        assert_eq!(addr.city.as_deref(), Some("Springfield"));
        assert_eq!(addr.street, None);
    }

    #[test]
    fn empty_request_reports_every_required_field() {
        let err = validate_new_user(&NewUser::default()).unwrap_err();
        assert_eq!(
            err.message(),
            "First name is required; Last name is required; Email is required"
        );
        assert!(err
            .violations()
            .iter()
            .all(|v| v.reason == Reason::Required));
    }
}
