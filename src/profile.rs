//! User profile form: name plus a phone number validated client-side
//! against a per-country expected digit count before submission. The full
//! number sent to the server is `country code + digits only`.

use serde::{Deserialize, Serialize};

/// Wire type for `GET/POST /api/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    pub digits: usize,
}

pub const COUNTRIES: [Country; 6] = [
    Country { code: "+91", name: "India", digits: 10 },
    Country { code: "+1", name: "US/Canada", digits: 10 },
    Country { code: "+44", name: "UK", digits: 10 },
    Country { code: "+61", name: "Australia", digits: 9 },
    Country { code: "+49", name: "Germany", digits: 11 },
    Country { code: "+33", name: "France", digits: 10 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileField {
    #[default]
    Name,
    Country,
    Phone,
}

#[derive(Debug, Default)]
pub struct ProfileForm {
    pub name: String,
    pub country_index: usize,
    pub phone: String,
    pub field: ProfileField,
    pub name_error: Option<String>,
    pub phone_error: Option<String>,
    pub submit_error: Option<String>,
    pub submitting: bool,
    pub saved: bool,
}

fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

impl ProfileForm {
    pub fn country(&self) -> Country {
        COUNTRIES[self.country_index]
    }

    /// Prefill from a previously saved profile, splitting the stored full
    /// number back into country code and local digits when the code is known.
    pub fn load(&mut self, profile: &Profile) {
        self.name = profile.name.clone();
        // Longer codes first so "+4..." doesn't greedily match "+4x" wrong.
        let mut indices: Vec<usize> = (0..COUNTRIES.len()).collect();
        indices.sort_by_key(|&i| std::cmp::Reverse(COUNTRIES[i].code.len()));
        for i in indices {
            if let Some(rest) = profile.phone.strip_prefix(COUNTRIES[i].code) {
                self.country_index = i;
                self.phone = rest.to_string();
                return;
            }
        }
        self.phone = profile.phone.clone();
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            ProfileField::Name => ProfileField::Country,
            ProfileField::Country => ProfileField::Phone,
            ProfileField::Phone => ProfileField::Name,
        };
    }

    pub fn cycle_country(&mut self, delta: isize) {
        let len = COUNTRIES.len() as isize;
        self.country_index = ((self.country_index as isize + delta).rem_euclid(len)) as usize;
        self.phone_error = None;
    }

    /// Type into the focused field. Phone input accepts only digits and the
    /// common separator characters; anything else is dropped.
    pub fn push_char(&mut self, c: char) {
        self.saved = false;
        match self.field {
            ProfileField::Name => {
                self.name.push(c);
                self.name_error = None;
            }
            ProfileField::Phone => {
                if c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')') {
                    self.phone.push(c);
                    self.phone_error = None;
                }
            }
            ProfileField::Country => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.field {
            ProfileField::Name => {
                self.name.pop();
                self.name_error = None;
            }
            ProfileField::Phone => {
                self.phone.pop();
                self.phone_error = None;
            }
            ProfileField::Country => {}
        }
    }

    /// Validate both fields, recording field-level messages. Returns true
    /// when the form may be submitted.
    pub fn validate(&mut self) -> bool {
        let country = self.country();

        self.name_error = if self.name.trim().is_empty() {
            Some("Name is required".to_string())
        } else if self.name.trim().chars().count() < 2 {
            Some("Name must be at least 2 characters".to_string())
        } else {
            None
        };

        self.phone_error = if self.phone.trim().is_empty() {
            Some("Phone number is required".to_string())
        } else if digits_only(&self.phone).len() != country.digits {
            Some(format!(
                "Phone number must be {} digits for {}",
                country.digits, country.name
            ))
        } else {
            None
        };

        self.name_error.is_none() && self.phone_error.is_none()
    }

    /// The E.164-like full number: country code followed by digits only.
    pub fn full_number(&self) -> String {
        format!("{}{}", self.country().code, digits_only(&self.phone))
    }

    /// Validate and produce the payload to send. On failure the field
    /// messages are populated and the first one comes back as the error.
    pub fn try_submission(&mut self) -> crate::error::Result<Profile> {
        if !self.validate() {
            let message = self
                .name_error
                .clone()
                .or_else(|| self.phone_error.clone())
                .unwrap_or_else(|| "invalid profile".to_string());
            return Err(crate::error::Error::Validation(message));
        }
        Ok(Profile {
            name: self.name.trim().to_string(),
            phone: self.full_number(),
        })
    }

    /// Per-country display formatting; purely cosmetic.
    pub fn display_phone(&self) -> String {
        let digits = digits_only(&self.phone);
        match self.country().code {
            "+91" if digits.len() >= 5 => {
                format!("{} {}", &digits[..5], &digits[5..]).trim_end().to_string()
            }
            "+1" | "+44" if digits.len() >= 3 => {
                let mid_end = digits.len().min(6);
                let mut out = format!("({}) {}", &digits[..3], &digits[3..mid_end]);
                if digits.len() > 6 {
                    out.push('-');
                    out.push_str(&digits[6..]);
                }
                out
            }
            _ => self.phone.clone(),
        }
    }
}
