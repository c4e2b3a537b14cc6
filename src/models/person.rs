use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::{ReservationError, Result};

/// Which contact field a deployment collects next to the customer name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    #[default]
    Phone,
    Email,
}

impl ContactKind {
    /// Column title used in listings and CSV export.
    pub fn label(&self) -> &'static str {
        match self {
            ContactKind::Phone => "Teléfono",
            ContactKind::Email => "Correo",
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactKind::Phone => f.write_str("phone"),
            ContactKind::Email => f.write_str("email"),
        }
    }
}

impl FromStr for ContactKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phone" => Ok(ContactKind::Phone),
            "email" => Ok(ContactKind::Email),
            other => Err(format!("unknown contact kind `{other}` (expected phone or email)")),
        }
    }
}

/// How the contact field is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPolicy {
    pub kind: ContactKind,
    pub required: bool,
}

/// Customer a seat is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl Person {
    /// Builds a person with trimmed fields, rejecting what `policy` forbids.
    /// A blank contact is stored as absent.
    pub fn new(name: &str, contact: Option<&str>, policy: ContactPolicy) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReservationError::validation("customer name must not be empty"));
        }

        let contact = contact.map(str::trim).filter(|c| !c.is_empty());
        match contact {
            None if policy.required => {
                return Err(ReservationError::validation(format!(
                    "customer {} is required",
                    policy.kind
                )));
            }
            Some(email) if policy.kind == ContactKind::Email && !email.validate_email() => {
                return Err(ReservationError::validation(format!(
                    "`{email}` is not a valid email address"
                )));
            }
            _ => {}
        }

        Ok(Self {
            name: name.to_string(),
            contact: contact.map(str::to_string),
        })
    }
}
