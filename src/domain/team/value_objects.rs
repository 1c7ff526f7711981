use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Stable, opaque team identifier
///
/// Immutable once a team is created. Persistence layers hand these out;
/// the workflow never interprets their contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Malformed approval value received at an I/O boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid approval value: {0}")]
pub struct InvalidApprovalValue(pub String);

/// Unknown reviewer role received at an I/O boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid reviewer role: {0}")]
pub struct InvalidRole(pub String);

/// Tri-state approval held by each reviewer role
///
/// Every value is reachable from every other in one step. Externally the
/// status travels either as a number (`0`, `1`, `-1`) or as the same digits
/// in a string (`"0"`, `"1"`, `"-1"`); both decode to this enum and nothing
/// downstream of the decoder ever compares raw codes.
///
/// # Cycle
/// ```text
/// Pending -> Approved -> Rejected -> Pending
/// ```
///
/// # Example
/// ```
/// use teamboard_api::domain::team::value_objects::ApprovalStatus;
///
/// assert_eq!(ApprovalStatus::Pending.next(), ApprovalStatus::Approved);
/// assert_eq!(ApprovalStatus::from_text("-1"), Ok(ApprovalStatus::Rejected));
/// assert_eq!(ApprovalStatus::from_code(1), ApprovalStatus::from_text("1"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApprovalStatus {
    /// Awaiting a decision (initial state)
    #[default]
    Pending,
    /// Reviewer signed off
    Approved,
    /// Reviewer turned the team down
    Rejected,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 3] = [
        ApprovalStatus::Pending,
        ApprovalStatus::Approved,
        ApprovalStatus::Rejected,
    ];

    /// Click-advance affordance: a fixed 3-cycle
    pub fn next(self) -> Self {
        match self {
            ApprovalStatus::Pending => ApprovalStatus::Approved,
            ApprovalStatus::Approved => ApprovalStatus::Rejected,
            ApprovalStatus::Rejected => ApprovalStatus::Pending,
        }
    }

    /// Direct selection of any value, regardless of the current one
    pub fn set(self, target: ApprovalStatus) -> Self {
        target
    }

    /// Numeric wire code
    pub fn code(self) -> i8 {
        match self {
            ApprovalStatus::Pending => 0,
            ApprovalStatus::Approved => 1,
            ApprovalStatus::Rejected => -1,
        }
    }

    /// Textual wire code
    pub fn as_text(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "0",
            ApprovalStatus::Approved => "1",
            ApprovalStatus::Rejected => "-1",
        }
    }

    pub fn from_code(code: i64) -> Result<Self, InvalidApprovalValue> {
        match code {
            0 => Ok(ApprovalStatus::Pending),
            1 => Ok(ApprovalStatus::Approved),
            -1 => Ok(ApprovalStatus::Rejected),
            other => Err(InvalidApprovalValue(other.to_string())),
        }
    }

    pub fn from_text(text: &str) -> Result<Self, InvalidApprovalValue> {
        match text.trim() {
            "0" => Ok(ApprovalStatus::Pending),
            "1" => Ok(ApprovalStatus::Approved),
            "-1" => Ok(ApprovalStatus::Rejected),
            _ => Err(InvalidApprovalValue(format!("{:?}", text))),
        }
    }

    /// Decodes a JSON value carrying either encoding
    pub fn decode(value: &serde_json::Value) -> Result<Self, InvalidApprovalValue> {
        ApprovalStatus::deserialize(value).map_err(|_| InvalidApprovalValue(value.to_string()))
    }
}

impl FromStr for ApprovalStatus {
    type Err = InvalidApprovalValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

// Always written as the numeric code
impl Serialize for ApprovalStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i8(self.code())
    }
}

// Accepts both the numeric and the textual encoding
impl<'de> Deserialize<'de> for ApprovalStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ApprovalStatusVisitor;

        impl<'de> Visitor<'de> for ApprovalStatusVisitor {
            type Value = ApprovalStatus;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an approval code: 0, 1, -1, \"0\", \"1\" or \"-1\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                ApprovalStatus::from_code(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                let code = i64::try_from(v).map_err(|_| E::custom(InvalidApprovalValue(v.to_string())))?;
                ApprovalStatus::from_code(code).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                ApprovalStatus::from_text(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ApprovalStatusVisitor)
    }
}

/// The two fixed reviewer roles
///
/// Each role owns exactly one approval field on a team; the two are
/// independent and neither gates the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewerRole {
    Manager,
    Director,
}

impl ReviewerRole {
    pub const ALL: [ReviewerRole; 2] = [ReviewerRole::Manager, ReviewerRole::Director];
}

impl FromStr for ReviewerRole {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manager" => Ok(ReviewerRole::Manager),
            "director" => Ok(ReviewerRole::Director),
            _ => Err(InvalidRole(s.to_string())),
        }
    }
}

impl fmt::Display for ReviewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewerRole::Manager => write!(f, "manager"),
            ReviewerRole::Director => write!(f, "director"),
        }
    }
}

/// Email value object for team members
///
/// # Invariants
/// - Must contain '@' character
/// - Must be at least 3 characters long
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Example
    /// ```
    /// use teamboard_api::domain::team::value_objects::Email;
    ///
    /// let email = Email::new("lead@example.com").expect("valid email");
    /// assert_eq!(email.as_str(), "lead@example.com");
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, String> {
        let email = email.into();
        if email.contains('@') && email.len() >= 3 {
            Ok(Email(email))
        } else {
            Err(format!("Invalid email: {}", email))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
