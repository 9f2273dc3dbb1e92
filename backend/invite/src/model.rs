use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attending {
    #[default]
    Yes,
    No,
}

impl Attending {
    pub fn as_str(self) -> &'static str {
        match self {
            Attending::Yes => "yes",
            Attending::No => "no",
        }
    }
}

impl fmt::Display for Attending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attending {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(Attending::Yes),
            "no" => Ok(Attending::No),
            other => Err(format!("expected yes or no, got {other:?}")),
        }
    }
}

/// What a guest sends when they submit the RSVP form.
///
/// Both optional fields may be filled while the guest flips between answers;
/// only the one matching `attending` survives into an [`RsvpRecord`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpSubmission {
    pub name: String,
    pub email: String,
    pub attending: Attending,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well_wishes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<Uuid>,
}

/// One persisted attendance decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRecord {
    pub name: String,
    pub email: String,
    pub attending: Attending,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well_wishes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<Uuid>,
    pub submitted_at: DateTime<Utc>,
}

impl RsvpRecord {
    /// Builds the record to persist, keeping only the optional field that
    /// belongs to the chosen branch. Blank text counts as absent.
    pub fn from_submission(submission: &RsvpSubmission, submitted_at: DateTime<Utc>) -> Self {
        let (special_requests, well_wishes) = match submission.attending {
            Attending::Yes => (non_blank(&submission.special_requests), None),
            Attending::No => (None, non_blank(&submission.well_wishes)),
        };

        Self {
            name: submission.name.trim().to_string(),
            email: submission.email.trim().to_string(),
            attending: submission.attending,
            special_requests,
            well_wishes,
            submission_id: submission.submission_id,
            submitted_at,
        }
    }
}

fn non_blank(text: &Option<String>) -> Option<String> {
    text.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Outcome of an identity check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Admitted. Carries the stored spelling when the gate knows one.
    Admitted { canonical_name: Option<String> },
    NotAdmitted,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }

    pub fn canonical_name(&self) -> Option<&str> {
        match self {
            Admission::Admitted { canonical_name } => canonical_name.as_deref(),
            Admission::NotAdmitted => None,
        }
    }
}

/// Which identity check guards the RSVP form. Exactly one is active per deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateStrategy {
    #[default]
    Names,
    Pin,
}

impl GateStrategy {
    pub fn route(self) -> &'static str {
        match self {
            GateStrategy::Names => "/verify-name",
            GateStrategy::Pin => "/verify-pin",
        }
    }
}

impl fmt::Display for GateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateStrategy::Names => f.write_str("names"),
            GateStrategy::Pin => f.write_str("pin"),
        }
    }
}

impl FromStr for GateStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "names" | "name" => Ok(GateStrategy::Names),
            "pin" => Ok(GateStrategy::Pin),
            other => Err(format!("unknown gate strategy {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn submission(attending: Attending) -> RsvpSubmission {
        RsvpSubmission {
            name: " Jane Doe ".to_string(),
            email: "jane@x.com".to_string(),
            attending,
            special_requests: Some("vegetarian".to_string()),
            well_wishes: Some("Congratulations!".to_string()),
            submission_id: None,
        }
    }

    #[test]
    fn test_attending_keeps_special_requests_only() {
        let record = RsvpRecord::from_submission(&submission(Attending::Yes), Utc::now());

        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.special_requests.as_deref(), Some("vegetarian"));
        assert_eq!(record.well_wishes, None);
    }

    #[test]
    fn test_declining_keeps_well_wishes_only() {
        let record = RsvpRecord::from_submission(&submission(Attending::No), Utc::now());

        assert_eq!(record.special_requests, None);
        assert_eq!(record.well_wishes.as_deref(), Some("Congratulations!"));
    }

    #[test]
    fn test_blank_optional_is_absent() {
        let mut blank = submission(Attending::Yes);
        blank.special_requests = Some("   ".to_string());

        let record = RsvpRecord::from_submission(&blank, Utc::now());
        assert_eq!(record.special_requests, None);
    }

    #[test]
    fn test_attending_wire_format() {
        let json = serde_json::to_string(&submission(Attending::No)).unwrap();
        assert!(json.contains(r#""attending":"no""#));
        assert!(json.contains(r#""specialRequests":"vegetarian""#));
        assert!(!json.contains("submissionId"));

        assert!(serde_json::from_str::<Attending>(r#""maybe""#).is_err());
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("names".parse::<GateStrategy>(), Ok(GateStrategy::Names));
        assert_eq!(" PIN ".parse::<GateStrategy>(), Ok(GateStrategy::Pin));
        assert!("both".parse::<GateStrategy>().is_err());
    }

    #[test]
    fn test_admission_accessors() {
        let admitted = Admission::Admitted {
            canonical_name: Some("Jane Doe".to_string()),
        };

        assert!(admitted.is_admitted());
        assert_eq!(admitted.canonical_name(), Some("Jane Doe"));
        assert!(!Admission::NotAdmitted.is_admitted());
        assert_eq!(Admission::NotAdmitted.canonical_name(), None);
    }
}
