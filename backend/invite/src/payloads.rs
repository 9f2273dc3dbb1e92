//! JSON bodies exchanged with the backend.
//!
//! Request fields are optional so a missing field reaches the handler and is
//! answered with a 400 naming it, instead of a generic decode failure.

use serde::{Deserialize, Serialize};

use crate::{Admission, Attending, Field};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VerifyNameRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyNameResponse {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_name: Option<String>,
}

impl From<Admission> for VerifyNameResponse {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Admitted { canonical_name } => Self {
                is_valid: true,
                validated_name: canonical_name,
            },
            Admission::NotAdmitted => Self::default(),
        }
    }
}

impl From<VerifyNameResponse> for Admission {
    fn from(response: VerifyNameResponse) -> Self {
        if response.is_valid {
            Admission::Admitted {
                canonical_name: response.validated_name,
            }
        } else {
            Admission::NotAdmitted
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchNamesRequest {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchNamesResponse {
    pub suggestions: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VerifyPinRequest {
    #[serde(default)]
    pub pin: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPinResponse {
    pub is_valid: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    /// Set when the submission id was already recorded and nothing new was stored.
    #[serde(default)]
    pub duplicate: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attending: Option<Attending>,
}

impl ConfirmationRequest {
    pub fn new(email: &str, name: &str, attending: Attending) -> Self {
        Self {
            email: Some(email.to_string()),
            name: Some(name.to_string()),
            attending: Some(attending),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMessage {
    pub field: Field,
    pub message: String,
}

/// Body of every non-2xx answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldMessage>,
}
