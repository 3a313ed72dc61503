//! Wire types of the interview state protocol.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use interview_fields::{Button, FieldSchemas, FormValues};

/// A question step: fields to fill in plus optional buttons.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuestionContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: FieldSchemas,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<Button>>,
}

/// A terminal step with nothing to answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExitContent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepContent {
    Question(QuestionContent),
    Exit(ExitContent),
}

impl StepContent {
    pub fn title(&self) -> Option<&str> {
        match self {
            StepContent::Question(question) => question.title.as_deref(),
            StepContent::Exit(exit) => Some(&exit.title),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompleteResponse {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
    /// `None` while the server has nothing to show yet.
    #[serde(default)]
    pub content: Option<StepContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub state: String,
    pub target_url: String,
}

/// The server's description of the next step, or of completion.
///
/// On the wire the two shapes are told apart by the `complete` flag.
#[derive(Debug, Clone, PartialEq)]
pub enum InterviewStateResponse {
    Incomplete(IncompleteResponse),
    Complete(CompleteResponse),
}

impl InterviewStateResponse {
    pub fn state(&self) -> &str {
        match self {
            InterviewStateResponse::Incomplete(response) => &response.state,
            InterviewStateResponse::Complete(response) => &response.state,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, InterviewStateResponse::Complete(_))
    }

    pub fn update_url(&self) -> Option<&str> {
        match self {
            InterviewStateResponse::Incomplete(response) => response.update_url.as_deref(),
            InterviewStateResponse::Complete(_) => None,
        }
    }

    pub fn content(&self) -> Option<&StepContent> {
        match self {
            InterviewStateResponse::Incomplete(response) => response.content.as_ref(),
            InterviewStateResponse::Complete(_) => None,
        }
    }

    pub fn question(&self) -> Option<&QuestionContent> {
        match self.content() {
            Some(StepContent::Question(question)) => Some(question),
            _ => None,
        }
    }

    pub fn target_url(&self) -> Option<&str> {
        match self {
            InterviewStateResponse::Complete(response) => Some(&response.target_url),
            InterviewStateResponse::Incomplete(_) => None,
        }
    }

    /// Incomplete with no content: the server is still working.
    pub fn is_pending(&self) -> bool {
        matches!(self, InterviewStateResponse::Incomplete(response) if response.content.is_none())
    }
}

#[derive(Serialize)]
struct CompleteWire<'a> {
    state: &'a str,
    target_url: &'a str,
    complete: bool,
}

impl Serialize for InterviewStateResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InterviewStateResponse::Incomplete(response) => response.serialize(serializer),
            InterviewStateResponse::Complete(response) => CompleteWire {
                state: &response.state,
                target_url: &response.target_url,
                complete: true,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for InterviewStateResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let complete = match value.get("complete") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "`complete` must be a boolean, got {other}"
                )));
            }
        };
        if complete {
            serde_json::from_value(value)
                .map(InterviewStateResponse::Complete)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(InterviewStateResponse::Incomplete)
                .map_err(D::Error::custom)
        }
    }
}

/// Body posted to an `update_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<FormValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<usize>,
}
