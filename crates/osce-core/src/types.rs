//! Shared types for OSCE Voice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Voice used for the simulated patient's synthesized speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    Female,
}

impl FromStr for VoiceGender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(VoiceGender::Male),
            "female" => Ok(VoiceGender::Female),
            other => Err(format!(
                "unknown gender {other:?}, expected \"male\" or \"female\""
            )),
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceGender::Male => write!(f, "male"),
            VoiceGender::Female => write!(f, "female"),
        }
    }
}

/// Author of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Assistant,
    User,
}

impl Role {
    /// Wire name used by chat APIs and history payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Assistant => "assistant",
            Role::User => "user",
        }
    }
}

/// One turn of an interview transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_gender_from_str() {
        assert_eq!("male".parse::<VoiceGender>().unwrap(), VoiceGender::Male);
        assert_eq!("Female".parse::<VoiceGender>().unwrap(), VoiceGender::Female);
        assert_eq!(" MALE ".parse::<VoiceGender>().unwrap(), VoiceGender::Male);

        let err = "robot".parse::<VoiceGender>().unwrap_err();
        assert!(err.contains("robot"));
    }

    #[test]
    fn test_voice_gender_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&VoiceGender::Female).unwrap(),
            "\"female\""
        );
        let parsed: VoiceGender = serde_json::from_str("\"male\"").unwrap();
        assert_eq!(parsed, VoiceGender::Male);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);
    }

    #[test]
    fn test_turn_constructors() {
        let turn = Turn::user("Where does it hurt?");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "Where does it hurt?");

        let json = serde_json::to_value(Turn::assistant("In my chest.")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "In my chest.");
    }
}
