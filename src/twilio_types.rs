pub fn wrap_twiml(twiml: String) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{twiml}")
}

mod twiml {
    use xmlserde_derives::XmlSerialize;

    #[derive(PartialEq, Eq, XmlSerialize, Default)]
    #[xmlserde(root = b"Response")]
    pub struct Response {
        #[xmlserde(ty = "untag")]
        pub actions: Vec<ResponseAction>,
    }

    #[derive(PartialEq, Eq, XmlSerialize)]
    pub enum ResponseAction {
        #[xmlserde(name = b"Dial")]
        Dial(DialAction),
    }

    #[derive(PartialEq, Eq, XmlSerialize, Default)]
    pub struct DialAction {
        #[xmlserde(name = b"callerId", ty = "attr")]
        pub caller_id: Option<String>,
        #[xmlserde(name = b"Number", ty = "child")]
        pub number: Option<NumberNoun>,
    }

    #[derive(PartialEq, Eq, XmlSerialize, Default)]
    pub struct NumberNoun {
        #[xmlserde(ty = "text")]
        pub number: String,
    }
}
pub use twiml::*;

mod webhook {
    use serde::{Deserialize, Deserializer};

    /// Lifecycle label from a status callback. Labels outside the documented set are kept
    /// verbatim in `Other`.
    #[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
    #[serde(from = "String")]
    pub enum CallStatus {
        Queued,
        Ringing,
        InProgress,
        Completed,
        Busy,
        Failed,
        NoAnswer,
        Canceled,
        Other(String),
    }

    impl From<String> for CallStatus {
        fn from(raw: String) -> Self {
            match raw.as_str() {
                "queued" => CallStatus::Queued,
                "ringing" => CallStatus::Ringing,
                "in-progress" => CallStatus::InProgress,
                "completed" => CallStatus::Completed,
                "busy" => CallStatus::Busy,
                "failed" => CallStatus::Failed,
                "no-answer" => CallStatus::NoAnswer,
                "canceled" => CallStatus::Canceled,
                _ => CallStatus::Other(raw),
            }
        }
    }

    impl CallStatus {
        pub fn as_str(&self) -> &str {
            match self {
                CallStatus::Queued => "queued",
                CallStatus::Ringing => "ringing",
                CallStatus::InProgress => "in-progress",
                CallStatus::Completed => "completed",
                CallStatus::Busy => "busy",
                CallStatus::Failed => "failed",
                CallStatus::NoAnswer => "no-answer",
                CallStatus::Canceled => "canceled",
                CallStatus::Other(raw) => raw,
            }
        }
    }

    /// Blank or non-numeric durations read as absent.
    fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|v| v.trim().parse::<i32>().ok()))
    }

    /// The fields of Twilio's voice webhook we act on. Both are optional on the wire; the router
    /// decides what to do when they are missing.
    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "PascalCase")]
    pub struct TwilioVoicePayload {
        pub to: Option<String>,
        pub call_sid: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct TwilioStatusPayload {
        pub call_sid: String,
        pub call_status: CallStatus,
        #[serde(default, deserialize_with = "lenient_seconds")]
        pub call_duration: Option<i32>,
    }
}
pub use webhook::*;
