use crate::error::AppError;

use std::env;

pub const DEFAULT_CLIENT_IDENTITY: &str = "user";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_PORT: u16 = 5000;

/// Credentials and identifiers for the Twilio account the relay acts for.
#[derive(Clone, Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub api_key: String,
    pub api_secret: String,
    /// TwiML app that outgoing browser calls are routed through
    pub twiml_app_sid: String,
    /// Provisioned number presented as caller id on outbound dials
    pub phone_number: String,
    /// Identity embedded in every issued client token
    pub client_identity: String,
}

#[derive(Clone, Debug)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub twilio: TwilioConfig,
    pub openai: OpenAIConfig,
    pub frontend_origin: String,
    pub port: u16,
}

impl Config {
    /// Read configuration from the process environment. A `.env` file should already have been
    /// loaded by the caller if one is wanted.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup. Empty values are treated the same
    /// as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(AppError::MissingConfig(name));

        let twilio = TwilioConfig {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
            api_key: required("TWILIO_API_KEY")?,
            api_secret: required("TWILIO_API_SECRET")?,
            twiml_app_sid: required("TWILIO_TWIML_APP_SID")?,
            phone_number: required("TWILIO_PHONE_NUMBER")?,
            client_identity: get("TWILIO_CLIENT_IDENTITY")
                .unwrap_or_else(|| DEFAULT_CLIENT_IDENTITY.to_string()),
        };
        let openai = OpenAIConfig {
            api_key: required("OPENAI_API_KEY")?,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        };
        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| AppError::InvalidConfig {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            twilio,
            openai,
            frontend_origin: get("FRONTEND_ORIGIN")
                .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string()),
            port,
        })
    }
}
