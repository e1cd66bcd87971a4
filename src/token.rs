use crate::config::TwilioConfig;
use crate::consts::TOKEN_TTL_SECS;
use crate::error::AppError;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Content type Twilio expects on access tokens.
const TWILIO_TOKEN_CTY: &str = "twilio-fpa;v=1";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct IncomingGrant {
    pub allow: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct OutgoingGrant {
    pub application_sid: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct VoiceGrant {
    pub incoming: IncomingGrant,
    pub outgoing: OutgoingGrant,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Grants {
    pub identity: String,
    pub voice: VoiceGrant,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AccessTokenClaims {
    pub jti: String,
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub grants: Grants,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

/// Mints Twilio Voice access tokens for the browser client. Signing is local; nothing here
/// touches the network.
pub struct TokenIssuer {
    account_sid: String,
    api_key: String,
    twiml_app_sid: String,
    identity: String,
    key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(twilio: &TwilioConfig) -> Self {
        Self {
            account_sid: twilio.account_sid.clone(),
            api_key: twilio.api_key.clone(),
            twiml_app_sid: twilio.twiml_app_sid.clone(),
            identity: twilio.client_identity.clone(),
            key: EncodingKey::from_secret(twilio.api_secret.as_bytes()),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn claims_at(&self, issued_at: i64) -> AccessTokenClaims {
        AccessTokenClaims {
            jti: format!("{}-{}", self.api_key, issued_at),
            iss: self.api_key.clone(),
            sub: self.account_sid.clone(),
            iat: issued_at,
            exp: issued_at + TOKEN_TTL_SECS,
            grants: Grants {
                identity: self.identity.clone(),
                voice: VoiceGrant {
                    incoming: IncomingGrant { allow: true },
                    outgoing: OutgoingGrant {
                        application_sid: self.twiml_app_sid.clone(),
                    },
                },
            },
        }
    }

    pub fn issue(&self) -> Result<String, AppError> {
        let claims = self.claims_at(OffsetDateTime::now_utc().unix_timestamp());
        let mut header = Header::new(Algorithm::HS256);
        header.cty = Some(TWILIO_TOKEN_CTY.to_string());
        Ok(jsonwebtoken::encode(&header, &claims, &self.key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    fn twilio_config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC0001".to_string(),
            auth_token: "auth".to_string(),
            api_key: "SK0001".to_string(),
            api_secret: "shh".to_string(),
            twiml_app_sid: "AP0001".to_string(),
            phone_number: "+15550001111".to_string(),
            client_identity: "user".to_string(),
        }
    }

    #[test]
    fn issued_token_verifies_with_api_secret() {
        let issuer = TokenIssuer::new(&twilio_config());
        let token = issuer.issue().unwrap();
        assert!(!token.is_empty());

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(header.cty.as_deref(), Some(TWILIO_TOKEN_CTY));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&["SK0001"]);
        let data = decode::<AccessTokenClaims>(
            &token,
            &DecodingKey::from_secret(b"shh"),
            &validation,
        )
        .unwrap();
        assert_eq!(data.claims.sub, "AC0001");
        assert_eq!(data.claims.grants.identity, "user");
        assert_eq!(data.claims.grants.voice.outgoing.application_sid, "AP0001");
        assert!(data.claims.grants.voice.incoming.allow);
    }

    #[test]
    fn token_is_valid_for_one_hour() {
        let issuer = TokenIssuer::new(&twilio_config());
        let claims = issuer.claims_at(1_700_000_000);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.jti, "SK0001-1700000000");
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let issuer = TokenIssuer::new(&twilio_config());
        let token = issuer.issue().unwrap();
        let res = decode::<AccessTokenClaims>(
            &token,
            &DecodingKey::from_secret(b"not-the-secret"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(res.is_err());
    }
}
