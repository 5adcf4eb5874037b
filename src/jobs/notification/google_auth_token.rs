use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::{constants::*, utils::get_epoch_ts};

#[derive(Debug, Serialize, Deserialize)]
struct GoogleTokenClaims {
    iss: String,
    iat: u64,
    exp: u64,
    aud: String,
    scope: String,
}

impl GoogleTokenClaims {
    fn new(client_email: &str, ts: u64) -> Self {
        Self {
            iss: client_email.to_string(),
            iat: ts,
            exp: ts + 3600,
            aud: GOOGLE_TOKEN_URL.to_string(),
            scope: FIREBASE_MESSAGE_SCOPE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Caches the OAuth2 access token used to call the FCM api.
/// The token is exchanged for a JWT signed with the service account key.
pub struct GoogleAuthToken {
    client_email: String,
    signing_key: EncodingKey,
    access_token: Option<String>,
    valid_till: Option<u64>,
}

impl GoogleAuthToken {
    pub fn new(client_email: &str, private_key_pem: &str) -> anyhow::Result<Self> {
        // keys copied from the service account json usually carry escaped newlines
        let pem = private_key_pem.replace("\\n", "\n");
        let signing_key = EncodingKey::from_rsa_pem(pem.as_bytes())?;
        Ok(Self {
            client_email: client_email.to_string(),
            signing_key,
            access_token: None,
            valid_till: None,
        })
    }

    pub async fn get_access_token(&mut self, client: &reqwest::Client) -> anyhow::Result<String> {
        if self.is_new_token_required(get_epoch_ts()) {
            self.new_access_token(client).await?;
        }
        self.access_token
            .clone()
            .ok_or(anyhow::anyhow!("access_token not found"))
    }

    fn is_new_token_required(&self, ts: u64) -> bool {
        match (self.access_token.as_ref(), self.valid_till) {
            (Some(_), Some(valid_till)) => ts >= valid_till,
            _ => true,
        }
    }

    async fn new_access_token(&mut self, client: &reqwest::Client) -> anyhow::Result<()> {
        tracing::debug!("requesting new google access token");
        let signed_jwt = self.new_jwt()?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/x-www-form-urlencoded".parse()?);
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", signed_jwt.as_str()),
        ];
        let response = client
            .post(GOOGLE_TOKEN_URL)
            .headers(headers)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<GoogleTokenResponse>()
            .await?;
        let ts = get_epoch_ts();
        self.store_token(response, ts);

        Ok(())
    }

    fn store_token(&mut self, response: GoogleTokenResponse, ts: u64) {
        // refresh a bit before google expires the token
        let valid_till = (ts + response.expires_in).saturating_sub(ACCESS_TOKEN_REFRESH_MARGIN);
        self.access_token = Some(response.access_token);
        self.valid_till = Some(valid_till);
    }

    fn new_jwt(&self) -> anyhow::Result<String> {
        let claims = GoogleTokenClaims::new(&self.client_email, get_epoch_ts());
        let header = Header::new(Algorithm::RS256);
        let jwt = encode(&header, &claims, &self.signing_key)?;
        Ok(jwt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_without_key() -> GoogleAuthToken {
        GoogleAuthToken {
            client_email: "notifier@trpg.iam.gserviceaccount.com".to_string(),
            signing_key: EncodingKey::from_secret(b"unused"),
            access_token: None,
            valid_till: None,
        }
    }

    #[test]
    fn test_new_token_required_when_empty() {
        let token = token_without_key();
        assert_eq!(token.is_new_token_required(1_000), true);
    }

    #[test]
    fn test_token_reused_until_margin() {
        let mut token = token_without_key();
        let response = GoogleTokenResponse {
            access_token: "ya29.token".to_string(),
            expires_in: 3600,
        };
        token.store_token(response, 1_000);
        let valid_till = 1_000 + 3600 - ACCESS_TOKEN_REFRESH_MARGIN;
        assert_eq!(token.valid_till, Some(valid_till));
        assert_eq!(token.is_new_token_required(1_000), false);
        assert_eq!(token.is_new_token_required(valid_till - 1), false);
        assert_eq!(token.is_new_token_required(valid_till), true);
    }

    #[test]
    fn test_claims() {
        let claims = GoogleTokenClaims::new("svc@example.com", 100);
        assert_eq!(claims.iss, "svc@example.com");
        assert_eq!(claims.exp, 3700);
        assert_eq!(claims.aud, GOOGLE_TOKEN_URL);
        assert_eq!(claims.scope, FIREBASE_MESSAGE_SCOPE);
    }

    #[test]
    fn test_invalid_private_key() {
        let result = GoogleAuthToken::new("svc@example.com", "not a pem");
        assert!(result.is_err());
    }
}
