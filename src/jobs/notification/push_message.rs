use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::{collections::HashMap, time::Duration};
use tokio::sync::Mutex;

use super::google_auth_token::GoogleAuthToken;
use crate::{constants::*, utils::replace_placeholders};

#[cfg(test)]
use mockall::automock;

/// A single push notification addressed to one device token
#[derive(Debug, Clone, PartialEq)]
pub struct PushNotification {
    pub token: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
struct PushMessageNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct PushMessage<'a> {
    token: &'a str,
    notification: PushMessageNotification<'a>,
}

#[derive(Debug, Serialize)]
struct PushPayload<'a> {
    message: PushMessage<'a>,
}

impl<'a> PushPayload<'a> {
    fn new(notification: &'a PushNotification) -> Self {
        let message = PushMessage {
            token: &notification.token,
            notification: PushMessageNotification {
                title: &notification.title,
                body: &notification.body,
            },
        };
        Self { message }
    }
}

/// Client for the Firebase Cloud Messaging HTTP v1 api
pub struct FcmClient {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Mutex<GoogleAuthToken>,
}

#[cfg_attr(test, automock)]
impl FcmClient {
    pub fn new() -> anyhow::Result<Self> {
        let project_id = std::env::var("FIREBASE_PROJECT_ID")
            .map_err(|_| anyhow::anyhow!("FIREBASE_PROJECT_ID not found in .env file"))?;
        let client_email = std::env::var("FIREBASE_CLIENT_EMAIL")
            .map_err(|_| anyhow::anyhow!("FIREBASE_CLIENT_EMAIL not found in .env file"))?;
        let private_key = std::env::var("FIREBASE_PRIVATE_KEY")
            .map_err(|_| anyhow::anyhow!("FIREBASE_PRIVATE_KEY not found in .env file"))?;
        let auth_token = GoogleAuthToken::new(&client_email, &private_key)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let mut options = HashMap::new();
        options.insert("projectId".to_string(), project_id);
        let endpoint = replace_placeholders(FCM_ENDPOINT, &options)?;
        Ok(Self {
            client,
            endpoint,
            auth_token: Mutex::new(auth_token),
        })
    }

    pub async fn send(&self, notification: &PushNotification) -> anyhow::Result<()> {
        let access_token = {
            let mut auth_token = self.auth_token.lock().await;
            auth_token.get_access_token(&self.client).await?
        };
        let bearer_token = format!("Bearer {}", access_token);
        let payload = PushPayload::new(notification);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer_token.as_str().parse()?);
        headers.insert(CONTENT_TYPE, "application/json".parse()?);
        let res = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&payload)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("fcm responded with {status}: {body}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_push_payload() {
        let notification = PushNotification {
            token: "tok1".to_string(),
            title: PUSH_MESSAGE_TITLE.to_string(),
            body: "\"Lost Mine\" 세션이 내일 시작됩니다!".to_string(),
        };
        let payload = serde_json::to_value(PushPayload::new(&notification)).unwrap();
        let expected = json!({
            "message": {
                "token": "tok1",
                "notification": {
                    "title": "TRPG 세션 알림",
                    "body": "\"Lost Mine\" 세션이 내일 시작됩니다!"
                }
            }
        });
        assert_eq!(payload, expected);
    }
}
