//! SMS gateway client.
//!
//! Monthly report texts go out through a generic HTTP gateway: one JSON POST
//! per message, authenticated with a bearer token. The gateway is optional;
//! when it is not configured, reports are email-only.

use serde::Serialize;

use crate::{config::SmsConfig, errors::Error};

#[derive(Debug, Serialize)]
struct SmsPayload<'a> {
    from: &'a str,
    to: &'a str,
    body: &'a str,
}

pub struct SmsService {
    client: reqwest::Client,
    config: SmsConfig,
}

impl SmsService {
    pub fn new(config: SmsConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Internal {
                operation: format!("create SMS client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    pub async fn send(&self, to: &str, body: &str) -> Result<(), Error> {
        let payload = SmsPayload {
            from: &self.config.from,
            to,
            body,
        };

        self.client
            .post(self.config.gateway_url.clone())
            .bearer_auth(&self.config.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Internal {
                operation: format!("send SMS: {e}"),
            })?
            .error_for_status()
            .map_err(|e| Error::Internal {
                operation: format!("SMS gateway rejected message: {e}"),
            })?;

        Ok(())
    }
}
