use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ArrSettings;
use crate::error::FetchError;

/// Cliente HTTP compartido por Radarr y Sonarr
pub struct BaseArrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl BaseArrClient {
    /// Builds the HTTP client with the request timeout applied.
    ///
    /// A builder failure is returned instead of falling back to a client
    /// without timeout.
    pub fn new(settings: &ArrSettings, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .send()
            .await?;

        decode(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FetchError> {
        debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .header("X-Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, FetchError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Construye el cuerpo de un POST de alta a partir de una entrada de lookup.
///
/// La entrada se envía completa; solo se agregan los campos de alta.
pub fn add_body<E: Serialize>(
    entry: &E,
    profile_id: i64,
    root_path: &str,
    add_options: Value,
) -> Result<Value, FetchError> {
    let mut body = serde_json::to_value(entry)?;
    let object = body
        .as_object_mut()
        .ok_or_else(|| FetchError::InvalidRequest("La entrada no es un objeto JSON".to_string()))?;

    object.insert("qualityProfileId".to_string(), Value::from(profile_id));
    object.insert("rootFolderPath".to_string(), Value::from(root_path));
    object.insert("monitored".to_string(), Value::Bool(true));
    object.insert("addOptions".to_string(), add_options);

    Ok(body)
}
