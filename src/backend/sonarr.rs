use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::client::{add_body, BaseArrClient};
use super::MediaGateway;
use crate::config::ArrSettings;
use crate::error::FetchError;
use crate::media::{DownloadItem, QualityProfile, QueuePage, Show};

/// Gateway de series sobre la API v3 de Sonarr
pub struct SonarrClient(BaseArrClient);

impl SonarrClient {
    pub fn new(settings: &ArrSettings, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self(BaseArrClient::new(settings, timeout)?))
    }
}

#[async_trait]
impl MediaGateway for SonarrClient {
    type Entry = Show;

    fn name(&self) -> &'static str {
        "Sonarr"
    }

    async fn fetch_all(&self) -> Result<Vec<Show>, FetchError> {
        self.0.get_json("/series", &[]).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Show>, FetchError> {
        self.0.get_json("/series/lookup", &[("term", term)]).await
    }

    async fn add(
        &self,
        show: &Show,
        profile_id: i64,
        root_path: &str,
    ) -> Result<Show, FetchError> {
        let mut body = add_body(
            show,
            profile_id,
            root_path,
            json!({ "searchForMissingEpisodes": true }),
        )?;
        body["seasonFolder"] = json!(true);
        self.0.post_json("/series", &body).await
    }

    async fn downloads(&self) -> Result<Vec<DownloadItem>, FetchError> {
        let page: QueuePage = self.0.get_json("/queue", &[("pageSize", "100")]).await?;
        Ok(page.records)
    }

    async fn profiles(&self) -> Result<Vec<QualityProfile>, FetchError> {
        self.0.get_json("/qualityprofile", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SonarrClient {
        let settings = ArrSettings {
            url: format!("{}/", server.uri()),
            api_key: "sonarr-key".to_string(),
            root_path: "/tv".to_string(),
            default_profile: "HD-1080p".to_string(),
        };
        SonarrClient::new(&settings, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_trims_trailing_slash_from_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/series/lookup"))
            .and(query_param("term", "breaking bad"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"tvdbId": 81189, "title": "Breaking Bad", "network": "AMC"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let shows = client_for(&server).search("breaking bad").await.unwrap();

        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].tvdb_id, 81189);
        assert_eq!(shows[0].network.as_deref(), Some("AMC"));
    }

    #[tokio::test]
    async fn test_add_uses_season_folders() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/series"))
            .and(body_partial_json(json!({
                "tvdbId": 81189,
                "seasonFolder": true,
                "rootFolderPath": "/tv",
                "addOptions": {"searchForMissingEpisodes": true}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 3, "tvdbId": 81189, "title": "Breaking Bad"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let added = client_for(&server)
            .add(&Show::new(81189, "Breaking Bad"), 6, "/tv")
            .await
            .unwrap();

        assert_eq!(added.title, "Breaking Bad");
    }

    #[tokio::test]
    async fn test_profiles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/qualityprofile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Any"},
                {"id": 6, "name": "HD-1080p"}
            ])))
            .mount(&server)
            .await;

        let profiles = client_for(&server).profiles().await.unwrap();

        assert_eq!(profiles[1], QualityProfile { id: 6, name: "HD-1080p".to_string() });
    }

    #[tokio::test]
    async fn test_discover_is_unsupported() {
        let server = MockServer::start().await;

        let err = client_for(&server).discover().await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::Unsupported {
                backend: "Sonarr",
                operation: "discover"
            }
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
