use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::client::{add_body, BaseArrClient};
use super::MediaGateway;
use crate::config::ArrSettings;
use crate::error::FetchError;
use crate::media::{DownloadItem, Movie, QualityProfile, QueuePage, Release};

/// Gateway de películas sobre la API v3 de Radarr
pub struct RadarrClient(BaseArrClient);

impl RadarrClient {
    pub fn new(settings: &ArrSettings, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self(BaseArrClient::new(settings, timeout)?))
    }
}

#[async_trait]
impl MediaGateway for RadarrClient {
    type Entry = Movie;

    fn name(&self) -> &'static str {
        "Radarr"
    }

    async fn fetch_all(&self) -> Result<Vec<Movie>, FetchError> {
        self.0.get_json("/movie", &[]).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Movie>, FetchError> {
        self.0.get_json("/movie/lookup", &[("term", term)]).await
    }

    async fn add(
        &self,
        movie: &Movie,
        profile_id: i64,
        root_path: &str,
    ) -> Result<Movie, FetchError> {
        let body = add_body(
            movie,
            profile_id,
            root_path,
            json!({ "searchForMovie": true }),
        )?;
        self.0.post_json("/movie", &body).await
    }

    async fn downloads(&self) -> Result<Vec<DownloadItem>, FetchError> {
        let page: QueuePage = self.0.get_json("/queue", &[("pageSize", "100")]).await?;
        Ok(page.records)
    }

    async fn profiles(&self) -> Result<Vec<QualityProfile>, FetchError> {
        self.0.get_json("/qualityprofile", &[]).await
    }

    async fn discover(&self) -> Result<Vec<Movie>, FetchError> {
        self.0
            .get_json("/importlist/movie", &[("includeRecommendations", "true")])
            .await
    }

    async fn releases(&self, movie: &Movie) -> Result<Vec<Release>, FetchError> {
        let id = movie.id.ok_or_else(|| {
            FetchError::InvalidRequest(format!("'{}' no está en la biblioteca", movie.title))
        })?;
        let id = id.to_string();
        self.0.get_json("/release", &[("movieId", id.as_str())]).await
    }

    async fn grab(&self, guid: &str, indexer_id: i64) -> Result<(), FetchError> {
        let body = json!({ "guid": guid, "indexerId": indexer_id });
        // Radarr responde con el release aceptado; no se usa
        let _: Value = self.0.post_json("/release", &body).await?;
        Ok(())
    }
}
