//! # Backend Module
//!
//! REST gateways for the media-management backends (Radarr for movies,
//! Sonarr for shows).
//!
//! Both speak the v3 API and authenticate with the `X-Api-Key` header. The
//! [`MediaGateway`] trait is the seam the cache and the lookup service
//! depend on, so tests swap in a mock instead of a live server.
//!
//! Discover and the release search/grab only exist on Radarr. The trait's
//! default implementations answer [`FetchError::Unsupported`] for them.

pub mod client;
pub mod radarr;
pub mod sonarr;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::media::{DownloadItem, MediaEntry, QualityProfile, Release};

pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;

/// Operaciones que el bot necesita de un backend *arr
#[cfg_attr(test, mockall::automock(type Entry = crate::media::Movie;))]
#[async_trait]
pub trait MediaGateway: Send + Sync {
    type Entry: MediaEntry;

    /// Nombre del backend para logs
    fn name(&self) -> &'static str;

    /// Todas las entradas conocidas por el backend (la biblioteca)
    async fn fetch_all(&self) -> Result<Vec<Self::Entry>, FetchError>;

    /// Búsqueda por término, en el orden que devuelve el backend
    async fn search(&self, term: &str) -> Result<Vec<Self::Entry>, FetchError>;

    /// Agrega una entrada a la biblioteca y devuelve la copia del backend
    async fn add(
        &self,
        entry: &Self::Entry,
        profile_id: i64,
        root_path: &str,
    ) -> Result<Self::Entry, FetchError>;

    /// Cola de descargas activa
    async fn downloads(&self) -> Result<Vec<DownloadItem>, FetchError>;

    /// Perfiles de calidad disponibles
    async fn profiles(&self) -> Result<Vec<QualityProfile>, FetchError>;

    /// Recomendaciones del backend a partir de la biblioteca
    async fn discover(&self) -> Result<Vec<Self::Entry>, FetchError> {
        Err(FetchError::Unsupported {
            backend: self.name(),
            operation: "discover",
        })
    }

    /// Releases que los indexadores ofrecen para una entrada de la biblioteca
    async fn releases(&self, _entry: &Self::Entry) -> Result<Vec<Release>, FetchError> {
        Err(FetchError::Unsupported {
            backend: self.name(),
            operation: "releases",
        })
    }

    /// Fuerza la descarga de un release ya listado por `releases`
    async fn grab(&self, _guid: &str, _indexer_id: i64) -> Result<(), FetchError> {
        Err(FetchError::Unsupported {
            backend: self.name(),
            operation: "grab",
        })
    }
}
