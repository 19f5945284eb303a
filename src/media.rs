//! # Media Module
//!
//! Entry types returned by the Radarr and Sonarr REST APIs.
//!
//! Only the fields the bot renders or reconciles on are modeled. Everything
//! else the backend sends is kept in a flattened `extra` map and serialized
//! back unchanged, so an entry from a lookup can be posted as-is when adding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tipo de medio manejado por un backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Movie,
    Show,
}

impl MediaKind {
    /// Nombre del comando slash asociado
    pub fn command_name(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "show",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            MediaKind::Movie => "película",
            MediaKind::Show => "serie",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            MediaKind::Movie => "películas",
            MediaKind::Show => "series",
        }
    }

    /// Nombre del backend que sirve este tipo de medio
    pub fn backend_name(self) -> &'static str {
        match self {
            MediaKind::Movie => "Radarr",
            MediaKind::Show => "Sonarr",
        }
    }
}

/// A media item with a stable, backend-assigned identifier.
///
/// `id()` is the external id the cache is keyed by (TMDB for movies, TVDB for
/// shows). It stays the same across refreshes and between a lookup result and
/// the library copy of the same item.
pub trait MediaEntry: Clone + Send + Sync + 'static {
    const KIND: MediaKind;

    fn id(&self) -> i64;
    fn title(&self) -> &str;
    fn year(&self) -> Option<i32>;
    fn overview(&self) -> Option<&str>;
    fn poster(&self) -> Option<&str>;

    /// Campos extra para mostrar en el chat
    fn details(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Película de Radarr
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// Id interno de Radarr; solo lo tienen las películas de la biblioteca
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub tmdb_id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_poster: Option<String>,
    #[serde(default)]
    pub has_file: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Movie {
    pub fn new(tmdb_id: i64, title: impl Into<String>) -> Self {
        Self {
            id: None,
            tmdb_id,
            title: title.into(),
            year: None,
            overview: None,
            remote_poster: None,
            has_file: false,
            extra: Map::new(),
        }
    }
}

impl MediaEntry for Movie {
    const KIND: MediaKind = MediaKind::Movie;

    fn id(&self) -> i64 {
        self.tmdb_id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn year(&self) -> Option<i32> {
        self.year
    }
    fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }
    fn poster(&self) -> Option<&str> {
        self.remote_poster.as_deref()
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("TMDB", self.tmdb_id.to_string()),
            ("Descargada", if self.has_file { "Sí" } else { "No" }.to_string()),
        ]
    }
}

/// Serie de Sonarr
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub tvdb_id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Show {
    pub fn new(tvdb_id: i64, title: impl Into<String>) -> Self {
        Self {
            tvdb_id,
            title: title.into(),
            year: None,
            overview: None,
            remote_poster: None,
            network: None,
            status: None,
            extra: Map::new(),
        }
    }
}

impl MediaEntry for Show {
    const KIND: MediaKind = MediaKind::Show;

    fn id(&self) -> i64 {
        self.tvdb_id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn year(&self) -> Option<i32> {
        self.year
    }
    fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }
    fn poster(&self) -> Option<&str> {
        self.remote_poster.as_deref()
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details = vec![("TVDB", self.tvdb_id.to_string())];
        if let Some(network) = &self.network {
            details.push(("Cadena", network.clone()));
        }
        if let Some(status) = &self.status {
            details.push(("Estado", status.clone()));
        }
        details
    }
}

/// Elemento de la cola de descargas (`/api/v3/queue`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadItem {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timeleft: Option<String>,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub sizeleft: f64,
}

impl DownloadItem {
    /// Progreso entre 0.0 y 1.0
    pub fn progress(&self) -> f64 {
        if self.size <= 0.0 {
            return 0.0;
        }
        ((self.size - self.sizeleft) / self.size).clamp(0.0, 1.0)
    }
}

/// Página de la cola; Radarr y Sonarr v3 paginan `records`
#[derive(Debug, Clone, Deserialize)]
pub struct QueuePage {
    #[serde(default)]
    pub records: Vec<DownloadItem>,
}

/// Perfil de calidad (`/api/v3/qualityprofile`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QualityProfile {
    pub id: i64,
    pub name: String,
}

/// Resultado de búsqueda en los indexadores (`/api/v3/release`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub guid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub indexer: Option<String>,
    pub indexer_id: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub seeders: Option<i64>,
    #[serde(default)]
    pub leechers: Option<i64>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub rejected: bool,
    #[serde(default)]
    pub rejections: Vec<String>,
}

impl Release {
    /// Tamaño legible en GB o MB
    pub fn size_label(&self) -> String {
        const MB: f64 = 1024.0 * 1024.0;
        let mb = self.size as f64 / MB;
        if mb >= 1024.0 {
            format!("{:.2} GB", mb / 1024.0)
        } else {
            format!("{:.0} MB", mb)
        }
    }
}
