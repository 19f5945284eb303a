use anyhow::{Context, Result};
use std::time::Duration;

use crate::lookup::DEFAULT_MAX_RESULTS;

/// Conexión a un backend *arr (Radarr o Sonarr)
#[derive(Debug, Clone, PartialEq)]
pub struct ArrSettings {
    pub url: String,
    pub api_key: String,
    /// Carpeta raíz donde el backend guarda lo agregado
    pub root_path: String,
    /// Nombre del perfil de calidad usado al agregar
    pub default_profile: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub application_id: u64,
    pub guild_id: Option<u64>, // Para comandos de desarrollo
    pub notification_channels: Vec<u64>,

    // Backends
    pub radarr: Option<ArrSettings>,
    pub sonarr: Option<ArrSettings>,

    // Búsquedas y caché
    pub max_results: usize,
    pub cache_refresh_interval: Duration,
    pub notification_interval: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Discord
            discord_token: std::env::var("DISCORD_TOKEN").context("DISCORD_TOKEN no definido")?,
            application_id: std::env::var("APPLICATION_ID")
                .context("APPLICATION_ID no definido")?
                .parse()?,
            guild_id: std::env::var("GUILD_ID")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|id| *id != 0),
            notification_channels: parse_channels(
                &std::env::var("NOTIFICATION_CHANNELS").unwrap_or_default(),
            )?,

            // Backends
            radarr: load_arr("RADARR")?,
            sonarr: load_arr("SONARR")?,

            // Búsquedas y caché
            max_results: match std::env::var("MAX_RESULTS") {
                Ok(val) if !val.trim().is_empty() => val.trim().parse()?,
                _ => DEFAULT_MAX_RESULTS,
            },
            cache_refresh_interval: env_duration("CACHE_REFRESH_INTERVAL", "2m")?,
            notification_interval: env_duration("NOTIFICATION_INTERVAL", "1h")?,
            request_timeout: env_duration("REQUEST_TIMEOUT", "30s")?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - At least one backend (Radarr or Sonarr) must be configured
    /// - Backend URLs must parse as absolute http(s) URLs
    /// - `max_results` and all intervals must be greater than zero
    pub fn validate(&self) -> Result<()> {
        if self.radarr.is_none() && self.sonarr.is_none() {
            anyhow::bail!("Configure al menos un backend (RADARR_URL o SONARR_URL)");
        }

        for (name, settings) in [("Radarr", &self.radarr), ("Sonarr", &self.sonarr)] {
            if let Some(settings) = settings {
                let parsed = url::Url::parse(&settings.url)
                    .with_context(|| format!("URL de {} inválida: {}", name, settings.url))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    anyhow::bail!("URL de {} debe ser http o https, got: {}", name, settings.url);
                }
                if settings.api_key.is_empty() {
                    anyhow::bail!("API key de {} vacía", name);
                }
            }
        }

        if self.max_results == 0 {
            anyhow::bail!("MAX_RESULTS must be greater than 0");
        }

        if self.cache_refresh_interval.is_zero() || self.notification_interval.is_zero() {
            anyhow::bail!("Los intervalos del scheduler deben ser mayores a 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("REQUEST_TIMEOUT must be greater than 0");
        }

        Ok(())
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// API keys and the Discord token are never included.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Discord: App ID {} (Guild: {}), {} canales de notificación\n  \
            Radarr: {}\n  \
            Sonarr: {}\n  \
            Búsqueda: máximo {} resultados\n  \
            Scheduler: caché cada {}, notificaciones cada {}, timeout {}",
            self.application_id,
            self.guild_id.map_or("global".to_string(), |id| id.to_string()),
            self.notification_channels.len(),
            describe_arr(&self.radarr),
            describe_arr(&self.sonarr),
            self.max_results,
            humantime::format_duration(self.cache_refresh_interval),
            humantime::format_duration(self.notification_interval),
            humantime::format_duration(self.request_timeout),
        )
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Discord (no defaults - must be provided)
            discord_token: String::new(),
            application_id: 0,
            guild_id: None,
            notification_channels: Vec::new(),

            radarr: None,
            sonarr: None,

            max_results: DEFAULT_MAX_RESULTS,
            cache_refresh_interval: Duration::from_secs(2 * 60),
            notification_interval: Duration::from_secs(60 * 60),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Carga `{PREFIX}_URL`, `{PREFIX}_API_KEY`, `{PREFIX}_PATH`, `{PREFIX}_DEFAULT_PROFILE`.
///
/// Sin `{PREFIX}_URL` el backend queda deshabilitado.
fn load_arr(prefix: &str) -> Result<Option<ArrSettings>> {
    let url = match std::env::var(format!("{prefix}_URL")) {
        Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => return Ok(None),
    };

    let api_key = std::env::var(format!("{prefix}_API_KEY"))
        .with_context(|| format!("{prefix}_API_KEY no definido"))?;
    let root_path = std::env::var(format!("{prefix}_PATH"))
        .with_context(|| format!("{prefix}_PATH no definido"))?;
    let default_profile =
        std::env::var(format!("{prefix}_DEFAULT_PROFILE")).unwrap_or_else(|_| "any".to_string());

    Ok(Some(ArrSettings {
        url,
        api_key,
        root_path,
        default_profile,
    }))
}

fn env_duration(key: &str, default: &str) -> Result<Duration> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    humantime::parse_duration(raw.trim()).with_context(|| format!("{key} inválido: {raw}"))
}

fn parse_channels(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<u64>() {
            Ok(id) if id != 0 => Ok(id),
            _ => anyhow::bail!("ID de canal inválido: {s}"),
        })
        .collect()
}

fn describe_arr(settings: &Option<ArrSettings>) -> String {
    match settings {
        Some(s) => format!("{} (perfil '{}', ruta {})", s.url, s.default_profile, s.root_path),
        None => "deshabilitado".to_string(),
    }
}
