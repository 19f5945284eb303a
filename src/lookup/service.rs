use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::reconciler::{reconcile, LookupItem, Reconciliation};
use crate::backend::MediaGateway;
use crate::cache::MediaCache;
use crate::config::ArrSettings;
use crate::error::FetchError;
use crate::media::{DownloadItem, MediaEntry, QualityProfile, Release};
use crate::scheduler::{Backend, Notifier};
use crate::ui::messages::download_message;

/// Resultado de un pedido de alta
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome<E> {
    /// Agregada al backend; lleva la copia devuelta por el backend
    Added(E),
    AlreadyExists(E),
    /// El id pedido no apareció en la búsqueda
    NotFound(i64),
    /// No hay un único candidato; el usuario debe elegir con `add-id`
    Choices(Reconciliation<E>),
}

/// Resultado de pedir los releases de una entrada
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// Ningún título de la biblioteca coincide
    NotInLibrary,
    Releases(Vec<Release>),
}

/// Per-backend entry point for the chat commands.
///
/// Owns the gateway and the cache for one media kind. Search failures are
/// returned as `Err` so the command layer can tell them apart from an empty
/// result.
pub struct MediaService<E: MediaEntry> {
    gateway: Arc<dyn MediaGateway<Entry = E>>,
    cache: Arc<MediaCache<E>>,
    settings: ArrSettings,
    max_results: usize,
}

impl<E: MediaEntry> MediaService<E> {
    pub fn new(
        gateway: Arc<dyn MediaGateway<Entry = E>>,
        settings: ArrSettings,
        max_results: usize,
    ) -> Self {
        let cache = Arc::new(MediaCache::new(gateway.clone()));
        Self {
            gateway,
            cache,
            settings,
            max_results,
        }
    }

    pub fn cache(&self) -> &Arc<MediaCache<E>> {
        &self.cache
    }

    /// Busca en el backend y reconcilia contra el caché
    pub async fn find(
        &self,
        term: &str,
        find_new_only: bool,
    ) -> Result<Reconciliation<E>, FetchError> {
        let results = self.gateway.search(term).await?;
        info!(
            "🔍 {} devolvió {} resultados para '{}'",
            self.gateway.name(),
            results.len(),
            term
        );
        match self.cache.refreshed_at() {
            Some(at) => debug!("Caché de {} recargado en {}", self.gateway.name(), at),
            None => debug!("⚠️ Caché de {} todavía sin cargar", self.gateway.name()),
        }
        Ok(reconcile(
            results,
            &self.cache.snapshot(),
            find_new_only,
            self.max_results,
        ))
    }

    /// Backend recommendations that are not in the library yet.
    ///
    /// Capped at `max_results` without the truncation notice: a discover list
    /// has no search term the user could narrow.
    pub async fn discover(&self) -> Result<Reconciliation<E>, FetchError> {
        let results = self.gateway.discover().await?;
        info!(
            "🧭 {} devolvió {} recomendaciones",
            self.gateway.name(),
            results.len()
        );
        Ok(reconcile(results, &self.cache.snapshot(), true, self.max_results)
            .without_truncation_notice())
    }

    /// Releases disponibles para un título de la biblioteca
    pub async fn releases(
        &self,
        title: &str,
        include_rejected: bool,
    ) -> Result<ReleaseOutcome, FetchError> {
        let snapshot = self.cache.snapshot();
        let Some(entry) = snapshot
            .iter()
            .find(|entry| entry.title().eq_ignore_ascii_case(title.trim()))
        else {
            return Ok(ReleaseOutcome::NotInLibrary);
        };

        let releases: Vec<Release> = self
            .gateway
            .releases(entry)
            .await?
            .into_iter()
            .filter(|release| include_rejected || !release.rejected)
            .take(self.max_results)
            .collect();

        info!(
            "📦 {} releases para '{}' en {}",
            releases.len(),
            entry.title(),
            self.gateway.name()
        );
        Ok(ReleaseOutcome::Releases(releases))
    }

    /// Envía un release al cliente de descargas
    pub async fn grab(&self, guid: &str, indexer_id: i64) -> Result<(), FetchError> {
        self.gateway.grab(guid, indexer_id).await?;
        info!("⬇️ Release {} enviado a descarga por {}", guid, self.gateway.name());
        Ok(())
    }

    /// Agrega por título si la búsqueda produce exactamente un resultado nuevo
    pub async fn add_with_title(&self, term: &str) -> Result<AddOutcome<E>, FetchError> {
        let reconciliation = self.find(term, true).await?;

        let single_new = match reconciliation.items() {
            [LookupItem::Entry(only)] if only.is_new() => Some(only.entry.clone()),
            _ => None,
        };

        match single_new {
            Some(entry) => self.add(entry).await,
            None => Ok(AddOutcome::Choices(reconciliation)),
        }
    }

    /// Agrega el resultado con el id pedido
    pub async fn add_with_id(&self, term: &str, id: i64) -> Result<AddOutcome<E>, FetchError> {
        let results = self.gateway.search(term).await?;
        let Some(entry) = results.into_iter().find(|entry| entry.id() == id) else {
            return Ok(AddOutcome::NotFound(id));
        };

        match self.cache.lookup(id) {
            Some(existing) => Ok(AddOutcome::AlreadyExists(existing)),
            None => self.add(entry).await,
        }
    }

    pub async fn downloads(&self) -> Result<Vec<DownloadItem>, FetchError> {
        self.gateway.downloads().await
    }

    pub async fn profiles(&self) -> Result<Vec<QualityProfile>, FetchError> {
        self.gateway.profiles().await
    }

    async fn add(&self, entry: E) -> Result<AddOutcome<E>, FetchError> {
        let profile = self.default_profile().await?;
        let added = self
            .gateway
            .add(&entry, profile.id, &self.settings.root_path)
            .await?;

        info!(
            "✅ '{}' agregada a {} con perfil '{}'",
            added.title(),
            self.gateway.name(),
            profile.name
        );

        // visible antes de la próxima recarga programada
        self.cache.add(added.clone());
        Ok(AddOutcome::Added(added))
    }

    async fn default_profile(&self) -> Result<QualityProfile, FetchError> {
        let wanted = &self.settings.default_profile;
        self.gateway
            .profiles()
            .await?
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                FetchError::InvalidRequest(format!(
                    "Perfil '{}' no encontrado en {}",
                    wanted,
                    self.gateway.name()
                ))
            })
    }
}

#[async_trait]
impl<E: MediaEntry> Backend for MediaService<E> {
    fn name(&self) -> &'static str {
        self.gateway.name()
    }

    async fn reload_cache(&self) -> Result<usize, FetchError> {
        self.cache.reload().await
    }

    /// Una notificación por descarga activa; nada si la cola está vacía
    async fn send_periodic_notifications(&self, notifier: &dyn Notifier) -> anyhow::Result<()> {
        let downloads = self.downloads().await?;
        for item in &downloads {
            notifier.notify(download_message(item, E::KIND)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockMediaGateway;
    use crate::lookup::LookupStatus;
    use crate::media::Movie;
    use crate::ui::messages::ChatMessage;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn settings() -> ArrSettings {
        ArrSettings {
            url: "http://localhost:7878".to_string(),
            api_key: "FSJDkjmf#$Kf3".to_string(),
            root_path: "/movies".to_string(),
            default_profile: "any".to_string(),
        }
    }

    fn movies(ids: &[i64]) -> Vec<Movie> {
        ids.iter()
            .map(|id| Movie::new(*id, format!("movie{id}")))
            .collect()
    }

    fn gateway() -> MockMediaGateway {
        let mut gateway = MockMediaGateway::new();
        gateway.expect_name().return_const("Radarr");
        gateway
    }

    fn expect_profiles(gateway: &mut MockMediaGateway) {
        gateway.expect_profiles().returning(|| {
            Ok(vec![
                QualityProfile { id: 1, name: "Any".to_string() },
                QualityProfile { id: 4, name: "HD-1080p".to_string() },
            ])
        });
    }

    fn service(gateway: MockMediaGateway) -> MediaService<Movie> {
        MediaService::new(Arc::new(gateway), settings(), 20)
    }

    fn release(guid: &str, rejected: bool) -> Release {
        Release {
            guid: guid.to_string(),
            title: format!("{guid}.1080p"),
            indexer: Some("NZBgeek".to_string()),
            indexer_id: 3,
            size: 1_073_741_824,
            seeders: None,
            leechers: None,
            protocol: Some("usenet".to_string()),
            rejected,
            rejections: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_discover_excludes_library_movies() {
        let mut gateway = gateway();
        gateway.expect_fetch_all().returning(|| Ok(movies(&[2])));
        gateway.expect_discover().returning(|| Ok(movies(&[1, 2, 3])));

        let service = service(gateway);
        service.reload_cache().await.unwrap();

        let found = service.discover().await.unwrap();
        let ids: Vec<i64> = found.entries().map(|e| e.entry.tmdb_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(found.entries().all(|e| e.is_new()));
    }

    #[tokio::test]
    async fn test_discover_max_results() {
        let mut gateway = gateway();
        gateway
            .expect_discover()
            .returning(|| Ok(movies(&(0..40).collect::<Vec<_>>())));

        let found = service(gateway).discover().await.unwrap();

        assert_eq!(found.items().len(), 20);
        assert_eq!(found.entries().count(), 20);
    }

    #[tokio::test]
    async fn test_discover_all_in_library() {
        let mut gateway = gateway();
        gateway.expect_fetch_all().returning(|| Ok(movies(&[1, 2])));
        gateway.expect_discover().returning(|| Ok(movies(&[1, 2])));

        let service = service(gateway);
        service.reload_cache().await.unwrap();

        let found = service.discover().await.unwrap();
        assert_eq!(found.terminal_status(), Some(LookupStatus::NoNewResults));
    }

    #[tokio::test]
    async fn test_releases_for_library_title() {
        let mut gateway = gateway();
        gateway.expect_fetch_all().returning(|| {
            let mut movie = Movie::new(603, "The Matrix");
            movie.id = Some(42);
            Ok(vec![movie])
        });
        gateway
            .expect_releases()
            .withf(|movie| movie.id == Some(42))
            .times(2)
            .returning(|_| Ok(vec![release("a", false), release("b", true)]));

        let service = service(gateway);
        service.reload_cache().await.unwrap();

        let ReleaseOutcome::Releases(approved) = service.releases("the matrix", false).await.unwrap()
        else {
            panic!("expected releases");
        };
        assert_eq!(approved, vec![release("a", false)]);

        let ReleaseOutcome::Releases(all) = service.releases("The Matrix", true).await.unwrap() else {
            panic!("expected releases");
        };
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_releases_unknown_title() {
        let mut gateway = gateway();
        gateway.expect_releases().never();

        let outcome = service(gateway).releases("Nope", true).await.unwrap();
        assert_eq!(outcome, ReleaseOutcome::NotInLibrary);
    }

    #[tokio::test]
    async fn test_grab_forwards_guid() {
        let mut gateway = gateway();
        gateway
            .expect_grab()
            .withf(|guid, indexer_id| guid == "abc-123" && *indexer_id == 3)
            .times(1)
            .returning(|_, _| Ok(()));

        service(gateway).grab("abc-123", 3).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_surfaces_search_failure() {
        let mut gateway = gateway();
        gateway.expect_search().returning(|_| {
            Err(FetchError::Status {
                status: 500,
                body: "Internal Server Error".to_string(),
            })
        });

        let err = service(gateway).find("john wick", true).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_find_new_excludes_cached_movies() {
        let mut gateway = gateway();
        gateway.expect_fetch_all().returning(|| Ok(movies(&[1])));
        gateway
            .expect_search()
            .withf(|term| term == "searchTerm")
            .returning(|_| Ok(movies(&[1])));

        let service = service(gateway);
        service.reload_cache().await.unwrap();

        let new_only = service.find("searchTerm", true).await.unwrap();
        assert_eq!(new_only.terminal_status(), Some(LookupStatus::AlreadyExists));

        let existing = service.find("searchTerm", false).await.unwrap();
        let entry = existing.entries().next().unwrap();
        assert_eq!(entry.entry.tmdb_id, 1);
        assert!(!entry.is_new());
    }

    #[tokio::test]
    async fn test_add_with_title_adds_single_new_result() {
        let mut gateway = gateway();
        expect_profiles(&mut gateway);
        gateway.expect_search().returning(|_| Ok(movies(&[245891])));
        gateway
            .expect_add()
            .withf(|movie, profile_id, root_path| {
                movie.tmdb_id == 245891 && *profile_id == 1 && root_path == "/movies"
            })
            .times(1)
            .returning(|movie, _, _| Ok(movie.clone()));

        let service = service(gateway);
        let outcome = service.add_with_title("john wick").await.unwrap();

        assert_eq!(outcome, AddOutcome::Added(Movie::new(245891, "movie245891")));
        assert!(service.cache().contains(245891));
    }

    #[tokio::test]
    async fn test_add_with_title_returns_choices_for_multiple_new() {
        let mut gateway = gateway();
        gateway.expect_search().returning(|_| Ok(movies(&[1, 2, 3])));
        gateway.expect_add().never();

        let outcome = service(gateway).add_with_title("movie").await.unwrap();

        match outcome {
            AddOutcome::Choices(choices) => assert_eq!(choices.items().len(), 3),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_with_title_many_results_limited_to_max() {
        let mut gateway = gateway();
        gateway
            .expect_search()
            .returning(|_| Ok(movies(&(0..30).collect::<Vec<_>>())));
        gateway.expect_add().never();

        let outcome = service(gateway).add_with_title("movie").await.unwrap();

        let AddOutcome::Choices(choices) = outcome else {
            panic!("expected choices");
        };
        assert_eq!(choices.items().len(), 21);
        assert_eq!(
            choices.items()[0],
            LookupItem::Status(LookupStatus::TooManyResults)
        );
    }

    #[tokio::test]
    async fn test_add_with_title_existing_movie() {
        let mut gateway = gateway();
        gateway.expect_fetch_all().returning(|| Ok(movies(&[1, 2])));
        gateway.expect_search().returning(|_| Ok(movies(&[1, 2])));
        gateway.expect_add().never();

        let service = service(gateway);
        service.reload_cache().await.unwrap();

        let AddOutcome::Choices(choices) = service.add_with_title("movie1").await.unwrap() else {
            panic!("expected choices");
        };
        assert_eq!(choices.terminal_status(), Some(LookupStatus::NoNewResults));
    }

    #[tokio::test]
    async fn test_add_with_id() {
        let mut gateway = gateway();
        expect_profiles(&mut gateway);
        gateway.expect_search().returning(|_| Ok(movies(&[10, 20])));
        gateway
            .expect_add()
            .withf(|movie, _, _| movie.tmdb_id == 20)
            .times(1)
            .returning(|movie, _, _| Ok(movie.clone()));

        let service = service(gateway);

        assert_eq!(
            service.add_with_id("movie", 99).await.unwrap(),
            AddOutcome::NotFound(99)
        );
        assert!(matches!(
            service.add_with_id("movie", 20).await.unwrap(),
            AddOutcome::Added(_)
        ));
        // ya está en el caché: no se vuelve a agregar
        assert!(matches!(
            service.add_with_id("movie", 20).await.unwrap(),
            AddOutcome::AlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_add_fails_when_profile_missing() {
        let mut gateway = gateway();
        gateway
            .expect_profiles()
            .returning(|| Ok(vec![QualityProfile { id: 4, name: "HD-1080p".to_string() }]));
        gateway.expect_search().returning(|_| Ok(movies(&[1])));
        gateway.expect_add().never();

        let service = service(gateway);
        let err = service.add_with_title("movie").await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidRequest(_)));
        assert!(!service.cache().contains(1));
    }

    #[derive(Default)]
    struct Collect(parking_lot::Mutex<Vec<ChatMessage>>);

    #[async_trait]
    impl Notifier for Collect {
        async fn notify(&self, message: ChatMessage) -> anyhow::Result<()> {
            self.0.lock().push(message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_periodic_notifications_one_per_download() {
        let mut gateway = gateway();
        let calls = AtomicUsize::new(0);
        gateway.expect_downloads().times(2).returning(move || {
            if calls.fetch_add(1, Ordering::SeqCst) > 0 {
                return Ok(Vec::new());
            }
            Ok(vec![
                DownloadItem {
                    id: 1,
                    title: "Alien.1979".to_string(),
                    status: "downloading".to_string(),
                    timeleft: Some("00:10:00".to_string()),
                    size: 10.0,
                    sizeleft: 5.0,
                },
                DownloadItem {
                    id: 2,
                    title: "Aliens.1986".to_string(),
                    status: "queued".to_string(),
                    timeleft: None,
                    size: 10.0,
                    sizeleft: 10.0,
                },
            ])
        });

        let service = service(gateway);
        let notifier = Collect::default();

        service.send_periodic_notifications(&notifier).await.unwrap();
        let titles: Vec<String> = notifier.0.lock().iter().map(|m| m.title.clone()).collect();
        assert_eq!(titles, vec!["Alien.1979".to_string(), "Aliens.1986".to_string()]);

        service.send_periodic_notifications(&notifier).await.unwrap();
        assert_eq!(notifier.0.lock().len(), 2);
    }
}
