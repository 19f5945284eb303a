use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

use super::CacheGeneration;
use crate::backend::MediaGateway;
use crate::error::FetchError;
use crate::media::MediaEntry;

/// Cache of the entries already known to one backend.
///
/// The published generation sits behind `RwLock<Arc<_>>`; the lock is only
/// held long enough to clone or replace the `Arc`, never across a fetch.
pub struct MediaCache<E: MediaEntry> {
    gateway: Arc<dyn MediaGateway<Entry = E>>,
    current: RwLock<Arc<CacheGeneration<E>>>,
    /// Serializa las recargas: como máximo una en vuelo por caché
    reload_lock: tokio::sync::Mutex<()>,
}

impl<E: MediaEntry> MediaCache<E> {
    pub fn new(gateway: Arc<dyn MediaGateway<Entry = E>>) -> Self {
        Self {
            gateway,
            current: RwLock::new(Arc::new(CacheGeneration::empty())),
            reload_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Replaces the whole content with what the backend returns.
    ///
    /// Entries missing from the fetch are evicted. On error the previous
    /// generation stays published and the error is returned to the caller.
    pub async fn reload(&self) -> Result<usize, FetchError> {
        let _guard = self.reload_lock.lock().await;

        let entries = self.gateway.fetch_all().await?;

        let next = self.current.read().generation() + 1;
        let generation = CacheGeneration::from_entries(entries, next);
        let count = generation.len();

        *self.current.write() = Arc::new(generation);

        info!(
            "🔄 Caché de {} recargado: generación {}, {} entradas",
            self.gateway.name(),
            next,
            count
        );
        Ok(count)
    }

    /// Vista consistente de la generación actual
    pub fn snapshot(&self) -> Arc<CacheGeneration<E>> {
        self.current.read().clone()
    }

    pub fn lookup(&self, id: i64) -> Option<E> {
        self.current.read().get(id).cloned()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.current.read().contains(id)
    }

    /// Inserts or replaces one entry outside the reload cycle.
    ///
    /// Best-effort overlay: if a reload publishes after this, the reload wins
    /// until the backend reflects the entry on the next fetch.
    pub fn add(&self, entry: E) {
        let id = entry.id();
        let mut current = self.current.write();
        Arc::make_mut(&mut current).insert(entry);
        debug!("➕ Entrada {} agregada al caché de {}", id, self.gateway.name());
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.current.read().generation()
    }

    /// Momento de la última recarga completa; `None` si nunca se cargó
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.current.read().refreshed_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockMediaGateway;
    use crate::media::{DownloadItem, Movie, QualityProfile};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use tokio::sync::Notify;

    fn movies(ids: &[i64]) -> Vec<Movie> {
        ids.iter()
            .map(|id| Movie::new(*id, format!("movie{id}")))
            .collect()
    }

    fn ids(cache: &MediaCache<Movie>) -> HashSet<i64> {
        cache.snapshot().iter().map(|m| m.tmdb_id).collect()
    }

    /// Mock que devuelve `batches` en orden, una por llamada
    fn sequenced(batches: Vec<Result<Vec<Movie>, FetchError>>) -> Arc<MockMediaGateway> {
        let mut gateway = MockMediaGateway::new();
        let batches = parking_lot::Mutex::new(batches.into_iter());
        gateway.expect_name().return_const("Radarr");
        gateway.expect_fetch_all().returning(move || {
            batches
                .lock()
                .next()
                .unwrap_or_else(|| Ok(Vec::new()))
        });
        Arc::new(gateway)
    }

    fn unavailable() -> FetchError {
        FetchError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        }
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let cache = MediaCache::new(sequenced(vec![]));
        assert!(cache.is_empty());
        assert_eq!(cache.generation(), 0);
        assert_eq!(cache.lookup(1), None);
        assert_eq!(cache.refreshed_at(), None);
    }

    #[tokio::test]
    async fn test_refreshed_at_tracks_successful_reloads() {
        let cache = MediaCache::new(sequenced(vec![Ok(movies(&[1])), Err(unavailable())]));

        let before = Utc::now();
        cache.reload().await.unwrap();
        let refreshed = cache.refreshed_at().unwrap();
        assert!(refreshed >= before);

        // un alta local no cuenta como recarga
        cache.add(Movie::new(2, "Local only"));
        assert_eq!(cache.refreshed_at(), Some(refreshed));

        cache.reload().await.unwrap_err();
        assert_eq!(cache.refreshed_at(), Some(refreshed));
    }

    #[tokio::test]
    async fn test_reload_replaces_contents_wholesale() {
        let cache = MediaCache::new(sequenced(vec![
            Ok(movies(&[1, 2, 3])),
            Ok(movies(&[3, 4])),
        ]));

        assert_eq!(cache.reload().await.unwrap(), 3);
        assert_eq!(ids(&cache), HashSet::from([1, 2, 3]));

        assert_eq!(cache.reload().await.unwrap(), 2);
        assert_eq!(ids(&cache), HashSet::from([3, 4]));
        assert!(!cache.contains(1));
        assert_eq!(cache.lookup(4).map(|m| m.title), Some("movie4".to_string()));
        assert_eq!(cache.generation(), 2);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_generation() {
        let cache = MediaCache::new(sequenced(vec![Ok(movies(&[1, 2])), Err(unavailable())]));

        cache.reload().await.unwrap();
        let before = cache.snapshot();

        let err = cache.reload().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));

        assert_eq!(ids(&cache), HashSet::from([1, 2]));
        assert_eq!(cache.generation(), before.generation());
        assert!(cache.lookup(1).is_some());
    }

    #[tokio::test]
    async fn test_add_is_visible_before_next_reload() {
        let cache = MediaCache::new(sequenced(vec![Ok(movies(&[1]))]));
        cache.reload().await.unwrap();
        let before_add = cache.snapshot();

        cache.add(Movie::new(42, "Hitchhiker"));

        assert!(cache.contains(42));
        assert_eq!(cache.len(), 2);
        // los snapshots ya entregados no cambian
        assert!(!before_add.contains(42));
        assert_eq!(before_add.len(), 1);
    }

    #[tokio::test]
    async fn test_add_overwrites_existing_entry() {
        let cache = MediaCache::new(sequenced(vec![Ok(movies(&[1]))]));
        cache.reload().await.unwrap();

        cache.add(Movie::new(1, "Renamed"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(1).map(|m| m.title), Some("Renamed".to_string()));
    }

    #[tokio::test]
    async fn test_reload_evicts_added_entry_missing_from_backend() {
        let cache = MediaCache::new(sequenced(vec![Ok(movies(&[1])), Ok(movies(&[1]))]));
        cache.reload().await.unwrap();
        cache.add(Movie::new(2, "Local only"));

        cache.reload().await.unwrap();

        assert_eq!(ids(&cache), HashSet::from([1]));
    }

    #[tokio::test]
    async fn test_concurrent_reloads_never_mix_generations() {
        let first: HashSet<i64> = (0..500).collect();
        let second: HashSet<i64> = (1000..1300).collect();
        let cache = Arc::new(MediaCache::new(sequenced(vec![
            Ok(movies(&first.iter().copied().collect::<Vec<_>>())),
            Ok(movies(&second.iter().copied().collect::<Vec<_>>())),
        ])));

        let (a, b) = tokio::join!(
            tokio::spawn({
                let cache = cache.clone();
                async move { cache.reload().await }
            }),
            tokio::spawn({
                let cache = cache.clone();
                async move { cache.reload().await }
            })
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let seen = ids(&cache);
        assert!(seen == first || seen == second);
        assert_eq!(cache.generation(), 2);
    }

    /// Gateway que bloquea `fetch_all` hasta que el test lo libere
    struct GatedGateway {
        release: Notify,
        started: Notify,
    }

    #[async_trait]
    impl MediaGateway for GatedGateway {
        type Entry = Movie;

        fn name(&self) -> &'static str {
            "Gated"
        }

        async fn fetch_all(&self) -> Result<Vec<Movie>, FetchError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(movies(&[7, 8]))
        }

        async fn search(&self, _term: &str) -> Result<Vec<Movie>, FetchError> {
            Ok(Vec::new())
        }

        async fn add(&self, movie: &Movie, _: i64, _: &str) -> Result<Movie, FetchError> {
            Ok(movie.clone())
        }

        async fn downloads(&self) -> Result<Vec<DownloadItem>, FetchError> {
            Ok(Vec::new())
        }

        async fn profiles(&self) -> Result<Vec<QualityProfile>, FetchError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_reads_do_not_wait_for_inflight_reload() {
        let gateway = Arc::new(GatedGateway {
            release: Notify::new(),
            started: Notify::new(),
        });
        let cache = Arc::new(MediaCache::new(gateway.clone()));
        cache.add(Movie::new(1, "Before"));

        let reload = tokio::spawn({
            let cache = cache.clone();
            async move { cache.reload().await }
        });
        gateway.started.notified().await;

        // recarga en vuelo: las lecturas ven la generación anterior
        assert!(cache.contains(1));
        assert!(!cache.contains(7));
        cache.add(Movie::new(2, "During"));
        assert!(cache.contains(2));

        gateway.release.notify_one();
        assert_eq!(reload.await.unwrap().unwrap(), 2);

        assert_eq!(ids(&cache), HashSet::from([7, 8]));
    }
}
