use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::media::MediaEntry;

/// Una generación inmutable del caché, indexada por id externo
#[derive(Debug, Clone)]
pub struct CacheGeneration<E> {
    entries: HashMap<i64, E>,
    generation: u64,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<E: MediaEntry> CacheGeneration<E> {
    /// Generación vacía previa a la primera recarga
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
            refreshed_at: None,
        }
    }

    /// Construye una generación completa a partir de un fetch.
    ///
    /// Si el backend repite un id, gana la última aparición.
    pub fn from_entries(entries: Vec<E>, generation: u64) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.id(), entry))
            .collect();

        Self {
            entries,
            generation,
            refreshed_at: Some(Utc::now()),
        }
    }

    pub fn get(&self, id: i64) -> Option<&E> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Número de recargas exitosas que produjeron esta generación
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.values()
    }

    pub(super) fn insert(&mut self, entry: E) -> Option<E> {
        self.entries.insert(entry.id(), entry)
    }
}
