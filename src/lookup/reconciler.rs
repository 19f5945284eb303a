use crate::cache::CacheGeneration;
use crate::media::MediaEntry;

/// Máximo de resultados por búsqueda si no se configura otro
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Mensajes de estado que puede producir una búsqueda
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    /// El backend no devolvió nada
    NoResults,
    /// Varios resultados, todos ya en la biblioteca
    NoNewResults,
    /// Un único resultado y ya está en la biblioteca
    AlreadyExists,
    /// Se truncó la lista; va antes de los resultados
    TooManyResults,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification<E> {
    New,
    /// Ya está en el caché; lleva la copia de la biblioteca
    Existing(E),
}

/// Un resultado de búsqueda etiquetado como nuevo o existente
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEntry<E> {
    pub entry: E,
    pub classification: Classification<E>,
}

impl<E> ClassifiedEntry<E> {
    pub fn is_new(&self) -> bool {
        matches!(self.classification, Classification::New)
    }

    pub fn existing(&self) -> Option<&E> {
        match &self.classification {
            Classification::Existing(existing) => Some(existing),
            Classification::New => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupItem<E> {
    Status(LookupStatus),
    Entry(ClassifiedEntry<E>),
}

/// Resultado ordenado de una búsqueda ya reconciliada
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation<E> {
    items: Vec<LookupItem<E>>,
}

impl<E> Reconciliation<E> {
    fn status(status: LookupStatus) -> Self {
        Self {
            items: vec![LookupItem::Status(status)],
        }
    }

    pub fn items(&self) -> &[LookupItem<E>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LookupItem<E>> {
        self.items
    }

    /// Quita el aviso de truncado y deja solo las entradas
    pub fn without_truncation_notice(mut self) -> Self {
        self.items
            .retain(|item| !matches!(item, LookupItem::Status(LookupStatus::TooManyResults)));
        self
    }

    /// Estado terminal si el resultado es un único mensaje
    pub fn terminal_status(&self) -> Option<LookupStatus> {
        match self.items.as_slice() {
            [LookupItem::Status(status)] => Some(*status),
            _ => None,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &ClassifiedEntry<E>> {
        self.items.iter().filter_map(|item| match item {
            LookupItem::Entry(entry) => Some(entry),
            LookupItem::Status(_) => None,
        })
    }
}

/// Reconciles backend search results against one cache generation.
///
/// Input order from the backend is kept for both classification and
/// truncation. The size bound is applied after the new-only filter, so an
/// oversized filtered set always yields `TooManyResults` followed by the
/// first `max_results` entries, never a "no new results" message.
pub fn reconcile<E: MediaEntry>(
    raw: Vec<E>,
    cache: &CacheGeneration<E>,
    find_new_only: bool,
    max_results: usize,
) -> Reconciliation<E> {
    if raw.is_empty() {
        return Reconciliation::status(LookupStatus::NoResults);
    }

    let raw_count = raw.len();
    let remaining: Vec<E> = if find_new_only {
        raw.into_iter()
            .filter(|entry| !cache.contains(entry.id()))
            .collect()
    } else {
        raw
    };

    if remaining.is_empty() {
        return Reconciliation::status(if raw_count == 1 {
            LookupStatus::AlreadyExists
        } else {
            LookupStatus::NoNewResults
        });
    }

    let truncated = remaining.len() > max_results;
    let mut items = Vec::with_capacity(remaining.len().min(max_results) + 1);
    if truncated {
        items.push(LookupItem::Status(LookupStatus::TooManyResults));
    }

    items.extend(
        remaining
            .into_iter()
            .take(max_results)
            .map(|entry| LookupItem::Entry(classify(entry, cache))),
    );

    Reconciliation { items }
}

fn classify<E: MediaEntry>(entry: E, cache: &CacheGeneration<E>) -> ClassifiedEntry<E> {
    let classification = match cache.get(entry.id()) {
        Some(existing) => Classification::Existing(existing.clone()),
        None => Classification::New,
    };
    ClassifiedEntry {
        entry,
        classification,
    }
}
