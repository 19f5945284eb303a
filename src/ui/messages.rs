use crate::lookup::{
    AddOutcome, ClassifiedEntry, LookupItem, LookupStatus, Reconciliation, ReleaseOutcome,
};
use crate::media::{DownloadItem, MediaEntry, MediaKind, QualityProfile, Release};

/// Tipo de mensaje; decide el color del embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
    NewEntry,
    ExistingEntry,
    Download,
    Profile,
    Release,
}

/// Chat message independent of Discord.
///
/// The service and notifier layers build these; `ui::embeds` renders them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub title: String,
    pub description: Option<String>,
    /// (nombre, valor, inline)
    pub fields: Vec<(String, String, bool)>,
    pub thumbnail: Option<String>,
}

impl ChatMessage {
    pub fn new(kind: MessageKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            fields: Vec::new(),
            thumbnail: None,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(MessageKind::Info, title)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(MessageKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, title)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push((name.into(), value.into(), inline));
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }
}

/// Texto de cada estado de búsqueda
pub fn status_message(status: LookupStatus, kind: MediaKind, term: &str) -> ChatMessage {
    match status {
        LookupStatus::NoResults => ChatMessage::info(format!("No se encontraron {}", kind.plural()))
            .with_description(format!("Término de búsqueda: {term}")),
        LookupStatus::NoNewResults => ChatMessage::info(format!(
            "No se encontraron {} nuevas, revisa las existentes",
            kind.plural()
        ))
        .with_description(format!("Término de búsqueda: {term}")),
        LookupStatus::AlreadyExists => {
            ChatMessage::info(format!("La {} ya existe", kind.singular()))
        }
        LookupStatus::TooManyResults => ChatMessage::info(format!(
            "Demasiadas {} encontradas, por favor refina la búsqueda",
            kind.plural()
        )),
    }
}

/// Mensaje para un resultado clasificado; los nuevos incluyen el comando para agregarlos
pub fn entry_message<E: MediaEntry>(classified: &ClassifiedEntry<E>) -> ChatMessage {
    let entry = &classified.entry;
    let title = match entry.year() {
        Some(year) => format!("{} ({})", entry.title(), year),
        None => entry.title().to_string(),
    };

    let (kind, shown) = match classified.existing() {
        Some(existing) => (MessageKind::ExistingEntry, existing),
        None => (MessageKind::NewEntry, entry),
    };

    let mut message = ChatMessage::new(kind, title);
    if let Some(overview) = shown.overview() {
        message = message.with_description(truncate(overview, 300));
    }
    for (name, value) in shown.details() {
        message = message.with_field(name, value, true);
    }
    if let Some(poster) = shown.poster() {
        message = message.with_thumbnail(poster);
    }

    if classified.is_new() {
        message.with_field(
            "Agregar",
            format!(
                "`/{} add-id title:{} id:{}`",
                E::KIND.command_name(),
                entry.title(),
                entry.id()
            ),
            false,
        )
    } else {
        message.with_field("Estado", "Ya en la biblioteca", true)
    }
}

pub fn reconciliation_messages<E: MediaEntry>(
    reconciliation: &Reconciliation<E>,
    term: &str,
) -> Vec<ChatMessage> {
    reconciliation
        .items()
        .iter()
        .map(|item| match item {
            LookupItem::Status(status) => status_message(*status, E::KIND, term),
            LookupItem::Entry(classified) => entry_message(classified),
        })
        .collect()
}

pub fn add_outcome_messages<E: MediaEntry>(outcome: &AddOutcome<E>, term: &str) -> Vec<ChatMessage> {
    let kind = E::KIND;
    match outcome {
        AddOutcome::Added(entry) => vec![ChatMessage::success(format!(
            "{} agregada: {}",
            capitalize(kind.singular()),
            entry.title()
        ))
        .with_description(format!("{} comenzará a buscarla", kind.backend_name()))],
        AddOutcome::AlreadyExists(entry) => vec![ChatMessage::info(format!(
            "La {} ya existe",
            kind.singular()
        ))
        .with_description(entry.title().to_string())],
        AddOutcome::NotFound(id) => vec![ChatMessage::error(format!(
            "No se encontró ninguna {} con id {} para \"{}\"",
            kind.singular(),
            id,
            term
        ))],
        AddOutcome::Choices(reconciliation) => reconciliation_messages(reconciliation, term),
    }
}

/// Recomendaciones de `discover`; sin término de búsqueda que mostrar
pub fn discover_messages<E: MediaEntry>(reconciliation: &Reconciliation<E>) -> Vec<ChatMessage> {
    let kind = E::KIND;
    match reconciliation.terminal_status() {
        Some(LookupStatus::NoResults) => vec![ChatMessage::info(format!(
            "{} no tiene {} para recomendar",
            kind.backend_name(),
            kind.plural()
        ))],
        Some(LookupStatus::NoNewResults | LookupStatus::AlreadyExists) => {
            vec![ChatMessage::info(
                "Todas las recomendaciones ya están en la biblioteca",
            )]
        }
        _ => reconciliation.entries().map(entry_message).collect(),
    }
}

/// Tarjeta de un release con el comando para descargarlo
pub fn release_message(release: &Release, kind: MediaKind) -> ChatMessage {
    let mut message = ChatMessage::new(MessageKind::Release, release.title.clone())
        .with_field(
            "Indexador",
            release.indexer.clone().unwrap_or_else(|| "Desconocido".to_string()),
            true,
        )
        .with_field("Tamaño", release.size_label(), true);

    if let Some(protocol) = &release.protocol {
        message = message.with_field("Protocolo", protocol.clone(), true);
    }
    if let Some(seeders) = release.seeders {
        message = message.with_field("Seeders", seeders.to_string(), true);
    }
    if release.rejected {
        let reasons = if release.rejections.is_empty() {
            "Sin motivo informado".to_string()
        } else {
            release.rejections.join("\n")
        };
        message = message.with_field("Rechazado", truncate(&reasons, 1000), false);
    }

    message.with_field(
        "Descargar",
        format!(
            "`/{} grab guid:{} indexer-id:{}`",
            kind.command_name(),
            release.guid,
            release.indexer_id
        ),
        false,
    )
}

pub fn release_outcome_messages(
    outcome: &ReleaseOutcome,
    kind: MediaKind,
    title: &str,
) -> Vec<ChatMessage> {
    match outcome {
        ReleaseOutcome::NotInLibrary => vec![ChatMessage::info(format!(
            "La {} no está en la biblioteca",
            kind.singular()
        ))
        .with_description(format!(
            "Usa `/{} find-existing` para ver el título exacto de \"{}\"",
            kind.command_name(),
            title
        ))],
        ReleaseOutcome::Releases(releases) if releases.is_empty() => {
            vec![ChatMessage::info(format!("No hay releases disponibles para \"{title}\""))]
        }
        ReleaseOutcome::Releases(releases) => releases
            .iter()
            .map(|release| release_message(release, kind))
            .collect(),
    }
}

pub fn grab_message(kind: MediaKind, guid: &str) -> ChatMessage {
    ChatMessage::success("Release enviado a descarga").with_description(format!(
        "{} descargará el release `{}`",
        kind.backend_name(),
        guid
    ))
}

pub fn download_message(item: &DownloadItem, kind: MediaKind) -> ChatMessage {
    ChatMessage::new(MessageKind::Download, item.title.clone())
        .with_description(format!("Descarga de {} en curso", kind.singular()))
        .with_field("Estado", item.status.clone(), true)
        .with_field(
            "Tiempo restante",
            item.timeleft.clone().unwrap_or_else(|| "Desconocido".to_string()),
            true,
        )
        .with_field("Progreso", format!("{:.0}%", item.progress() * 100.0), true)
}

pub fn no_downloads_message(kind: MediaKind) -> ChatMessage {
    ChatMessage::info(format!("No hay {} descargándose", kind.plural()))
}

pub fn profile_message(profile: &QualityProfile) -> ChatMessage {
    ChatMessage::new(MessageKind::Profile, format!("Perfil: {}", profile.name))
        .with_field("ID", profile.id.to_string(), true)
}

/// Error de backend visible para el usuario
pub fn backend_error_message(kind: MediaKind, reason: &str) -> ChatMessage {
    ChatMessage::error(format!("Error consultando {}", kind.backend_name())).with_description(reason)
}

pub fn help_message() -> ChatMessage {
    let mut message = ChatMessage::info("📖 Comandos disponibles");
    for kind in [MediaKind::Movie, MediaKind::Show] {
        let cmd = kind.command_name();
        let plural = kind.plural();
        message = message.with_field(
            format!("/{cmd}"),
            format!(
                "`find-new` busca {plural} que no estén en la biblioteca\n\
                 `find-existing` busca entre todas las {plural}\n\
                 `add` agrega por título si hay un único resultado nuevo\n\
                 `add-id` agrega por título e id\n\
                 `downloads` muestra las descargas activas\n\
                 `profiles` lista los perfiles de calidad"
            ),
            false,
        );
    }
    message.with_field(
        "Solo /movie",
        "`discover` recomienda películas que no estén en la biblioteca\n\
         `releases` lista los releases de una película de la biblioteca\n\
         `grab` descarga un release por guid e indexador",
        false,
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
