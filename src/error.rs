use thiserror::Error;

/// Errores al hablar con un backend (Radarr / Sonarr).
///
/// Todos son recuperables: un fallo de `reload` conserva la generación
/// anterior del caché, y un fallo de búsqueda se muestra al usuario.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Fallo de red, timeout o TLS
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// El backend respondió con un status no exitoso
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// El cuerpo no se pudo decodificar
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// La petición no se puede construir (perfil inexistente, etc.)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// El backend no ofrece la operación
    #[error("{backend} does not support {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },
}

impl FetchError {
    /// Mensaje corto apto para mostrar en el chat
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Request(e) if e.is_timeout() => {
                "El servidor tardó demasiado en responder".to_string()
            }
            FetchError::Request(_) => "No se pudo conectar con el servidor".to_string(),
            FetchError::Status { status, .. } => {
                format!("El servidor respondió con un error ({status})")
            }
            FetchError::Decode(_) => "Respuesta inválida del servidor".to_string(),
            FetchError::InvalidRequest(reason) => reason.clone(),
            FetchError::Unsupported { backend, .. } => {
                format!("{backend} no admite esta operación")
            }
        }
    }
}
