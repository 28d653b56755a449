//! Fehlertypen fuer den Relay-Kern

use thiserror::Error;

/// Fehlertyp fuer den Relay-Kern
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO-Fehler (Socket, Bind, Accept)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Ungueltige Konfiguration
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),
}

impl RelayError {
    /// Erstellt einen Konfigurationsfehler
    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }
}

/// Result-Typ fuer den Relay-Kern
pub type RelayResult<T> = Result<T, RelayError>;
