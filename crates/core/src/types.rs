//! Gemeinsame Identifikationstypen fuer Stammtisch
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Verbindungs-ID
///
/// Wird vom Relay beim Accept einer TCP-Verbindung vergeben und bleibt
/// fuer die gesamte Lebensdauer der Verbindung stabil. Die ID traegt keine
/// Benutzer-Semantik: der Anzeigename haengt an der Sitzung, nicht an der
/// Verbindung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbindungsId(pub Uuid);

impl VerbindungsId {
    /// Erstellt eine neue zufaellige VerbindungsId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }

    /// Kompakte Hex-Darstellung ohne Bindestriche
    ///
    /// Wird an den Zeitstempel angehaengt um Nachrichten-IDs innerhalb
    /// derselben Millisekunde eindeutig zu halten.
    pub fn kompakt(&self) -> String {
        self.0.simple().to_string()
    }
}

impl Default for VerbindungsId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VerbindungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}
