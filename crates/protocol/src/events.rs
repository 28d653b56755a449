//! Chat-Ereignisse (TCP)
//!
//! Definiert alle Ereignisse die ueber die TCP-Verbindung zwischen Client
//! und Server ausgetauscht werden.
//!
//! ## Design
//! - Jedes Frame traegt genau ein getaggtes Ereignis:
//!   `{"event": "<name>", "data": <payload>}`
//! - Ereignisnamen in kebab-case, Payload-Felder in camelCase
//! - JSON-Serialisierung via serde (TCP, nicht zeitkritisch)

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use stammtisch_core::types::VerbindungsId;

// ---------------------------------------------------------------------------
// Chat-Nachricht
// ---------------------------------------------------------------------------

/// Nachrichtentyp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NachrichtenTyp {
    User,
    System,
}

/// Ein Eintrag im Chat-Verlauf (Benutzernachricht oder Systemhinweis)
///
/// Nach der Erstellung unveraenderlich. Der Verlauf und alle Broadcasts
/// transportieren Klone dieses Typs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatNachricht {
    /// Millisekunden-Zeitstempel als String, bei Benutzernachrichten
    /// ergaenzt um die kompakte Verbindungs-ID
    pub id: String,
    pub kind: NachrichtenTyp,
    /// Nur bei Benutzernachrichten gesetzt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub content: String,
    /// ISO-8601 in UTC mit Millisekunden-Praezision
    pub timestamp: String,
}

impl ChatNachricht {
    /// Erstellt eine Benutzernachricht
    pub fn benutzer(
        anzeigename: impl Into<String>,
        inhalt: impl Into<String>,
        zeit: DateTime<Utc>,
        verbindung: VerbindungsId,
    ) -> Self {
        Self {
            id: format!("{}{}", zeit.timestamp_millis(), verbindung.kompakt()),
            kind: NachrichtenTyp::User,
            display_name: Some(anzeigename.into()),
            content: inhalt.into(),
            timestamp: zeit.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Erstellt einen Systemhinweis (Join/Leave)
    pub fn system(inhalt: impl Into<String>, zeit: DateTime<Utc>) -> Self {
        Self {
            id: zeit.timestamp_millis().to_string(),
            kind: NachrichtenTyp::System,
            display_name: None,
            content: inhalt.into(),
            timestamp: zeit.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload-Typen
// ---------------------------------------------------------------------------

/// Praesenz-Angaben nach einem Beitritt oder Austritt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PraesenzMeldung {
    /// Anzeigename des Ausloesers
    pub display_name: String,
    /// Anzahl der aktuell angemeldeten Benutzer
    pub online_count: usize,
    /// Anzeigenamen in Beitritts-Reihenfolge
    pub users: Vec<String>,
}

/// Tipp-Status eines Benutzers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TippMeldung {
    pub display_name: String,
    pub is_typing: bool,
}

/// Fehlermeldung an den Ausloeser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FehlerMeldung {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Ereignisse vom Client an den Server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEreignis {
    /// Dem Chat beitreten (Payload: gewuenschter Anzeigename)
    Join(String),
    /// Nachricht an alle senden
    SendMessage { content: String },
    /// Tipp-Status mitteilen
    Typing(bool),
    /// Antwort auf einen Server-Ping (Transport-Ebene, erreicht den Hub nie)
    Pong,
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Ereignisse vom Server an den Client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEreignis {
    /// Verlaufs-Schnappschuss, geht nur an den Beitretenden
    ChatHistory(Vec<ChatNachricht>),
    /// Benutzer beigetreten, mit aktualisierter Praesenz
    UserJoined(PraesenzMeldung),
    /// Benutzer gegangen, mit aktualisierter Praesenz
    UserLeft(PraesenzMeldung),
    /// Neue Nachricht (Benutzer oder System) an alle Verbindungen
    NewMessage(ChatNachricht),
    /// Tipp-Status eines anderen Benutzers
    UserTyping(TippMeldung),
    /// Fehlermeldung, geht nur an den Ausloeser
    Error(FehlerMeldung),
    /// Transport-Keepalive
    Ping,
}

impl ServerEreignis {
    /// Erstellt eine Fehlermeldung
    pub fn fehler(message: impl Into<String>) -> Self {
        Self::Error(FehlerMeldung {
            message: message.into(),
        })
    }

    /// Erstellt eine Tipp-Anzeige
    pub fn tippen(display_name: impl Into<String>, is_typing: bool) -> Self {
        Self::UserTyping(TippMeldung {
            display_name: display_name.into(),
            is_typing,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
