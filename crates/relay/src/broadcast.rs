//! Verteiler – Sendet Server-Ereignisse an verbundene Clients
//!
//! Der Verteiler verwaltet die Send-Queues aller verbundenen Clients
//! und stellt Methoden bereit, um Ereignisse gezielt oder an alle zu
//! senden. Gesendet wird immer nicht-blockierend: eine volle Queue
//! verwirft das Ereignis, damit eine langsame Verbindung niemals die
//! uebrigen aufhaelt.
//!
//! ## Selektives Verteilen
//! - An alle Verbindungen: `an_alle_senden`
//! - An eine Verbindung: `an_verbindung_senden`
//! - An alle ausser eine: `an_alle_ausser_senden`

use dashmap::DashMap;
use stammtisch_core::types::VerbindungsId;
use stammtisch_protocol::events::ServerEreignis;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer verbundenen Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub verbindung: VerbindungsId,
    pub tx: mpsc::Sender<ServerEreignis>,
}

impl ClientSender {
    /// Sendet ein Ereignis nicht-blockierend an den Client
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, ereignis: ServerEreignis) -> bool {
        match self.tx.try_send(ereignis) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(verbindung = %self.verbindung, "Send-Queue voll – Ereignis verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(verbindung = %self.verbindung, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Verteiler
// ---------------------------------------------------------------------------

/// Zentraler Verteiler fuer alle verbundenen Clients
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
/// Registriert werden Verbindungen schon beim Accept: Broadcasts
/// erreichen damit auch Clients die noch keinen Namen gewaehlt haben.
#[derive(Clone)]
pub struct Verteiler {
    inner: Arc<VerteilerInner>,
}

struct VerteilerInner {
    /// Client-Sender, indiziert nach VerbindungsId
    clients: DashMap<VerbindungsId, ClientSender>,
}

impl Verteiler {
    /// Erstellt einen neuen Verteiler
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(VerteilerInner {
                clients: DashMap::new(),
            }),
        }
    }

    /// Registriert eine neue Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die `ClientVerbindung` liest aus dieser Queue und sendet via TCP.
    pub fn verbindung_registrieren(
        &self,
        verbindung: VerbindungsId,
    ) -> mpsc::Receiver<ServerEreignis> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        let sender = ClientSender { verbindung, tx };
        self.inner.clients.insert(verbindung, sender);
        tracing::debug!(verbindung = %verbindung, "Verbindung im Verteiler registriert");
        rx
    }

    /// Entfernt eine Verbindung aus dem Verteiler
    pub fn verbindung_entfernen(&self, verbindung: &VerbindungsId) {
        self.inner.clients.remove(verbindung);
        tracing::debug!(verbindung = %verbindung, "Verbindung aus Verteiler entfernt");
    }

    /// Sendet ein Ereignis an eine einzelne Verbindung
    ///
    /// Gibt `true` zurueck wenn die Verbindung gefunden und das Ereignis
    /// eingereiht wurde.
    pub fn an_verbindung_senden(
        &self,
        verbindung: &VerbindungsId,
        ereignis: ServerEreignis,
    ) -> bool {
        match self.inner.clients.get(verbindung) {
            Some(sender) => sender.senden(ereignis),
            None => {
                tracing::debug!(verbindung = %verbindung, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    /// Sendet ein Ereignis an alle verbundenen Clients
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn an_alle_senden(&self, ereignis: ServerEreignis) -> usize {
        let mut gesendet = 0;
        self.inner.clients.iter().for_each(|entry| {
            if entry.value().senden(ereignis.clone()) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Sendet ein Ereignis an alle verbundenen Clients ausser einem
    ///
    /// Nuetzlich fuer Tipp-Indikatoren, die der Ausloeser selbst nicht
    /// sehen soll.
    pub fn an_alle_ausser_senden(
        &self,
        ausgeschlossen: &VerbindungsId,
        ereignis: ServerEreignis,
    ) -> usize {
        let mut gesendet = 0;
        self.inner.clients.iter().for_each(|entry| {
            if entry.key() == ausgeschlossen {
                return;
            }
            if entry.value().senden(ereignis.clone()) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Gibt die Anzahl der registrierten Verbindungen zurueck
    pub fn verbindungs_anzahl(&self) -> usize {
        self.inner.clients.len()
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, verbindung: &VerbindungsId) -> bool {
        self.inner.clients.contains_key(verbindung)
    }
}

impl Default for Verteiler {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
