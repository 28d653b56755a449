//! Relay-Zustand – Konfiguration und geteilte Handles
//!
//! `RelayState` buendelt alles was ein Verbindungs-Task braucht:
//! die Konfiguration, den Verteiler und den Sender der Hub-Queue.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::broadcast::Verteiler;
use crate::error::{RelayError, RelayResult};
use crate::hub::VerbindungsEreignis;

// ---------------------------------------------------------------------------
// RelayKonfiguration
// ---------------------------------------------------------------------------

/// Konfiguration fuer den Relay-Kern
#[derive(Debug, Clone)]
pub struct RelayKonfiguration {
    /// Kapazitaet des Chat-Verlaufs
    pub verlauf_kapazitaet: usize,
    /// Maximale Wortanzahl pro Nachricht
    pub max_woerter: usize,
    /// Maximale Laenge des Anzeigenamens in Zeichen
    pub max_name_laenge: usize,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// Maximale Frame-Groesse in Bytes
    pub max_frame_groesse: usize,
}

impl Default for RelayKonfiguration {
    fn default() -> Self {
        Self {
            verlauf_kapazitaet: 100,
            max_woerter: 100,
            max_name_laenge: 20,
            keepalive_sek: 25,
            verbindungs_timeout_sek: 60,
            max_frame_groesse: stammtisch_protocol::wire::DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl RelayKonfiguration {
    /// Prueft die Konfiguration auf Werte mit denen der Relay nicht laufen kann
    pub fn pruefen(&self) -> RelayResult<()> {
        if self.verlauf_kapazitaet == 0 {
            return Err(RelayError::konfiguration(
                "verlauf_kapazitaet muss mindestens 1 sein",
            ));
        }
        if self.max_name_laenge == 0 {
            return Err(RelayError::konfiguration(
                "max_name_laenge muss mindestens 1 sein",
            ));
        }
        if self.verbindungs_timeout_sek <= self.keepalive_sek {
            return Err(RelayError::konfiguration(
                "verbindungs_timeout_sek muss groesser als keepalive_sek sein",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RelayState
// ---------------------------------------------------------------------------

/// Geteilter Zustand des Relays
///
/// Wird als `Arc<RelayState>` an den Listener und alle Verbindungs-Tasks
/// gereicht. Der Hub selbst haelt keinen `RelayState`; er besitzt Register
/// und Verlauf exklusiv.
pub struct RelayState {
    /// Relay-Konfiguration
    pub konfig: RelayKonfiguration,
    /// Verteiler mit den Send-Queues aller Verbindungen
    pub verteiler: Verteiler,
    /// Sender der Hub-Ereignis-Queue
    pub hub_tx: mpsc::Sender<VerbindungsEreignis>,
    /// Startzeitpunkt des Relays
    pub start_zeit: Instant,
}

impl RelayState {
    /// Erstellt einen neuen RelayState
    pub fn neu(
        konfig: RelayKonfiguration,
        verteiler: Verteiler,
        hub_tx: mpsc::Sender<VerbindungsEreignis>,
    ) -> Arc<Self> {
        Arc::new(Self {
            konfig,
            verteiler,
            hub_tx,
            start_zeit: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_zeit.elapsed().as_secs()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
