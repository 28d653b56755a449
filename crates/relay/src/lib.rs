//! stammtisch-relay – In-Memory Chat-Relay
//!
//! Dieser Crate implementiert den Relay-Kern von Stammtisch: TCP-Verbindungen
//! annehmen, Sitzungen und den begrenzten Chat-Verlauf verwalten und
//! Ereignisse an alle Verbindungen verteilen. Es gibt keine Persistenz:
//! Verlauf und Praesenz leben ausschliesslich im Speicher.
//!
//! ## Architektur
//!
//! ```text
//! RelayServer (TCP-Listener)
//!     |
//!     v
//! ClientVerbindung (ein Task pro Verbindung)
//!     |   Zustand: verbunden -> beigetreten -> getrennt
//!     |
//!     v   VerbindungsEreignis (mpsc, genau ein Konsument)
//! BroadcastHub
//!     +-- SitzungsRegister   Wer ist da, in Beitrittsreihenfolge
//!     +-- ChatVerlauf        Die juengsten Nachrichten (Standard: 100)
//!     |
//!     v
//! Verteiler (Send-Queues aller Verbindungen, try_send, nie blockierend)
//! ```

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod history;
pub mod hub;
pub mod registry;
pub mod state;
pub mod tcp;

// Bequeme Re-Exporte
pub use broadcast::Verteiler;
pub use connection::ClientVerbindung;
pub use error::{RelayError, RelayResult};
pub use history::ChatVerlauf;
pub use hub::{BroadcastHub, VerbindungsEreignis};
pub use registry::{Sitzung, SitzungsRegister};
pub use state::{RelayKonfiguration, RelayState};
pub use tcp::RelayServer;
