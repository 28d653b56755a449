//! Broadcast-Hub – Serialisierte Verarbeitung aller Chat-Ereignisse
//!
//! Der Hub ist der einzige Konsument der Ereignis-Queue. Register und
//! Verlauf gehoeren exklusiv ihm; jedes Ereignis wird vollstaendig
//! verarbeitet, inklusive aller ausgeloesten Sendungen, bevor das
//! naechste aus der Queue genommen wird. Dadurch kommen Register,
//! Verlauf und Broadcast-Reihenfolge ganz ohne Locks aus.
//!
//! ## Ereignisfluss
//! ```text
//! ClientVerbindung --VerbindungsEreignis--> Queue --> BroadcastHub
//!                                                         |
//!                          SitzungsRegister + ChatVerlauf |
//!                                                         v
//!                                                     Verteiler
//! ```

use chrono::Utc;
use tokio::sync::mpsc;

use stammtisch_core::types::VerbindungsId;
use stammtisch_protocol::events::{ChatNachricht, ClientEreignis, PraesenzMeldung, ServerEreignis};

use crate::broadcast::Verteiler;
use crate::history::ChatVerlauf;
use crate::registry::SitzungsRegister;
use crate::state::RelayKonfiguration;

// ---------------------------------------------------------------------------
// VerbindungsEreignis
// ---------------------------------------------------------------------------

/// Groesse der Hub-Ereignis-Queue
pub const HUB_QUEUE_GROESSE: usize = 256;

/// Ereignisse die Verbindungs-Tasks an den Hub melden
#[derive(Debug, Clone)]
pub enum VerbindungsEreignis {
    /// Neue Verbindung akzeptiert
    Verbunden { verbindung: VerbindungsId },
    /// Ereignis vom Client empfangen
    Empfangen {
        verbindung: VerbindungsId,
        ereignis: ClientEreignis,
    },
    /// Verbindung beendet (Socket geschlossen, Timeout oder Fehler)
    Getrennt { verbindung: VerbindungsId },
}

// ---------------------------------------------------------------------------
// BroadcastHub
// ---------------------------------------------------------------------------

/// Fehlermeldung fuer Nachrichten vor dem Beitritt
const FEHLER_ZUERST_BEITRETEN: &str = "You must join the chat first";

/// Verarbeitet alle Chat-Ereignisse und verteilt die Ergebnisse
///
/// Besitzt Register und Verlauf exklusiv. Laeuft als einzelner Task,
/// gestartet ueber [`BroadcastHub::starten`].
pub struct BroadcastHub {
    konfig: RelayKonfiguration,
    register: SitzungsRegister,
    verlauf: ChatVerlauf,
    verteiler: Verteiler,
}

impl BroadcastHub {
    /// Erstellt einen neuen Hub mit leerem Register und Verlauf
    pub fn neu(konfig: RelayKonfiguration, verteiler: Verteiler) -> Self {
        let verlauf = ChatVerlauf::neu(konfig.verlauf_kapazitaet);
        Self {
            konfig,
            register: SitzungsRegister::neu(),
            verlauf,
            verteiler,
        }
    }

    /// Erstellt die Ereignis-Queue des Hubs
    pub fn kanal() -> (
        mpsc::Sender<VerbindungsEreignis>,
        mpsc::Receiver<VerbindungsEreignis>,
    ) {
        mpsc::channel(HUB_QUEUE_GROESSE)
    }

    /// Konsumiert die Ereignis-Queue bis alle Sender geschlossen sind
    pub async fn starten(mut self, mut ereignisse: mpsc::Receiver<VerbindungsEreignis>) {
        tracing::info!(
            verlauf_kapazitaet = self.verlauf.kapazitaet(),
            max_woerter = self.konfig.max_woerter,
            "Broadcast-Hub gestartet"
        );

        while let Some(ereignis) = ereignisse.recv().await {
            self.verarbeiten(ereignis);
        }

        tracing::info!("Broadcast-Hub beendet");
    }

    /// Verarbeitet ein einzelnes Ereignis vollstaendig
    pub fn verarbeiten(&mut self, ereignis: VerbindungsEreignis) {
        match ereignis {
            VerbindungsEreignis::Verbunden { verbindung } => self.verbunden(verbindung),
            VerbindungsEreignis::Empfangen {
                verbindung,
                ereignis,
            } => match ereignis {
                ClientEreignis::Join(name) => self.beitritt(verbindung, &name),
                ClientEreignis::SendMessage { content } => self.nachricht(verbindung, &content),
                ClientEreignis::Typing(tippt) => self.tippen(verbindung, tippt),
                // Pong wird in der ClientVerbindung konsumiert
                ClientEreignis::Pong => {}
            },
            VerbindungsEreignis::Getrennt { verbindung } => self.getrennt(verbindung),
        }
    }

    /// Gibt die Anzahl der angemeldeten Sitzungen zurueck
    pub fn online_anzahl(&self) -> usize {
        self.register.anzahl()
    }

    /// Gibt die Anzahl der Eintraege im Verlauf zurueck
    pub fn verlauf_laenge(&self) -> usize {
        self.verlauf.laenge()
    }

    // -----------------------------------------------------------------------
    // Ereignis-Handler
    // -----------------------------------------------------------------------

    fn verbunden(&mut self, verbindung: VerbindungsId) {
        tracing::debug!(verbindung = %verbindung, "Verbindung beim Hub angemeldet");
    }

    /// Beitritt: Verlauf an den Beitretenden, Praesenz und Hinweis an alle
    ///
    /// Ein erneuter Beitritt derselben Verbindung registriert die Sitzung
    /// neu (Umbenennen) und durchlaeuft denselben Ablauf noch einmal.
    fn beitritt(&mut self, verbindung: VerbindungsId, name: &str) {
        let jetzt = Utc::now();
        let sitzung =
            self.register
                .registrieren(verbindung, name, self.konfig.max_name_laenge, jetzt);

        // Der Schnappschuss geht nur an den Beitretenden, bevor der
        // eigene Beitrittshinweis im Verlauf landet
        self.verteiler.an_verbindung_senden(
            &verbindung,
            ServerEreignis::ChatHistory(self.verlauf.schnappschuss()),
        );

        self.verteiler
            .an_alle_senden(ServerEreignis::UserJoined(self.praesenz(&sitzung.anzeigename)));

        let hinweis =
            ChatNachricht::system(format!("{} joined the chat", sitzung.anzeigename), jetzt);
        self.verlauf.anhaengen(hinweis.clone());
        self.verteiler.an_alle_senden(ServerEreignis::NewMessage(hinweis));

        tracing::info!(
            verbindung = %verbindung,
            anzeigename = %sitzung.anzeigename,
            online = self.register.anzahl(),
            "Benutzer beigetreten"
        );
    }

    /// Chat-Nachricht: validieren, in den Verlauf, an alle verteilen
    ///
    /// Abgewiesene Nachrichten (kein Beitritt, Wortlimit) erzeugen eine
    /// Fehlermeldung an den Absender und lassen Verlauf und uebrige
    /// Verbindungen unberuehrt.
    fn nachricht(&mut self, verbindung: VerbindungsId, inhalt: &str) {
        let Some(sitzung) = self.register.sitzung(&verbindung) else {
            tracing::debug!(verbindung = %verbindung, "Nachricht ohne Beitritt abgewiesen");
            self.verteiler
                .an_verbindung_senden(&verbindung, ServerEreignis::fehler(FEHLER_ZUERST_BEITRETEN));
            return;
        };
        let anzeigename = sitzung.anzeigename.clone();

        let woerter = inhalt.split_whitespace().count();
        if woerter > self.konfig.max_woerter {
            tracing::debug!(
                verbindung = %verbindung,
                woerter = woerter,
                limit = self.konfig.max_woerter,
                "Nachricht ueber dem Wortlimit abgewiesen"
            );
            self.verteiler.an_verbindung_senden(
                &verbindung,
                ServerEreignis::fehler(format!(
                    "Message exceeds {} words limit",
                    self.konfig.max_woerter
                )),
            );
            return;
        }

        let nachricht = ChatNachricht::benutzer(anzeigename, inhalt.trim(), Utc::now(), verbindung);
        self.verlauf.anhaengen(nachricht.clone());
        let empfaenger = self.verteiler.an_alle_senden(ServerEreignis::NewMessage(nachricht));
        tracing::debug!(verbindung = %verbindung, empfaenger = empfaenger, "Nachricht verteilt");
    }

    /// Tipp-Status: an alle ausser den Ausloeser, ohne Deduplizierung
    fn tippen(&self, verbindung: VerbindungsId, tippt: bool) {
        // Vor dem Beitritt wird der Tipp-Status kommentarlos ignoriert
        let Some(sitzung) = self.register.sitzung(&verbindung) else {
            return;
        };
        self.verteiler.an_alle_ausser_senden(
            &verbindung,
            ServerEreignis::tippen(sitzung.anzeigename.clone(), tippt),
        );
    }

    /// Trennung: Sitzung austragen, Abschiedshinweis und Praesenz an alle
    fn getrennt(&mut self, verbindung: VerbindungsId) {
        // Trennung ohne Sitzung ist der Normalfall fuer Verbindungen
        // die nie beigetreten sind
        let Some(sitzung) = self.register.entfernen(&verbindung) else {
            tracing::debug!(verbindung = %verbindung, "Trennung ohne Sitzung");
            return;
        };

        let jetzt = Utc::now();
        let hinweis = ChatNachricht::system(format!("{} left the chat", sitzung.anzeigename), jetzt);
        self.verlauf.anhaengen(hinweis.clone());
        self.verteiler.an_alle_senden(ServerEreignis::NewMessage(hinweis));
        self.verteiler
            .an_alle_senden(ServerEreignis::UserLeft(self.praesenz(&sitzung.anzeigename)));

        tracing::info!(
            verbindung = %verbindung,
            anzeigename = %sitzung.anzeigename,
            online = self.register.anzahl(),
            "Benutzer gegangen"
        );
    }

    /// Baut die Praesenz-Meldung mit dem aktuellen Registerstand
    fn praesenz(&self, anzeigename: &str) -> PraesenzMeldung {
        PraesenzMeldung {
            display_name: anzeigename.to_string(),
            online_count: self.register.anzahl(),
            users: self.register.anzeigenamen(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
