//! Client-Verbindung – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede akzeptierte Verbindung bekommt eine `ClientVerbindung` in einem
//! eigenen tokio-Task. Der Task liest Frames, reicht Chat-Ereignisse an
//! den Hub weiter und schreibt alles, was der Verteiler fuer diese
//! Verbindung einreiht.
//!
//! ## Lebenslauf
//! ```text
//! Accept -> registrieren (Verteiler) -> Verbunden (Hub)
//!        -> Lese/Schreib-Schleife (select)
//!        -> entfernen (Verteiler) -> Getrennt (Hub)
//! ```
//!
//! ## Keepalive
//! - Der Server sendet alle `keepalive_sek` einen Ping
//! - Jedes eingehende Frame gilt als Lebenszeichen
//! - Bleibt das Lebenszeichen laenger als `verbindungs_timeout_sek`
//!   aus, wird die Verbindung getrennt

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use stammtisch_core::types::VerbindungsId;
use stammtisch_protocol::events::{ClientEreignis, ServerEreignis};
use stammtisch_protocol::wire::ServerCodec;

use crate::hub::VerbindungsEreignis;
use crate::state::RelayState;

/// Verarbeitet eine einzelne TCP-Verbindung
pub struct ClientVerbindung {
    state: Arc<RelayState>,
    verbindung: VerbindungsId,
    peer_addr: SocketAddr,
}

impl ClientVerbindung {
    /// Erstellt eine neue ClientVerbindung mit frischer VerbindungsId
    pub fn neu(state: Arc<RelayState>, peer_addr: SocketAddr) -> Self {
        Self {
            state,
            verbindung: VerbindungsId::new(),
            peer_addr,
        }
    }

    /// Gibt die VerbindungsId zurueck
    pub fn verbindungs_id(&self) -> VerbindungsId {
        self.verbindung
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis der Client die Verbindung beendet, ein Fehler oder
    /// Timeout auftritt, oder ein Shutdown-Signal eingeht. Beim Verlassen
    /// wird die Verbindung aus dem Verteiler entfernt und der Hub genau
    /// einmal mit `Getrennt` benachrichtigt.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let verbindung = self.verbindung;
        let peer_addr = self.peer_addr;
        let keepalive_intervall = Duration::from_secs(self.state.konfig.keepalive_sek);
        let timeout_dauer = Duration::from_secs(self.state.konfig.verbindungs_timeout_sek);

        tracing::info!(peer = %peer_addr, verbindung = %verbindung, "Neue Verbindung");

        let mut framed = Framed::new(
            stream,
            ServerCodec::with_max_size(self.state.konfig.max_frame_groesse),
        );

        // Erst im Verteiler registrieren, dann den Hub informieren:
        // kein Broadcast kann diese Verbindung verpassen
        let mut sende_rx = self.state.verteiler.verbindung_registrieren(verbindung);

        if self
            .state
            .hub_tx
            .send(VerbindungsEreignis::Verbunden { verbindung })
            .await
            .is_err()
        {
            tracing::warn!(peer = %peer_addr, "Hub-Queue geschlossen, Verbindung wird verworfen");
            self.state.verteiler.verbindung_entfernen(&verbindung);
            return;
        }

        // Zeitpunkt des letzten empfangenen Frames
        let mut letzter_empfang = Instant::now();
        // Zeitpunkt des naechsten Keepalive-Pings
        let mut naechster_ping = Instant::now() + keepalive_intervall;

        loop {
            let jetzt = Instant::now();

            // Timeout-Pruefung
            if jetzt.duration_since(letzter_empfang) > timeout_dauer {
                tracing::warn!(peer = %peer_addr, verbindung = %verbindung, "Verbindungs-Timeout");
                break;
            }

            // Verzoegerung bis zum naechsten Ping berechnen
            let ping_verzoegerung = if jetzt < naechster_ping {
                naechster_ping.duration_since(jetzt)
            } else {
                Duration::from_millis(1)
            };

            tokio::select! {
                // Eingehendes Frame vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(ereignis)) => {
                            letzter_empfang = Instant::now();
                            match ereignis {
                                // Pong ist reines Lebenszeichen der Transport-Ebene
                                ClientEreignis::Pong => {}
                                anderes => {
                                    if self.state.hub_tx
                                        .send(VerbindungsEreignis::Empfangen {
                                            verbindung,
                                            ereignis: anderes,
                                        })
                                        .await
                                        .is_err()
                                    {
                                        tracing::warn!(peer = %peer_addr, "Hub-Queue geschlossen");
                                        break;
                                    }
                                }
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(peer = %peer_addr, verbindung = %verbindung, fehler = %e, "Frame-Lesefehler");
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, verbindung = %verbindung, "Verbindung vom Client geschlossen");
                            break;
                        }
                    }
                }

                // Ausgehendes Ereignis aus dem Verteiler
                Some(ausgehend) = sende_rx.recv() => {
                    if let Err(e) = framed.send(ausgehend).await {
                        tracing::warn!(peer = %peer_addr, verbindung = %verbindung, fehler = %e, "Senden fehlgeschlagen");
                        break;
                    }
                }

                // Keepalive-Ping faellig
                _ = tokio::time::sleep(ping_verzoegerung) => {
                    if Instant::now() >= naechster_ping {
                        if let Err(e) = framed.send(ServerEreignis::Ping).await {
                            tracing::warn!(peer = %peer_addr, verbindung = %verbindung, fehler = %e, "Ping fehlgeschlagen");
                            break;
                        }
                        naechster_ping = Instant::now() + keepalive_intervall;
                    }
                }

                // Shutdown-Signal vom Server
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %peer_addr, verbindung = %verbindung, "Shutdown, Verbindung wird geschlossen");
                        break;
                    }
                }
            }
        }

        // Erst aus dem Verteiler entfernen, dann den Hub benachrichtigen:
        // Broadcasts die der Abschied ausloest treffen diese Verbindung
        // nicht mehr
        self.state.verteiler.verbindung_entfernen(&verbindung);
        let _ = self
            .state
            .hub_tx
            .send(VerbindungsEreignis::Getrennt { verbindung })
            .await;

        tracing::info!(peer = %peer_addr, verbindung = %verbindung, "Verbindungs-Task beendet");
    }
}
