//! TCP-Listener – Nimmt Verbindungen an und startet Verbindungs-Tasks

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::connection::ClientVerbindung;
use crate::error::RelayResult;
use crate::state::RelayState;

/// TCP-Relay-Server
///
/// Bindet einen TCP-Socket und startet fuer jede eingehende Verbindung
/// einen eigenen tokio-Task mit einer `ClientVerbindung`.
pub struct RelayServer {
    state: Arc<RelayState>,
    bind_addr: SocketAddr,
}

impl RelayServer {
    /// Erstellt einen neuen RelayServer
    pub fn neu(state: Arc<RelayState>, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    /// Bindet den Socket und akzeptiert Verbindungen
    ///
    /// Laeuft bis `shutdown_rx` ein `true`-Signal liefert.
    pub async fn starten(self, shutdown_rx: watch::Receiver<bool>) -> RelayResult<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        self.akzeptieren(listener, shutdown_rx).await
    }

    /// Akzeptiert Verbindungen auf einem bereits gebundenen Listener
    pub async fn akzeptieren(
        self,
        listener: TcpListener,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> RelayResult<()> {
        let lokale_addr = listener.local_addr()?;
        tracing::info!(adresse = %lokale_addr, "TCP-Relay gestartet");

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");

                            let verbindung = ClientVerbindung::neu(Arc::clone(&self.state), peer_addr);
                            let shutdown_rx_clone = shutdown_rx.clone();

                            tokio::spawn(async move {
                                verbindung.verarbeiten(stream, shutdown_rx_clone).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Relay: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("TCP-Relay gestoppt");
        Ok(())
    }
}
