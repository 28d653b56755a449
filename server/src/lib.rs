//! stammtisch-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und verdrahtet den Relay-Kern mit dem
//! TCP-Listener.

pub mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;

use config::ServerConfig;
use stammtisch_relay::{BroadcastHub, RelayServer, RelayState, Verteiler};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Relay-Konfiguration pruefen
    /// 2. Hub-Task starten (einziger Konsument der Ereignis-Queue)
    /// 3. TCP-Listener starten
    /// 4. Auf Ctrl-C warten und den Shutdown signalisieren
    pub async fn starten(self) -> Result<()> {
        let konfig = self.config.relay_konfiguration();
        konfig.pruefen()?;

        let bind_adresse: SocketAddr = self.config.tcp_bind_adresse().parse()?;

        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %bind_adresse,
            verlauf_kapazitaet = konfig.verlauf_kapazitaet,
            "Server startet"
        );

        let verteiler = Verteiler::neu();
        let (hub_tx, hub_rx) = BroadcastHub::kanal();
        let hub = BroadcastHub::neu(konfig.clone(), verteiler.clone());
        let hub_task = tokio::spawn(hub.starten(hub_rx));

        let state = RelayState::neu(konfig, verteiler, hub_tx);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let relay = RelayServer::neu(Arc::clone(&state), bind_adresse);
        let mut relay_task = tokio::spawn(relay.starten(shutdown_rx));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::select! {
            ergebnis = &mut relay_task => {
                // Listener hat sich vorzeitig beendet, z.B. Bind-Fehler
                ergebnis??;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(
                    uptime_sek = state.uptime_sek(),
                    "Shutdown-Signal empfangen, Server wird beendet"
                );
                let _ = shutdown_tx.send(true);
                relay_task.await??;
            }
        }

        // Der letzte Hub-Sender haengt am RelayState; sobald alle
        // Verbindungs-Tasks beendet sind, laeuft die Queue leer
        drop(state);
        if tokio::time::timeout(Duration::from_secs(5), hub_task).await.is_err() {
            tracing::warn!("Hub-Task nicht rechtzeitig beendet");
        }

        Ok(())
    }
}
