//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};
use stammtisch_relay::RelayKonfiguration;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Chat-Einstellungen
    pub chat: ChatEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Stammtisch".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer die TCP-Verbindung
    pub bind_adresse: String,
    /// Port fuer die TCP-Verbindung
    pub tcp_port: u16,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// Maximale Frame-Groesse in Bytes
    pub max_frame_groesse: usize,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            tcp_port: 4819,
            keepalive_sek: 25,
            verbindungs_timeout_sek: 60,
            max_frame_groesse: 65536,
        }
    }
}

/// Chat-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEinstellungen {
    /// Kapazitaet des Verlaufs-Puffers
    pub verlauf_kapazitaet: usize,
    /// Maximale Wortanzahl pro Nachricht
    pub max_woerter: usize,
    /// Maximale Laenge des Anzeigenamens in Zeichen
    pub max_name_laenge: usize,
}

impl Default for ChatEinstellungen {
    fn default() -> Self {
        Self {
            verlauf_kapazitaet: 100,
            max_woerter: 100,
            max_name_laenge: 20,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Gibt die vollstaendige Bind-Adresse fuer TCP zurueck
    pub fn tcp_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.tcp_port)
    }

    /// Uebersetzt die Einstellungen in die Konfiguration des Relay-Kerns
    pub fn relay_konfiguration(&self) -> RelayKonfiguration {
        RelayKonfiguration {
            verlauf_kapazitaet: self.chat.verlauf_kapazitaet,
            max_woerter: self.chat.max_woerter,
            max_name_laenge: self.chat.max_name_laenge,
            keepalive_sek: self.netzwerk.keepalive_sek,
            verbindungs_timeout_sek: self.netzwerk.verbindungs_timeout_sek,
            max_frame_groesse: self.netzwerk.max_frame_groesse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.server.name, "Stammtisch");
        assert_eq!(cfg.netzwerk.tcp_port, 4819);
        assert_eq!(cfg.chat.verlauf_kapazitaet, 100);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn bind_adresse() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.tcp_bind_adresse(), "0.0.0.0:4819");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            name = "Tresen"

            [netzwerk]
            tcp_port = 10000

            [chat]
            max_woerter = 50
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server.name, "Tresen");
        assert_eq!(cfg.netzwerk.tcp_port, 10000);
        assert_eq!(cfg.chat.max_woerter, 50);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.chat.verlauf_kapazitaet, 100);
        assert_eq!(cfg.netzwerk.keepalive_sek, 25);
    }

    #[test]
    fn relay_konfiguration_uebernimmt_die_werte() {
        let toml = r#"
            [chat]
            verlauf_kapazitaet = 42
            max_name_laenge = 10
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        let relay = cfg.relay_konfiguration();
        assert_eq!(relay.verlauf_kapazitaet, 42);
        assert_eq!(relay.max_name_laenge, 10);
        assert_eq!(relay.max_woerter, 100);
        assert!(relay.pruefen().is_ok());
    }
}
