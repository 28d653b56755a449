//! Chat-Verlauf – Begrenzter Puffer der juengsten Nachrichten
//!
//! Haelt Nachrichten in Ankunftsreihenfolge. Ist die Kapazitaet
//! erreicht, verdraengt jede neue Nachricht die aelteste. Der Verlauf
//! gehoert exklusiv dem Hub-Task.

use std::collections::VecDeque;

use stammtisch_protocol::events::ChatNachricht;

/// Begrenzter Verlaufs-Puffer
#[derive(Debug)]
pub struct ChatVerlauf {
    eintraege: VecDeque<ChatNachricht>,
    kapazitaet: usize,
}

impl ChatVerlauf {
    /// Erstellt einen leeren Verlauf mit der gegebenen Kapazitaet
    ///
    /// Die Kapazitaet muss mindestens 1 sein, siehe
    /// `RelayKonfiguration::pruefen`.
    pub fn neu(kapazitaet: usize) -> Self {
        Self {
            eintraege: VecDeque::with_capacity(kapazitaet),
            kapazitaet,
        }
    }

    /// Haengt eine Nachricht an und verdraengt bei voller Kapazitaet die aelteste
    pub fn anhaengen(&mut self, nachricht: ChatNachricht) {
        while self.eintraege.len() >= self.kapazitaet {
            self.eintraege.pop_front();
        }
        self.eintraege.push_back(nachricht);
    }

    /// Gibt eine Kopie aller Eintraege zurueck, aelteste zuerst
    pub fn schnappschuss(&self) -> Vec<ChatNachricht> {
        self.eintraege.iter().cloned().collect()
    }

    /// Gibt die Anzahl der gehaltenen Eintraege zurueck
    pub fn laenge(&self) -> usize {
        self.eintraege.len()
    }

    /// Gibt die konfigurierte Kapazitaet zurueck
    pub fn kapazitaet(&self) -> usize {
        self.kapazitaet
    }

    /// Prueft ob der Verlauf leer ist
    pub fn ist_leer(&self) -> bool {
        self.eintraege.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn nachricht(inhalt: &str) -> ChatNachricht {
        ChatNachricht::system(inhalt, Utc::now())
    }

    #[test]
    fn leerer_verlauf() {
        let verlauf = ChatVerlauf::neu(10);
        assert!(verlauf.ist_leer());
        assert_eq!(verlauf.laenge(), 0);
        assert!(verlauf.schnappschuss().is_empty());
    }

    #[test]
    fn anhaengen_in_reihenfolge() {
        let mut verlauf = ChatVerlauf::neu(10);
        verlauf.anhaengen(nachricht("erste"));
        verlauf.anhaengen(nachricht("zweite"));

        let eintraege = verlauf.schnappschuss();
        assert_eq!(eintraege.len(), 2);
        assert_eq!(eintraege[0].content, "erste");
        assert_eq!(eintraege[1].content, "zweite");
    }

    #[test]
    fn kapazitaet_wird_nie_ueberschritten() {
        let mut verlauf = ChatVerlauf::neu(100);
        for i in 0..105 {
            verlauf.anhaengen(nachricht(&format!("n{}", i)));
        }
        assert_eq!(verlauf.laenge(), 100);
    }

    #[test]
    fn aelteste_nachricht_faellt_zuerst_heraus() {
        let mut verlauf = ChatVerlauf::neu(3);
        for inhalt in ["a", "b", "c", "d"] {
            verlauf.anhaengen(nachricht(inhalt));
        }

        let eintraege = verlauf.schnappschuss();
        assert_eq!(eintraege.len(), 3);
        assert_eq!(eintraege[0].content, "b");
        assert_eq!(eintraege[2].content, "d");
    }

    #[test]
    fn schnappschuss_laesst_verlauf_unveraendert() {
        let mut verlauf = ChatVerlauf::neu(5);
        verlauf.anhaengen(nachricht("bleibt"));

        let _ = verlauf.schnappschuss();
        assert_eq!(verlauf.laenge(), 1);
        assert_eq!(verlauf.kapazitaet(), 5);
    }
}
