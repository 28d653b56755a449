//! Sitzungs-Register – Wer ist im Chat, in welcher Reihenfolge
//!
//! Das Register ist die einzige Quelle fuer Praesenz-Angaben
//! (Online-Anzahl und Namensliste). Es gehoert exklusiv dem Hub-Task;
//! Synchronisation passiert eine Ebene hoeher durch die serialisierte
//! Ereignis-Queue.

use chrono::{DateTime, Utc};
use stammtisch_core::types::VerbindungsId;

// ---------------------------------------------------------------------------
// Sitzung
// ---------------------------------------------------------------------------

/// Eine aktive Chat-Sitzung
#[derive(Debug, Clone, PartialEq)]
pub struct Sitzung {
    /// Verbindung zu der diese Sitzung gehoert
    pub verbindung: VerbindungsId,
    /// Gewaehlter Anzeigename, bereits gekuerzt
    pub anzeigename: String,
    /// Zeitpunkt des (letzten) Beitritts
    pub beigetreten_am: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SitzungsRegister
// ---------------------------------------------------------------------------

/// Register aller angemeldeten Sitzungen in Beitrittsreihenfolge
///
/// Ein erneuter Beitritt derselben Verbindung ueberschreibt den Namen an
/// Ort und Stelle und behaelt die urspruengliche Position in der Liste.
#[derive(Debug, Default)]
pub struct SitzungsRegister {
    sitzungen: Vec<Sitzung>,
}

impl SitzungsRegister {
    /// Erstellt ein leeres Register
    pub fn neu() -> Self {
        Self {
            sitzungen: Vec::new(),
        }
    }

    /// Registriert eine Sitzung oder benennt eine bestehende um
    ///
    /// Der Anzeigename wird auf `max_name_laenge` Zeichen gekuerzt.
    /// Gibt die registrierte Sitzung zurueck.
    pub fn registrieren(
        &mut self,
        verbindung: VerbindungsId,
        anzeigename: &str,
        max_name_laenge: usize,
        jetzt: DateTime<Utc>,
    ) -> Sitzung {
        let name = kuerzen(anzeigename, max_name_laenge);

        if let Some(bestehende) = self
            .sitzungen
            .iter_mut()
            .find(|s| s.verbindung == verbindung)
        {
            bestehende.anzeigename = name;
            bestehende.beigetreten_am = jetzt;
            return bestehende.clone();
        }

        let sitzung = Sitzung {
            verbindung,
            anzeigename: name,
            beigetreten_am: jetzt,
        };
        self.sitzungen.push(sitzung.clone());
        sitzung
    }

    /// Entfernt die Sitzung einer Verbindung
    ///
    /// Gibt die entfernte Sitzung zurueck, oder `None` wenn die
    /// Verbindung nie beigetreten ist.
    pub fn entfernen(&mut self, verbindung: &VerbindungsId) -> Option<Sitzung> {
        let pos = self.sitzungen.iter().position(|s| s.verbindung == *verbindung)?;
        Some(self.sitzungen.remove(pos))
    }

    /// Gibt die Sitzung einer Verbindung zurueck
    pub fn sitzung(&self, verbindung: &VerbindungsId) -> Option<&Sitzung> {
        self.sitzungen.iter().find(|s| s.verbindung == *verbindung)
    }

    /// Prueft ob eine Verbindung beigetreten ist
    pub fn ist_registriert(&self, verbindung: &VerbindungsId) -> bool {
        self.sitzungen.iter().any(|s| s.verbindung == *verbindung)
    }

    /// Gibt die Anzahl der angemeldeten Sitzungen zurueck
    pub fn anzahl(&self) -> usize {
        self.sitzungen.len()
    }

    /// Gibt alle Anzeigenamen in Beitrittsreihenfolge zurueck
    pub fn anzeigenamen(&self) -> Vec<String> {
        self.sitzungen.iter().map(|s| s.anzeigename.clone()).collect()
    }
}

/// Kuerzt einen Namen auf hoechstens `max` Zeichen (Zeichen, nicht Bytes)
fn kuerzen(name: &str, max: usize) -> String {
    name.chars().take(max).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn jetzt() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn registrieren_und_entfernen() {
        let mut register = SitzungsRegister::neu();
        let verbindung = VerbindungsId::new();

        let sitzung = register.registrieren(verbindung, "Alice", 20, jetzt());
        assert_eq!(sitzung.anzeigename, "Alice");
        assert!(register.ist_registriert(&verbindung));
        assert_eq!(register.anzahl(), 1);

        let entfernt = register.entfernen(&verbindung).expect("Sitzung muss existieren");
        assert_eq!(entfernt.anzeigename, "Alice");
        assert_eq!(register.anzahl(), 0);
    }

    #[test]
    fn entfernen_ohne_sitzung_ist_none() {
        let mut register = SitzungsRegister::neu();
        assert!(register.entfernen(&VerbindungsId::new()).is_none());
    }

    #[test]
    fn anzeigenamen_in_beitrittsreihenfolge() {
        let mut register = SitzungsRegister::neu();
        for name in ["Anna", "Bernd", "Clara"] {
            register.registrieren(VerbindungsId::new(), name, 20, jetzt());
        }
        assert_eq!(register.anzeigenamen(), vec!["Anna", "Bernd", "Clara"]);
    }

    #[test]
    fn erneuter_beitritt_behaelt_position() {
        let mut register = SitzungsRegister::neu();
        let erste = VerbindungsId::new();
        register.registrieren(erste, "Anna", 20, jetzt());
        register.registrieren(VerbindungsId::new(), "Bernd", 20, jetzt());

        register.registrieren(erste, "Annika", 20, jetzt());

        assert_eq!(register.anzahl(), 2);
        assert_eq!(register.anzeigenamen(), vec!["Annika", "Bernd"]);
    }

    #[test]
    fn name_wird_auf_maximal_laenge_gekuerzt() {
        let mut register = SitzungsRegister::neu();
        let sitzung = register.registrieren(
            VerbindungsId::new(),
            "EinVielZuLangerAnzeigename",
            20,
            jetzt(),
        );
        assert_eq!(sitzung.anzeigename, "EinVielZuLangerAnzei");
        assert_eq!(sitzung.anzeigename.chars().count(), 20);
    }

    #[test]
    fn kuerzung_respektiert_zeichengrenzen() {
        // Umlaute sind mehrere Bytes lang; gekuerzt wird nach Zeichen
        let mut register = SitzungsRegister::neu();
        let sitzung = register.registrieren(VerbindungsId::new(), "Grüßgöttle", 5, jetzt());
        assert_eq!(sitzung.anzeigename, "Grüßg");
    }

    #[test]
    fn doppelte_namen_sind_erlaubt() {
        let mut register = SitzungsRegister::neu();
        register.registrieren(VerbindungsId::new(), "Max", 20, jetzt());
        register.registrieren(VerbindungsId::new(), "Max", 20, jetzt());
        assert_eq!(register.anzahl(), 2);
        assert_eq!(register.anzeigenamen(), vec!["Max", "Max"]);
    }
}
