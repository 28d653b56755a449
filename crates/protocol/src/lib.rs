//! stammtisch-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle Ereignistypen die zwischen Client und
//! Server ausgetauscht werden, sowie das Frame-Format fuer TCP.

pub mod events;
pub mod wire;

pub use events::{
    ChatNachricht, ClientEreignis, FehlerMeldung, NachrichtenTyp, PraesenzMeldung, ServerEreignis,
    TippMeldung,
};
pub use wire::{ClientCodec, FrameCodec, ServerCodec};
