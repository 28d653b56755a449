//! Integrationstests: kompletter Relay-Durchlauf ueber echte TCP-Sockets

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;

use stammtisch_protocol::events::{ClientEreignis, NachrichtenTyp, ServerEreignis};
use stammtisch_protocol::wire::{read_frame, write_frame, DEFAULT_MAX_FRAME_SIZE};
use stammtisch_relay::{BroadcastHub, RelayKonfiguration, RelayServer, RelayState, Verteiler};

/// Startet einen kompletten Relay auf einem freien Port
async fn relay_starten() -> (SocketAddr, watch::Sender<bool>) {
    let konfig = RelayKonfiguration::default();
    let verteiler = Verteiler::neu();
    let (hub_tx, hub_rx) = BroadcastHub::kanal();
    let hub = BroadcastHub::neu(konfig.clone(), verteiler.clone());
    tokio::spawn(hub.starten(hub_rx));

    let state = RelayState::neu(konfig, verteiler, hub_tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let adresse = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = RelayServer::neu(state, adresse);
    tokio::spawn(async move {
        server.akzeptieren(listener, shutdown_rx).await.unwrap();
    });

    (adresse, shutdown_tx)
}

struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    async fn verbinden(adresse: SocketAddr) -> Self {
        let stream = TcpStream::connect(adresse).await.unwrap();
        Self { stream }
    }

    async fn senden(&mut self, ereignis: &ClientEreignis) {
        write_frame(&mut self.stream, ereignis, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap();
    }

    /// Liest das naechste Ereignis und ueberspringt Keepalive-Pings
    async fn empfangen(&mut self) -> ServerEreignis {
        loop {
            let ereignis: ServerEreignis = timeout(
                Duration::from_secs(2),
                read_frame(&mut self.stream, DEFAULT_MAX_FRAME_SIZE),
            )
            .await
            .expect("Zeitueberschreitung beim Warten auf ein Ereignis")
            .expect("Frame-Lesen fehlgeschlagen");

            if ereignis != ServerEreignis::Ping {
                return ereignis;
            }
        }
    }

    async fn beitreten(&mut self, name: &str) {
        self.senden(&ClientEreignis::Join(name.to_string())).await;
        // chat-history, user-joined und Beitrittshinweis abraeumen
        for _ in 0..3 {
            self.empfangen().await;
        }
    }
}

#[tokio::test]
async fn beitritt_und_nachrichtenfluss() {
    let (adresse, _shutdown) = relay_starten().await;

    let mut alice = TestClient::verbinden(adresse).await;
    alice.senden(&ClientEreignis::Join("Alice".to_string())).await;

    match alice.empfangen().await {
        ServerEreignis::ChatHistory(eintraege) => assert!(eintraege.is_empty()),
        anderes => panic!("chat-history erwartet, war {:?}", anderes),
    }
    match alice.empfangen().await {
        ServerEreignis::UserJoined(p) => {
            assert_eq!(p.display_name, "Alice");
            assert_eq!(p.online_count, 1);
            assert_eq!(p.users, vec!["Alice"]);
        }
        anderes => panic!("user-joined erwartet, war {:?}", anderes),
    }
    match alice.empfangen().await {
        ServerEreignis::NewMessage(n) => {
            assert_eq!(n.kind, NachrichtenTyp::System);
            assert_eq!(n.content, "Alice joined the chat");
        }
        anderes => panic!("new-message erwartet, war {:?}", anderes),
    }

    // Bob sieht beim Beitritt den bisherigen Verlauf
    let mut bob = TestClient::verbinden(adresse).await;
    bob.senden(&ClientEreignis::Join("Bob".to_string())).await;
    match bob.empfangen().await {
        ServerEreignis::ChatHistory(eintraege) => {
            assert_eq!(eintraege.len(), 1);
            assert_eq!(eintraege[0].content, "Alice joined the chat");
        }
        anderes => panic!("chat-history erwartet, war {:?}", anderes),
    }
    bob.empfangen().await; // user-joined
    bob.empfangen().await; // Beitrittshinweis

    // Alice sieht Bobs Beitritt, aber keinen zweiten Verlauf
    match alice.empfangen().await {
        ServerEreignis::UserJoined(p) => {
            assert_eq!(p.online_count, 2);
            assert_eq!(p.users, vec!["Alice", "Bob"]);
        }
        anderes => panic!("user-joined erwartet, war {:?}", anderes),
    }
    alice.empfangen().await; // Beitrittshinweis

    // Eine Nachricht von Alice erreicht beide
    alice
        .senden(&ClientEreignis::SendMessage {
            content: "Hallo Bob!".to_string(),
        })
        .await;

    match bob.empfangen().await {
        ServerEreignis::NewMessage(n) => {
            assert_eq!(n.kind, NachrichtenTyp::User);
            assert_eq!(n.display_name.as_deref(), Some("Alice"));
            assert_eq!(n.content, "Hallo Bob!");
        }
        anderes => panic!("new-message erwartet, war {:?}", anderes),
    }
    match alice.empfangen().await {
        ServerEreignis::NewMessage(n) => assert_eq!(n.content, "Hallo Bob!"),
        anderes => panic!("new-message erwartet, war {:?}", anderes),
    }
}

#[tokio::test]
async fn nachricht_vor_beitritt_liefert_fehler() {
    let (adresse, _shutdown) = relay_starten().await;
    let mut client = TestClient::verbinden(adresse).await;

    client
        .senden(&ClientEreignis::SendMessage {
            content: "zu frueh".to_string(),
        })
        .await;

    match client.empfangen().await {
        ServerEreignis::Error(f) => assert_eq!(f.message, "You must join the chat first"),
        anderes => panic!("error erwartet, war {:?}", anderes),
    }
}

#[tokio::test]
async fn wortlimit_liefert_fehler_an_den_absender() {
    let (adresse, _shutdown) = relay_starten().await;
    let mut client = TestClient::verbinden(adresse).await;
    client.beitreten("Vielschreiber").await;

    let inhalt = vec!["wort"; 101].join(" ");
    client.senden(&ClientEreignis::SendMessage { content: inhalt }).await;

    match client.empfangen().await {
        ServerEreignis::Error(f) => assert_eq!(f.message, "Message exceeds 100 words limit"),
        anderes => panic!("error erwartet, war {:?}", anderes),
    }
}

#[tokio::test]
async fn tipp_status_erreicht_nur_die_anderen() {
    let (adresse, _shutdown) = relay_starten().await;

    let mut alice = TestClient::verbinden(adresse).await;
    alice.beitreten("Alice").await;

    let mut bob = TestClient::verbinden(adresse).await;
    bob.beitreten("Bob").await;
    alice.empfangen().await; // user-joined (Bob)
    alice.empfangen().await; // Beitrittshinweis

    bob.senden(&ClientEreignis::Typing(true)).await;

    match alice.empfangen().await {
        ServerEreignis::UserTyping(t) => {
            assert_eq!(t.display_name, "Bob");
            assert!(t.is_typing);
        }
        anderes => panic!("user-typing erwartet, war {:?}", anderes),
    }

    // Bob selbst darf den Tipp-Status nicht sehen: sein naechstes
    // Ereignis ist bereits die folgende Nachricht
    alice
        .senden(&ClientEreignis::SendMessage {
            content: "nach dem Tippen".to_string(),
        })
        .await;

    match bob.empfangen().await {
        ServerEreignis::NewMessage(n) => assert_eq!(n.content, "nach dem Tippen"),
        anderes => panic!("new-message erwartet, war {:?}", anderes),
    }
}

#[tokio::test]
async fn trennung_meldet_den_benutzer_ab() {
    let (adresse, _shutdown) = relay_starten().await;

    let mut alice = TestClient::verbinden(adresse).await;
    alice.beitreten("Alice").await;

    let bob = {
        let mut bob = TestClient::verbinden(adresse).await;
        bob.beitreten("Bob").await;
        bob
    };
    alice.empfangen().await; // user-joined (Bob)
    alice.empfangen().await; // Beitrittshinweis

    // Bobs Socket schliessen
    drop(bob);

    match alice.empfangen().await {
        ServerEreignis::NewMessage(n) => {
            assert_eq!(n.kind, NachrichtenTyp::System);
            assert_eq!(n.content, "Bob left the chat");
        }
        anderes => panic!("new-message erwartet, war {:?}", anderes),
    }
    match alice.empfangen().await {
        ServerEreignis::UserLeft(p) => {
            assert_eq!(p.display_name, "Bob");
            assert_eq!(p.online_count, 1);
            assert_eq!(p.users, vec!["Alice"]);
        }
        anderes => panic!("user-left erwartet, war {:?}", anderes),
    }
}

#[tokio::test]
async fn trennung_ohne_beitritt_bleibt_stumm() {
    let (adresse, _shutdown) = relay_starten().await;

    let mut alice = TestClient::verbinden(adresse).await;
    alice.beitreten("Alice").await;

    // Verbindung die nie beitritt kommt und geht
    let mitleser = TestClient::verbinden(adresse).await;
    drop(mitleser);

    // Alice bekommt davon nichts mit: das naechste Ereignis ist ihre
    // eigene Nachricht
    alice
        .senden(&ClientEreignis::SendMessage {
            content: "noch da?".to_string(),
        })
        .await;
    match alice.empfangen().await {
        ServerEreignis::NewMessage(n) => assert_eq!(n.content, "noch da?"),
        anderes => panic!("new-message erwartet, war {:?}", anderes),
    }
}

#[tokio::test]
async fn shutdown_schliesst_verbindungen() {
    let (adresse, shutdown) = relay_starten().await;

    let mut client = TestClient::verbinden(adresse).await;
    client.beitreten("Kurzbesuch").await;

    shutdown.send(true).unwrap();

    // Der Server schliesst die Verbindung; das naechste Lesen scheitert
    let resultat: std::io::Result<ServerEreignis> = timeout(
        Duration::from_secs(2),
        read_frame(&mut client.stream, DEFAULT_MAX_FRAME_SIZE),
    )
    .await
    .expect("Server muss die Verbindung zeitnah schliessen");
    assert!(resultat.is_err());
}
