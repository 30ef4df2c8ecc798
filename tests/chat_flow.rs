//! Integration tests driving a real relay over WebSocket.

use std::sync::Arc;
use std::time::Duration;

use chat_relay::{ChatServer, ClientMessage, Hub, RoomId, ServerConfig, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio_tungstenite::tungstenite::Message;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const ROOM: RoomId = RoomId(1);

/// Starts a server on a random port and returns its address and hub.
async fn start_server() -> (String, Arc<Hub>) {
    let server = ChatServer::bind(ServerConfig::new("127.0.0.1:0"))
        .await
        .expect("server should bind");
    let addr = server.local_addr().expect("should have local addr").to_string();
    let hub = server.hub();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    (addr, hub)
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).expect("encode");
    ws.send(Message::Text(json.into())).await.expect("send");
}

/// Sends a hand-written frame, for payloads `ClientMessage` cannot express.
async fn send_raw(ws: &mut ClientWs, json: &str) {
    ws.send(Message::Text(json.to_string().into())).await.expect("send");
}

/// Next server event, or `None` once the server has closed the connection.
async fn recv(ws: &mut ClientWs) -> Option<ServerMessage> {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for server");
        match frame {
            Some(Ok(Message::Text(text))) => {
                return Some(serde_json::from_str(&text).expect("decode"));
            }
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
            Some(Ok(_)) => continue,
        }
    }
}

async fn join(addr: &str, user: &str) -> ClientWs {
    let mut ws = connect(addr).await;
    send(
        &mut ws,
        &ClientMessage::Join {
            room: ROOM,
            user: user.to_string(),
        },
    )
    .await;
    ws
}

fn say(user: &str, message: &str) -> ClientMessage {
    ClientMessage::Text {
        room: ROOM,
        user: user.to_string(),
        message: message.to_string(),
    }
}

fn text(user: &str, message: &str) -> ServerMessage {
    ServerMessage::Text {
        room: ROOM,
        user: user.to_string(),
        message: message.to_string(),
    }
}

#[tokio::test]
async fn test_alice_and_bob() {
    let (addr, hub) = start_server().await;

    let mut alice = join(&addr, "alice").await;
    assert_eq!(recv(&mut alice).await, Some(ServerMessage::joined(ROOM, "alice")));

    let mut bob = join(&addr, "bob").await;
    assert_eq!(recv(&mut alice).await, Some(ServerMessage::joined(ROOM, "bob")));
    assert_eq!(recv(&mut bob).await, Some(ServerMessage::joined(ROOM, "bob")));

    send(&mut alice, &say("alice", "hi")).await;
    assert_eq!(recv(&mut alice).await, Some(text("alice", "hi")));
    assert_eq!(recv(&mut bob).await, Some(text("alice", "hi")));

    bob.close(None).await.expect("close");
    assert_eq!(recv(&mut alice).await, Some(ServerMessage::left(ROOM, "bob")));
    assert_eq!(hub.members(ROOM).await, vec!["alice"]);
}

#[tokio::test]
async fn test_text_before_join_is_rejected() {
    let (addr, hub) = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, &say("alice", "hi")).await;
    assert_eq!(
        recv(&mut ws).await,
        Some(ServerMessage::system("join (room, user) required"))
    );
    assert_eq!(recv(&mut ws).await, None);
    assert_eq!(hub.room_count().await, 0);
}

#[tokio::test]
async fn test_join_without_user_field_is_rejected() {
    let (addr, hub) = start_server().await;
    let mut ws = connect(&addr).await;

    send_raw(&mut ws, r#"{"type":"join","room":1}"#).await;
    assert_eq!(
        recv(&mut ws).await,
        Some(ServerMessage::system("join (room, user) required"))
    );
    assert_eq!(recv(&mut ws).await, None);
    assert_eq!(hub.room_count().await, 0);
}

#[tokio::test]
async fn test_text_without_room_or_user_is_relayed() {
    let (addr, hub) = start_server().await;

    let mut alice = join(&addr, "alice").await;
    assert_eq!(recv(&mut alice).await, Some(ServerMessage::joined(ROOM, "alice")));

    send_raw(&mut alice, r#"{"type":"text","message":"hi"}"#).await;
    assert_eq!(recv(&mut alice).await, Some(text("alice", "hi")));

    send(&mut alice, &say("alice", "still here")).await;
    assert_eq!(recv(&mut alice).await, Some(text("alice", "still here")));
    assert_eq!(hub.members(ROOM).await, vec!["alice"]);
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let (addr, hub) = start_server().await;

    let mut first = join(&addr, "alice").await;
    assert_eq!(recv(&mut first).await, Some(ServerMessage::joined(ROOM, "alice")));

    let mut second = join(&addr, "alice").await;
    assert_eq!(
        recv(&mut second).await,
        Some(ServerMessage::system("user is already registered"))
    );
    assert_eq!(recv(&mut second).await, None);
    assert_eq!(hub.members(ROOM).await, vec!["alice"]);
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let (addr, _hub) = start_server().await;

    let mut alice = join(&addr, "alice").await;
    assert_eq!(recv(&mut alice).await, Some(ServerMessage::joined(ROOM, "alice")));

    let mut carol = connect(&addr).await;
    send(
        &mut carol,
        &ClientMessage::Join {
            room: RoomId(2),
            user: "carol".to_string(),
        },
    )
    .await;
    assert_eq!(
        recv(&mut carol).await,
        Some(ServerMessage::joined(RoomId(2), "carol"))
    );

    send(&mut alice, &say("alice", "room one only")).await;
    assert_eq!(recv(&mut alice).await, Some(text("alice", "room one only")));

    // carol's next event is her own message, not alice's
    send(
        &mut carol,
        &ClientMessage::Text {
            room: RoomId(2),
            user: "carol".to_string(),
            message: "room two".to_string(),
        },
    )
    .await;
    assert_eq!(
        recv(&mut carol).await,
        Some(ServerMessage::Text {
            room: RoomId(2),
            user: "carol".to_string(),
            message: "room two".to_string(),
        })
    );
}

#[tokio::test]
async fn test_peer_client_session() {
    let (addr, hub) = start_server().await;

    let mut bob = join(&addr, "bob").await;
    assert_eq!(recv(&mut bob).await, Some(ServerMessage::joined(ROOM, "bob")));

    let (mut keyboard, input) = tokio::io::duplex(1024);
    let (output, screen) = tokio::io::duplex(4096);
    let client_addr = addr.clone();
    let client = tokio::spawn(async move {
        chat_relay::peer::chat(&client_addr, ROOM, "alice", BufReader::new(input), output).await
    });
    let mut screen = BufReader::new(screen).lines();

    assert_eq!(recv(&mut bob).await, Some(ServerMessage::joined(ROOM, "alice")));
    assert_eq!(
        next_line(&mut screen).await,
        "[room=1][system]: alice joined the room"
    );

    // blank lines are not sent
    keyboard.write_all(b"\n   \nhello\n").await.expect("type");
    assert_eq!(recv(&mut bob).await, Some(text("alice", "hello")));
    assert_eq!(next_line(&mut screen).await, "[room=1][alice]: hello");

    keyboard.write_all(b"/quit\n").await.expect("type");
    tokio::time::timeout(Duration::from_secs(2), client)
        .await
        .expect("client should finish after /quit")
        .expect("client task")
        .expect("client should succeed");

    assert_eq!(recv(&mut bob).await, Some(ServerMessage::left(ROOM, "alice")));
    assert_eq!(hub.members(ROOM).await, vec!["bob"]);
}

async fn next_line<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> String {
    tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timed out waiting for client output")
        .expect("read output")
        .expect("client output ended")
}
