//! HTTP client integration tests
//!
//! Runs `HttpApi` against a throwaway local server that answers one
//! request with a canned response and hands back what it received.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use toolshare::api::{ApiError, HttpApi, MarketplaceApi, NoToken, StaticToken, TokenSource};
use toolshare::domain::{Credentials, NewChatMessage, ToolStatus};
use toolshare::geo::Coordinate;
use toolshare::session::{AuthenticatedSession, SessionStore, SessionUser};

/// Raw request as seen by the fake backend
struct Received {
    head: String,
    body: String,
}

impl Received {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or("")
    }

    fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_lowercase());
        self.head
            .lines()
            .find(|line| line.to_lowercase().starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim().to_string())
    }
}

async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        let head_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending a full request");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&raw[..head_end]).to_string();
        let received = Received {
            head,
            body: String::new(),
        };
        let length = received
            .header("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        while raw.len() < head_end + length {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        Received {
            body: String::from_utf8_lossy(&raw[head_end..]).to_string(),
            ..received
        }
    });

    (base_url, handle)
}

fn anonymous(base_url: &str) -> HttpApi {
    HttpApi::new(base_url, Arc::new(NoToken)).unwrap()
}

#[tokio::test]
async fn test_login_posts_credentials_without_token() {
    let (base_url, server) = serve_once(
        200,
        r#"{"token":"tok-1","name":"Ana","email":"ana@example.com","id":3,"type":"locatario"}"#,
    )
    .await;

    let response = anonymous(&base_url)
        .login(&Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();
    assert_eq!(response.token.as_deref(), Some("tok-1"));
    assert_eq!(response.id, Some(3));

    let received = server.await.unwrap();
    assert_eq!(received.request_line(), "POST /session HTTP/1.1");
    assert_eq!(received.header("authorization"), None);
    let sent: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert_eq!(sent["email"], "ana@example.com");
    assert_eq!(sent["password"], "secret");
}

#[tokio::test]
async fn test_unauthorized_maps_to_fixed_message() {
    let (base_url, server) = serve_once(401, r#"{"message":"senha incorreta"}"#).await;

    let err = anonymous(&base_url)
        .login(&Credentials::new("ana@example.com", "wrong"))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), ApiError::UNAUTHORIZED_MESSAGE);
    server.await.unwrap();
}

#[tokio::test]
async fn test_bearer_token_attached_from_session() {
    let (base_url, server) = serve_once(200, "[]").await;

    let store = Arc::new(SessionStore::in_memory());
    store
        .begin(&AuthenticatedSession::new("tok-xyz", SessionUser::default()))
        .unwrap();
    let tokens: Arc<dyn TokenSource> = store;
    let api = HttpApi::new(&base_url, tokens).unwrap();

    let reservations = api.list_reservations().await.unwrap();
    assert!(reservations.is_empty());

    let received = server.await.unwrap();
    assert_eq!(received.request_line(), "GET /reservations HTTP/1.1");
    assert_eq!(received.header("authorization").as_deref(), Some("Bearer tok-xyz"));
}

#[tokio::test]
async fn test_nearby_sends_coordinates_and_unwraps_envelope() {
    let (base_url, server) = serve_once(
        200,
        r#"{"tools":[{"id":1,"name":"Furadeira","description":"Bosch","price":"25.5","category":"Elétricas","status":"disponível","latitude":"-23.55","longitude":-46.63}]}"#,
    )
    .await;

    let origin = Coordinate::new(-23.5505, -46.6333).unwrap();
    let tools = anonymous(&base_url).list_nearby_tools(origin).await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].price, 25.5);
    assert_eq!(tools[0].status, ToolStatus::Available);
    assert_eq!(tools[0].latitude, Some(-23.55));

    let received = server.await.unwrap();
    let line = received.request_line();
    assert!(line.starts_with("GET /tool?"), "unexpected request line {}", line);
    assert!(line.contains("latitude=-23.5505"));
    assert!(line.contains("longitude=-46.6333"));
}

#[tokio::test]
async fn test_server_message_passes_through() {
    let (base_url, server) = serve_once(409, r#"{"message":"Ferramenta já reservada nessas datas"}"#).await;

    let api = HttpApi::new(&base_url, Arc::new(StaticToken::new("tok"))).unwrap();
    let err = api.get_tool(9).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.user_message(), "Ferramenta já reservada nessas datas");
    server.await.unwrap();
}

#[tokio::test]
async fn test_fallback_message_when_payload_has_none() {
    let (base_url, server) = serve_once(500, "").await;

    let err = anonymous(&base_url).list_categories().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "Error loading categories.");
    server.await.unwrap();
}

#[tokio::test]
async fn test_send_chat_tolerates_empty_body() {
    let (base_url, server) = serve_once(201, "").await;

    let api = HttpApi::new(&base_url, Arc::new(StaticToken::new("tok"))).unwrap();
    let echoed = api
        .send_chat(&NewChatMessage {
            tool_id: 4,
            message: "Ainda disponível?".to_string(),
        })
        .await
        .unwrap();
    assert!(echoed.is_none());

    let received = server.await.unwrap();
    assert_eq!(received.request_line(), "POST /chats HTTP/1.1");
    let sent: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert_eq!(sent["tool_id"], 4);
}

#[tokio::test]
async fn test_garbage_body_is_invalid_response() {
    let (base_url, server) = serve_once(200, "<html>oops</html>").await;

    let err = anonymous(&base_url).list_tools().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Bind then drop so the port is closed
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = anonymous(&base_url).list_tools().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.status(), None);
}
