//! HTTP client tests against a one-shot local server
//!
//! Each test binds a loopback listener that answers a single request with a
//! canned response and hands back the raw request for inspection.

use incognito_core::{Error, Password, SessionStatus, StatusClient};
use incognito_net::{HttpClientConfig, HttpStatusClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api/", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn client(base_url: &str) -> HttpStatusClient {
    HttpStatusClient::new(&HttpClientConfig::new(base_url)).unwrap()
}

#[tokio::test]
async fn test_query_status_parses_body() {
    let (base_url, server) = serve_once("200 OK", r#"{"incognito":true,"locked":true}"#).await;

    let status = client(&base_url).query_status().await.unwrap();
    assert_eq!(status, SessionStatus::new(true, true));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/incognito/status "));
}

#[tokio::test]
async fn test_unlock_sends_password_json() {
    let (base_url, server) = serve_once("200 OK", "{}").await;
    let password = Password::new("correct").unwrap();

    client(&base_url).unlock(&password).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/incognito/unlock "));
    assert!(request.ends_with(r#"{"password":"correct"}"#));
}

#[tokio::test]
async fn test_unlock_unauthorized_is_invalid_credential() {
    let (base_url, server) =
        serve_once("401 Unauthorized", r#"{"error":"wrong password"}"#).await;
    let password = Password::new("wrong").unwrap();

    let err = client(&base_url).unlock(&password).await.unwrap_err();
    assert!(err.is_invalid_credential());
    server.await.unwrap();
}

#[tokio::test]
async fn test_enable_bad_request_is_rejected() {
    let (base_url, server) =
        serve_once("400 Bad Request", r#"{"error":"password required"}"#).await;
    let password = Password::new("x").unwrap();

    let err = client(&base_url).enable(&password).await.unwrap_err();
    assert!(matches!(err, Error::Rejected(ref m) if m == "password required"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_disable_sends_no_body() {
    let (base_url, server) = serve_once("204 No Content", "").await;

    client(&base_url).disable().await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/incognito/disable "));
    assert!(!request.contains("password"));
}

#[tokio::test]
async fn test_malformed_status_is_transport() {
    let (base_url, server) = serve_once("200 OK", r#"{"unexpected":1}"#).await;

    let err = client(&base_url).query_status().await.unwrap_err();
    assert!(err.is_transport());
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_transport() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api/", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&base_url).lock().await.unwrap_err();
    assert!(err.is_transport());
}
