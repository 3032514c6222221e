//! NBP client against a local one-shot HTTP server

use rusty_rates::config::SourceConfig;
use rusty_rates::data::normalize;
use rusty_rates::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned response; the handle yields the request line
async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/api/exchangerates/rates", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (endpoint, handle)
}

fn client(endpoint: String) -> NbpRateClient {
    NbpRateClient::new(&SourceConfig {
        endpoint,
        timeout_secs: 5,
        ..SourceConfig::default()
    })
    .unwrap()
}

const USD_BODY: &str = r#"{"table":"A","currency":"dolar amerykański","code":"USD","rates":[{"no":"104/A/NBP/2024","effectiveDate":"2024-05-29","mid":3.9363},{"no":"105/A/NBP/2024","effectiveDate":"2024-05-31","mid":3.9389}]}"#;

#[tokio::test]
async fn test_fetch_returns_raw_object() {
    let (endpoint, server) = serve_once("200 OK", USD_BODY).await;
    let usd = CurrencyCode::new("usd").unwrap();

    let raw = client(endpoint).fetch(&usd, 2).await.unwrap();
    let request_line = server.await.unwrap();

    assert_eq!(
        request_line,
        "GET /api/exchangerates/rates/a/usd/last/2/?format=json HTTP/1.1"
    );
    assert_eq!(raw.get("code").and_then(|v| v.as_str()), Some("USD"));

    let series = normalize(&raw, &CurrencyCode::new("PLN").unwrap()).unwrap();
    assert_eq!(series.name(), "USD/PLN");
    assert_eq!(series.len(), 2);
}

#[tokio::test]
async fn test_non_success_status() {
    let (endpoint, server) = serve_once("500 Internal Server Error", "{}").await;
    let err = client(endpoint)
        .fetch(&CurrencyCode::new("eur").unwrap(), 10)
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, RatesError::HttpStatus { status: 500, .. }));
    assert!(err.to_string().contains("/a/eur/last/10/"));
}

#[tokio::test]
async fn test_not_found_status() {
    let (endpoint, server) = serve_once("404 Not Found", "\"NotFound - Not Found\"").await;
    let err = client(endpoint)
        .fetch(&CurrencyCode::new("xyz").unwrap(), 10)
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(err.is_transport());
}

#[tokio::test]
async fn test_non_object_body_is_transport_error() {
    let (endpoint, server) = serve_once("200 OK", "[1, 2, 3]").await;
    let err = client(endpoint)
        .fetch(&CurrencyCode::new("chf").unwrap(), 1)
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, RatesError::Transport { .. }));
}

#[tokio::test]
async fn test_undecodable_body_is_transport_error() {
    let (endpoint, server) = serve_once("200 OK", "not json").await;
    let err = client(endpoint)
        .fetch(&CurrencyCode::new("chf").unwrap(), 1)
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, RatesError::Transport { ref message, .. } if message.contains("decode")));
}
