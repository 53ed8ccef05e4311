//! Request dispatch tests: URL building, default query merging, decoding,
//! error classification and cancellation.
//!
//! Uses wiremock to stand in for the Nekos API.

use std::time::{Duration, Instant};

use nekosapi::{CancellationToken, NekosClient, NekosError, Query};
use reqwest::Method;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Answers every request with its own path and query as a JSON string.
async fn echo_server(http_method: &str) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method(http_method))
        .respond_with(|req: &Request| {
            let mut answer = req.url.path().to_string();
            if let Some(query) = req.url.query() {
                answer.push('?');
                answer.push_str(query);
            }
            ResponseTemplate::new(200).set_body_json(answer)
        })
        .mount(&mock_server)
        .await;

    mock_server
}

/// Serve one connection whose body stops short of its `Content-Length`.
async fn truncated_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Drain the request head so closing doesn't reset the connection
        let mut request: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"items\": [")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    uri
}

fn obi_query() -> Query {
    Query::new()
        .param("oh", "hello")
        .param("oh", "there")
        .param("obi", "wan")
}

#[tokio::test]
async fn test_get_builds_path_and_query() {
    init_tracing();
    let mock_server = echo_server("GET").await;
    let client = NekosClient::new(&mock_server.uri()).unwrap();

    let cases = [
        ("/", Query::new(), "/".to_string()),
        ("/directory", Query::new(), "/directory".to_string()),
        ("/", obi_query(), format!("/?{}", obi_query().encode())),
        (
            "/directory",
            obi_query(),
            format!("/directory?{}", obi_query().encode()),
        ),
    ];

    for (req_path, query, expected) in cases {
        let answer: String = client.get(req_path, Some(&query)).await.unwrap();
        assert_eq!(answer, expected, "path {req_path}");
    }
}

#[tokio::test]
async fn test_post_builds_path_and_query() {
    let mock_server = echo_server("POST").await;
    let client = NekosClient::new(&mock_server.uri()).unwrap();

    let answer: String = client.post("/directory", Some(&obi_query())).await.unwrap();
    assert_eq!(answer, "/directory?obi=wan&oh=hello&oh=there");

    let answer: String = client.post("/", None).await.unwrap();
    assert_eq!(answer, "/");
}

#[tokio::test]
async fn test_default_query_merging() {
    let mock_server = echo_server("GET").await;
    let defaults = Query::new()
        .param("oh", "my")
        .param("oh", "god")
        .param("hii", "there");

    let cases = [
        ("empty_both", Query::new(), Query::new(), "/"),
        (
            "empty_default",
            Query::new(),
            obi_query(),
            "/?obi=wan&oh=hello&oh=there",
        ),
        ("empty_query", defaults.clone(), Query::new(), "/?hii=there&oh=my&oh=god"),
        (
            "clash_query",
            defaults.clone(),
            obi_query(),
            "/?hii=there&obi=wan&oh=hello&oh=there",
        ),
    ];

    for (name, default_query, query, expected) in cases {
        let client = NekosClient::new(&mock_server.uri())
            .unwrap()
            .with_default_query(default_query);
        let answer: String = client.get("/", Some(&query)).await.unwrap();
        assert_eq!(answer, expected, "case {name}");
    }
}

#[tokio::test]
async fn test_default_only_rating() {
    let mock_server = echo_server("GET").await;
    let client = NekosClient::new(&mock_server.uri())
        .unwrap()
        .with_default_query(Query::new().param("rating", "safe"));

    let answer: String = client.get("/images", Some(&Query::new())).await.unwrap();
    assert_eq!(answer, "/images?rating=safe");

    let answer: String = client.get("/images", None).await.unwrap();
    assert_eq!(answer, "/images?rating=safe");
}

#[tokio::test]
async fn test_request_key_replaces_default_values() {
    let mock_server = echo_server("GET").await;
    let client = NekosClient::new(&mock_server.uri())
        .unwrap()
        .with_default_query(Query::new().param("oh", "my").param("oh", "god"));

    let query = Query::new().param("oh", "hello").param("oh", "there");
    let answer: String = client.get("/", Some(&query)).await.unwrap();
    assert_eq!(answer, "/?oh=hello&oh=there");
}

#[tokio::test]
async fn test_disjoint_keys_both_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images"))
        .and(query_param("limit", "1"))
        .and(query_param("tag", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NekosClient::new(&mock_server.uri())
        .unwrap()
        .with_default_query(Query::new().param("limit", 1));
    let answer: serde_json::Value = client
        .get("/images", Some(&Query::new().param("tag", 5)))
        .await
        .unwrap();
    assert_eq!(answer["ok"], true);
}

#[tokio::test]
async fn test_calls_do_not_mutate_queries() {
    let mock_server = echo_server("GET").await;
    let defaults = Query::new().param("limit", 1).param("rating", "safe");
    let client = NekosClient::new(&mock_server.uri())
        .unwrap()
        .with_default_query(defaults.clone());

    let query = Query::new().param("rating", "explicit");
    let before = query.clone();
    let _: String = client.get("/", Some(&query)).await.unwrap();

    assert_eq!(query, before);
    assert_eq!(client.default_query(), &defaults);
}

#[tokio::test]
async fn test_concurrent_calls_do_not_interfere() {
    let mock_server = echo_server("GET").await;
    let client = NekosClient::new(&mock_server.uri())
        .unwrap()
        .with_default_query(Query::safe());

    let first = Query::new().tag(1);
    let second = Query::new().rating(nekosapi::Rating::Explicit);
    let (a, b, c) = tokio::join!(
        client.get::<String>("/a", Some(&first)),
        client.get::<String>("/b", Some(&second)),
        client.get::<String>("/c", None),
    );

    assert_eq!(a.unwrap(), "/a?rating=safe&tag=1");
    assert_eq!(b.unwrap(), "/b?rating=explicit");
    assert_eq!(c.unwrap(), "/c?rating=safe");
}

#[tokio::test]
async fn test_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = NekosClient::new(&mock_server.uri()).unwrap();
    let result: nekosapi::Result<serde_json::Value> = client.get("/images/1", None).await;

    assert!(matches!(result, Err(NekosError::ParseError(_))));
}

#[tokio::test]
async fn test_schema_mismatch_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images/tags/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "one"})))
        .mount(&mock_server)
        .await;

    let client = NekosClient::new(&mock_server.uri()).unwrap();
    let result: nekosapi::Result<nekosapi::Tag> = client.get("/images/tags/1", None).await;

    assert!(matches!(result, Err(NekosError::ParseError(_))));
}

#[tokio::test]
async fn test_send_skips_decoding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NekosClient::new(&mock_server.uri()).unwrap();
    client
        .send(Method::POST, "/images/report", Some(&Query::new().param("id", 3)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_transport_error() {
    // Grab a free port and close it again so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = NekosClient::new(&uri).unwrap();
    let result: nekosapi::Result<serde_json::Value> = client.get("/images", None).await;

    assert!(matches!(result, Err(NekosError::HttpError(_))));
}

#[tokio::test]
async fn test_truncated_body_is_body_read_error() {
    let uri = truncated_body_server().await;

    let client = NekosClient::new(&uri).unwrap();
    let result: nekosapi::Result<serde_json::Value> = client.get("/images", None).await;

    assert!(matches!(result, Err(NekosError::BodyRead(_))));
}

#[tokio::test]
async fn test_already_cancelled_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json("unreachable"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = NekosClient::new(&mock_server.uri()).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let result: nekosapi::Result<String> = client.get_with_cancel(&token, "/images", None).await;
    assert!(result.unwrap_err().is_cancelled());

    let result = client
        .send_with_cancel(&token, Method::POST, "/images/report", None)
        .await;
    assert!(matches!(result, Err(NekosError::Cancelled)));
}

#[tokio::test]
async fn test_cancel_in_flight() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json("too late")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let client = NekosClient::new(&mock_server.uri()).unwrap();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let result: nekosapi::Result<String> = client.get_with_cancel(&token, "/images", None).await;

    assert!(matches!(result, Err(NekosError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_uncancelled_token_completes() {
    let mock_server = echo_server("POST").await;
    let client = NekosClient::new(&mock_server.uri()).unwrap();
    let token = CancellationToken::new();

    let answer: String = client
        .post_with_cancel(&token, "/x", Some(&Query::new().param("a", 1)))
        .await
        .unwrap();
    assert_eq!(answer, "/x?a=1");
}
