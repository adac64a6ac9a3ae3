use services::error::{CoachError, LearningPathError};
use services::{CoachApi, CoachRequest, HttpCoachClient, LearningPathApi};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tutor_core::model::{PathId, Turn};

/// Serve exactly one canned HTTP response and hand back the raw request.
async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(split) = text.find("\r\n\r\n") {
            let content_length = text[..split]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= split + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn posts_windowed_request_and_decodes_reply() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"reply":"What is a load balancer?","hint":"traffic","score":8}"#,
    )
    .await;
    let client = HttpCoachClient::new(base_url);
    let window = [Turn::system("Welcome to System Design!")];
    let request = CoachRequest::new("hello", "System Design", &window, true);

    let reply = client.send(&request).await.unwrap();
    assert_eq!(reply.reply, "What is a load balancer?");
    assert_eq!(reply.hint.as_deref(), Some("traffic"));
    assert_eq!(reply.score, Some(8.0));

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /design_chat HTTP/1.1"));
    let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
    let sent: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(sent["message"], "hello");
    assert_eq!(sent["learning_path"], "System Design");
    assert_eq!(sent["is_first_response"], true);
    assert_eq!(sent["context"]["conversation"][0]["sender"], "system");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (base_url, server) = serve_once("500 Internal Server Error", "{}").await;
    let client = HttpCoachClient::new(base_url);
    let request = CoachRequest::new("hello", "System Design", &[], true);

    let err = client.send(&request).await.unwrap_err();
    assert!(matches!(err, CoachError::HttpStatus(status) if status.as_u16() == 500));
    server.await.unwrap();
}

#[tokio::test]
async fn error_body_is_a_service_error() {
    let (base_url, server) = serve_once("200 OK", r#"{"error":"model overloaded"}"#).await;
    let client = HttpCoachClient::new(base_url);
    let request = CoachRequest::new("hello", "System Design", &[], false);

    let err = client.send(&request).await.unwrap_err();
    assert!(matches!(err, CoachError::Service(msg) if msg == "model overloaded"));
    server.await.unwrap();
}

#[tokio::test]
async fn fetches_learning_path_by_id() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"_id":"sd","title":"System Design","image":null,"description":"Scale"}"#,
    )
    .await;
    let client = HttpCoachClient::new(format!("{base_url}/"));

    let path = client.get_path(&PathId::new("sd")).await.unwrap();
    assert_eq!(path.title, "System Design");
    assert_eq!(path.welcome_text(), "Welcome to System Design!");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /learning-paths/sd HTTP/1.1"));
}

#[tokio::test]
async fn missing_learning_path_is_not_found() {
    let (base_url, server) = serve_once("404 Not Found", r#"{"detail":"missing"}"#).await;
    let client = HttpCoachClient::new(base_url);

    let err = client.get_path(&PathId::new("gone")).await.unwrap_err();
    assert!(matches!(err, LearningPathError::NotFound(id) if id.as_str() == "gone"));
    server.await.unwrap();
}

#[tokio::test]
async fn lists_learning_paths() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"[{"_id":"a","title":"Algorithms"},{"_id":"b","title":"Databases"}]"#,
    )
    .await;
    let client = HttpCoachClient::new(base_url);

    let paths = client.list_paths().await.unwrap();
    let titles: Vec<&str> = paths.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Algorithms", "Databases"]);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /learning-paths HTTP/1.1"));
}
