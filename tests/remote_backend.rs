use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use hoops_terminal::backend::{BackendError, StatsBackend};
use hoops_terminal::remote_backend::RemoteBackend;

/// Answers a single request with `status` and `body`, returning the request path.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");
        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).expect("header");
            if header == "\r\n" || header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().expect("content length");
            }
        }
        let mut payload = vec![0u8; content_length];
        reader.read_exact(&mut payload).expect("request body");

        let mut stream = stream;
        let reply = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(reply.as_bytes()).expect("write reply");
        stream.flush().expect("flush");
        request_line
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_string()
    });
    (format!("http://{addr}"), handle)
}

#[test]
fn rejected_join_keeps_the_conflict_kind() {
    let (url, server) = serve_once(
        "409 Conflict",
        r#"{"status":"error","errorMessage":"already a member of Rec League","errorData":{"kind":"conflict"}}"#,
    );
    let mut backend = RemoteBackend::new(&url, Some("token".to_string()));
    let err = backend
        .join_league_by_invite_code("ABCD2345", "bob")
        .expect_err("server rejects the join");
    assert_eq!(server.join().expect("server thread"), "/api/mutation");

    match err.downcast_ref::<BackendError>() {
        Some(BackendError::Conflict(msg)) => assert_eq!(msg, "already a member of Rec League"),
        other => panic!("expected a conflict, got {other:?}"),
    }
}

#[test]
fn unknown_invite_code_maps_from_an_error_status() {
    let (url, server) = serve_once(
        "404 Not Found",
        r#"{"status":"error","errorMessage":"ZZZZ2222","errorData":{"kind":"invalidInviteCode"}}"#,
    );
    let mut backend = RemoteBackend::new(&url, None);
    let err = backend
        .join_league_by_invite_code("ZZZZ2222", "bob")
        .expect_err("unknown code");
    server.join().expect("server thread");
    assert!(matches!(
        err.downcast_ref::<BackendError>(),
        Some(BackendError::InvalidInviteCode(code)) if code == "ZZZZ2222"
    ));
}

#[test]
fn error_status_without_an_envelope_is_a_remote_error() {
    let (url, server) = serve_once("502 Bad Gateway", "upstream unavailable");
    let backend = RemoteBackend::new(&url, None);
    let err = backend.list_leagues("alice").expect_err("bad gateway");
    assert_eq!(server.join().expect("server thread"), "/api/query");

    match err.downcast_ref::<BackendError>() {
        Some(BackendError::Remote(msg)) => {
            assert!(msg.contains("502"), "{msg}");
            assert!(msg.contains("upstream unavailable"), "{msg}");
        }
        other => panic!("expected a remote error, got {other:?}"),
    }
}

#[test]
fn successful_reply_decodes_the_value() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"status":"success","value":"QRST6789"}"#,
    );
    let mut backend = RemoteBackend::new(&url, None);
    let code = backend.regenerate_invite_code(3).expect("new code");
    server.join().expect("server thread");
    assert_eq!(code, "QRST6789");
}
