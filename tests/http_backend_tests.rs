use std::thread;
use std::time::Duration;

use dtf_ui::client::{ApiRequest, Backend, HttpBackend, Method};
use dtf_ui::error::ClientError;
use serde_json::json;
use tiny_http::{Header, Response, Server};

/// What the loopback server saw of one request.
#[derive(Debug)]
struct Captured {
    method: String,
    url: String,
    csrf: Option<String>,
    content_type: Option<String>,
    body: String,
}

/// Serve exactly one request with `status` and `body`, returning the base
/// URL and a handle yielding the captured request.
fn serve_once(status: u16, body: &'static str) -> (String, thread::JoinHandle<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let header = |name: &'static str| {
            request
                .headers()
                .iter()
                .find(|h| h.field.equiv(name))
                .map(|h| h.value.as_str().to_string())
        };
        let csrf = header("X-CSRFToken");
        let content_type = header("Content-Type");
        let method = request.method().to_string();
        let url = request.url().to_string();

        let mut received = String::new();
        request.as_reader().read_to_string(&mut received).unwrap();

        let response = Response::from_string(body)
            .with_status_code(status)
            .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
        request.respond(response).unwrap();

        Captured {
            method,
            url,
            csrf,
            content_type,
            body: received,
        }
    });

    (format!("http://{addr}"), handle)
}

fn backend(base_url: &str, token: Option<&str>) -> HttpBackend {
    HttpBackend::new(base_url, token.map(str::to_string), Duration::from_secs(5))
}

#[test]
fn form_post_carries_csrf_and_encoded_fields() {
    let (base, handle) = serve_once(200, r#"{"result": "valid"}"#);

    let body = backend(&base, Some("tok3n"))
        .send(&ApiRequest::post_form(
            "/demo/settings",
            vec![
                ("name".into(), "a b".into()),
                ("scope".into(), "property".into()),
            ],
        ))
        .unwrap();
    assert_eq!(body["result"], "valid");

    let seen = handle.join().unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.url, "/demo/settings");
    assert_eq!(seen.csrf.as_deref(), Some("tok3n"));
    assert_eq!(
        seen.content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(seen.body, "name=a+b&scope=property");
}

#[test]
fn json_request_sets_utf8_content_type() {
    let (base, handle) = serve_once(200, r#"{"id": 4}"#);

    let body = backend(&base, Some("tok3n"))
        .send(&ApiRequest::json(
            Method::Patch,
            "/api/projects/demo/references/1/tests/2",
            json!({"test_name": "smoke"}),
        ))
        .unwrap();
    assert_eq!(body["id"], 4);

    let seen = handle.join().unwrap();
    assert_eq!(seen.method, "PATCH");
    assert_eq!(
        seen.content_type.as_deref(),
        Some("application/json; charset=utf-8")
    );
    let sent: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(sent, json!({"test_name": "smoke"}));
}

#[test]
fn delete_with_empty_body_decodes_to_null() {
    let (base, handle) = serve_once(204, "");

    let body = backend(&base, None)
        .send(&ApiRequest::delete("/api/projects/demo/properties/3"))
        .unwrap();
    assert!(body.is_null());

    let seen = handle.join().unwrap();
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.csrf, None);
}

#[test]
fn error_status_maps_to_status_error() {
    let (base, handle) = serve_once(403, r#"{"detail": "CSRF failed"}"#);

    let err = backend(&base, None)
        .send(&ApiRequest::get("/api/projects/demo/properties/3"))
        .unwrap_err();
    handle.join().unwrap();

    match err {
        ClientError::Status { code, body, url } => {
            assert_eq!(code, 403);
            assert!(body.contains("CSRF failed"));
            assert!(url.ends_with("/api/projects/demo/properties/3"));
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[test]
fn non_json_body_is_a_decode_error() {
    let (base, handle) = serve_once(200, "<html>login</html>");

    let err = backend(&base, None)
        .send(&ApiRequest::get("/demo/settings"))
        .unwrap_err();
    handle.join().unwrap();

    assert!(matches!(err, ClientError::Decode { .. }));
}

#[test]
fn unreachable_host_is_a_transport_error() {
    // Bind then drop a listener so the port is known to be closed.
    let port = {
        let server = Server::http("127.0.0.1:0").unwrap();
        server.server_addr().to_ip().unwrap().port()
    };

    let err = backend(&format!("http://127.0.0.1:{port}"), None)
        .send(&ApiRequest::get("/"))
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
}
