//! Integration tests for the reqwest exchange.
//!
//! Each test serves an axum router on a loopback port. The router answers
//! every request with a canned reply and records what it received.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use fetch::{
    BinaryCall, BinaryParams, FetchClient, HttpMethod, JsonCall, JsonParams, RemoteCall,
    ResultState,
};
use http_exchange::{ExchangeConfig, ReqwestExchange};
use hyper::ext::ReasonPhrase;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Token {
    token: String,
}

#[derive(Clone, PartialEq, prost::Message)]
struct TokenMessage {
    #[prost(string, tag = "1")]
    token: String,
}

/// One request as the server saw it.
#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

/// The canned reply.
#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    reason: Option<&'static str>,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    fn json(status: u16, body: &[u8]) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            reason: None,
            content_type: "application/json",
            body: body.to_vec(),
        }
    }

    fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }
}

#[derive(Clone)]
struct Recorder {
    reply: Reply,
    seen: Arc<Mutex<Vec<Captured>>>,
}

async fn record(
    State(recorder): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    recorder.seen.lock().unwrap().push(Captured {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });

    let reply = recorder.reply;
    let mut response = (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response();
    if let Some(reason) = reply.reason {
        response
            .extensions_mut()
            .insert(ReasonPhrase::from_static(reason.as_bytes()));
    }
    response
}

/// Serves `reply` and returns `(base_url, recorded_requests)`.
async fn serve(reply: Reply) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(record).with_state(Recorder {
        reply,
        seen: Arc::clone(&seen),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base, seen)
}

fn only_request(seen: &Arc<Mutex<Vec<Captured>>>) -> Captured {
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "{seen:?}");
    seen[0].clone()
}

fn client() -> FetchClient {
    let exchange = ReqwestExchange::new(&ExchangeConfig::default()).unwrap();
    FetchClient::new(Arc::new(exchange))
}

fn login(base: &str, method: HttpMethod) -> JsonParams<Credentials> {
    JsonParams {
        endpoint: format!("{base}/auth/login"),
        method,
        payload: Credentials {
            username: "a".to_string(),
            password: "b".to_string(),
        },
    }
}

#[tokio::test]
async fn json_post_round_trip() {
    let (base, seen) = serve(Reply::json(200, br#"{"token":"xyz"}"#)).await;
    let call = JsonCall::<Credentials, Token>::new(client());

    let state = call.invoke(&login(&base, HttpMethod::Post)).await;

    assert_eq!(
        state,
        ResultState::success(Token {
            token: "xyz".to_string()
        })
    );
    let request = only_request(&seen);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/auth/login");
    assert_eq!(request.headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(request.headers[header::ACCEPT], "application/json");
    assert!(request.headers.contains_key("x-request-id"));
    assert_eq!(&request.body[..], br#"{"username":"a","password":"b"}"#);
}

#[tokio::test]
async fn json_unauthorized_is_rejected_with_reason() {
    let (base, _seen) = serve(Reply::json(401, b"{}")).await;
    let call = JsonCall::<Credentials, Token>::new(client());

    let state = call.invoke(&login(&base, HttpMethod::Post)).await;

    assert_eq!(state, ResultState::failure("Error: Unauthorized"));
}

#[tokio::test]
async fn rejection_reports_the_reason_phrase_the_server_sent() {
    let (base, _seen) = serve(Reply::json(401, b"{}").with_reason("Token Expired")).await;
    let call = JsonCall::<Credentials, Token>::new(client());

    let state = call.invoke(&login(&base, HttpMethod::Post)).await;

    assert_eq!(state, ResultState::failure("Error: Token Expired"));
}

#[tokio::test]
async fn unregistered_status_keeps_its_reason_phrase() {
    let (base, _seen) = serve(Reply::json(499, b"{}").with_reason("Client Closed Request")).await;
    let call = JsonCall::<Credentials, Token>::new(client());

    let state = call.invoke(&login(&base, HttpMethod::Post)).await;

    assert_eq!(state, ResultState::failure("Error: Client Closed Request"));
}

#[tokio::test]
async fn get_sends_no_body() {
    let (base, seen) = serve(Reply::json(200, br#"{"token":"xyz"}"#)).await;
    let call = JsonCall::<Credentials, Token>::new(client());

    let state = call.invoke(&login(&base, HttpMethod::Get)).await;

    assert!(state.is_success());
    let request = only_request(&seen);
    assert_eq!(request.method, Method::GET);
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn binary_post_decodes_response_bytes() {
    let reply = Reply {
        status: StatusCode::OK,
        reason: None,
        content_type: "application/x-protobuf",
        body: prost::Message::encode_to_vec(&TokenMessage {
            token: "xyz".to_string(),
        }),
    };
    let (base, seen) = serve(reply).await;
    let call = BinaryCall::<TokenMessage, TokenMessage>::new(client());
    let params = BinaryParams {
        endpoint: format!("{base}/auth/login"),
        payload: TokenMessage {
            token: "request".to_string(),
        },
    };

    let state = call.invoke(&params).await;

    assert_eq!(
        state,
        ResultState::success(TokenMessage {
            token: "xyz".to_string()
        })
    );
    let request = only_request(&seen);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.headers[header::CONTENT_TYPE], "application/x-protobuf");
    let sent: TokenMessage = prost::Message::decode(request.body).unwrap();
    assert_eq!(sent.token, "request");
}

#[tokio::test]
async fn unreachable_endpoint_is_an_unknown_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let call = JsonCall::<Credentials, Token>::new(client());

    let state = call
        .invoke(&login(&format!("http://{addr}"), HttpMethod::Post))
        .await;

    assert_eq!(state.data, None);
    let message = state.error.unwrap();
    assert!(!message.is_empty());
    assert!(!message.starts_with("Error: "), "{message}");
}
