//! End-to-end tests of `FnsClient` over the reqwest transport against an
//! in-process axum server that records every request it receives.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use chrono::{TimeZone, Utc};
use fns_client::{ClientConfig, FnsClient, FnsError, RequestContext};
use fns_core::parse_qr;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

const QR: &str = "t=20200115T2110&s=1030.00&fn=9251440300046840&i=29414&fp=1250830908&n=1";

const RECEIPT_BODY: &str = r#"{"document":{"receipt":{
    "fiscalDocumentNumber":29414,"fiscalDriveNumber":"9251440300046840","fiscalSign":1250830908,
    "operator":"Иванова","operationType":1,"receiptCode":3,"requestNumber":160,"shiftNumber":82,
    "retailPlaceAddress":"Москва","taxationType":1,"kktRegId":"0001434561033252",
    "userInn":"7703270067","user":"ООО Ромашка","protocolVersion":2,
    "cashTotalSum":0,"ecashTotalSum":103000,"totalSum":103000,"nds18":17166,
    "dateTime":"2020-01-15T21:10:00",
    "items":[
        {"name":"Ролик","quantity":1,"ndsRate":1,"ndsSum":10450,"sum":62700,"price":62700},
        {"name":"Кабель","quantity":1,"ndsRate":1,"ndsSum":3358,"sum":20150,"price":20150},
        {"name":"Кабель","quantity":1,"ndsRate":1,"ndsSum":3358,"sum":20150,"price":20150}
    ]
}}}"#;

/// What the server saw for one request.
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

struct ServerState {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
    requests: Mutex<Vec<Recorded>>,
}

async fn record(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let query = url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
        .into_owned()
        .collect();

    state.requests.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    });

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    (state.status, state.body.clone())
}

/// Serves one canned response on an ephemeral port.
async fn spawn_server(
    status: StatusCode,
    body: &str,
    delay: Option<Duration>,
) -> (FnsClient, Arc<ServerState>) {
    let state = Arc::new(ServerState {
        status,
        body: body.to_string(),
        delay,
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new().fallback(record).with_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    let config = ClientConfig::with_base_url(format!("http://{}", addr));
    let client = FnsClient::from_config(&config).unwrap();
    (client, state)
}

fn only_request(state: &ServerState) -> Recorded {
    let requests = state.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    requests[0].clone()
}

#[tokio::test]
async fn test_register_sends_signup_json() {
    let (client, state) = spawn_server(StatusCode::NO_CONTENT, "", None).await;

    client
        .register(&RequestContext::new(), "user@mail.ru", "Иван", "+79991234567")
        .await
        .unwrap();

    let request = only_request(&state);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/v1/mobile/users/signup");
    assert_eq!(
        request.header("content-type"),
        Some("application/json; charset=UTF-8")
    );

    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["email"], "user@mail.ru");
    assert_eq!(body["name"], "Иван");
    assert_eq!(body["phone"], "+79991234567");
}

#[tokio::test]
async fn test_register_maps_rejections() {
    let (client, _) = spawn_server(StatusCode::CONFLICT, "", None).await;
    let err = client
        .register(&RequestContext::new(), "user@mail.ru", "Ivan", "+79991234567")
        .await
        .unwrap_err();
    assert!(matches!(err, FnsError::UserAlreadyRegistered));

    let (client, _) = spawn_server(StatusCode::BAD_REQUEST, r#"{"error":"bad_phone"}"#, None).await;
    let err = client
        .register(&RequestContext::new(), "user@mail.ru", "Ivan", "42")
        .await
        .unwrap_err();
    assert!(matches!(err, FnsError::BadPhone));
}

#[tokio::test]
async fn test_check_receipt_path_and_query() {
    let (client, state) = spawn_server(StatusCode::NO_CONTENT, "", None).await;

    client
        .check_receipt(
            &RequestContext::new(),
            "9251440300046840",
            1,
            29414,
            1250830908,
            Utc.with_ymd_and_hms(2020, 1, 15, 21, 10, 0).unwrap(),
            1030.0,
        )
        .await
        .unwrap();

    let request = only_request(&state);
    assert_eq!(request.method, Method::GET);
    assert_eq!(
        request.path,
        "/v1/ofds/*/inns/*/fss/9251440300046840/operations/1/tickets/29414"
    );
    assert_eq!(request.query["fiscalSign"], "1250830908");
    assert_eq!(request.query["date"], "2020-01-15T21:10:00");
    assert_eq!(request.query["sum"], "103000");
    assert!(request.header("authorization").is_none());
}

#[tokio::test]
async fn test_check_receipt_rejects_non_204() {
    let (client, _) = spawn_server(StatusCode::NOT_ACCEPTABLE, "", None).await;
    let qr = parse_qr(QR).unwrap();

    let err = client.check_qr(&RequestContext::new(), &qr).await.unwrap_err();
    assert_eq!(err.to_string(), "unexpected code 406");
}

#[tokio::test]
async fn test_get_receipt_auth_headers_and_projection() {
    let (client, state) = spawn_server(StatusCode::OK, RECEIPT_BODY, None).await;
    let qr = parse_qr(QR).unwrap();

    let receipt = client
        .get_receipt_for_qr(&RequestContext::new(), "+79991234567", "123456", &qr)
        .await
        .unwrap();

    let request = only_request(&state);
    assert_eq!(request.path, "/v1/inns/*/kkts/*/fss/9251440300046840/tickets/29414");
    assert_eq!(request.query["fiscalSign"], "1250830908");
    assert_eq!(request.query["sendToEmail"], "no");
    assert_eq!(request.header("device-id"), Some(""));
    assert_eq!(request.header("device-os"), Some(""));
    assert_eq!(
        request.header("authorization"),
        Some("Basic Kzc5OTkxMjM0NTY3OjEyMzQ1Ng==")
    );

    assert_eq!(receipt.fiscal_drive_number, "9251440300046840");
    assert_eq!(receipt.code, 3);
    assert_eq!(receipt.kkt_reg_id, "0001434561033252");
    assert_eq!(receipt.total_sum, 1030.0);
    assert_eq!(receipt.cash_total_sum, 0.0);
    assert_eq!(receipt.date_time, qr.date_time);
    assert_eq!(receipt.items.len(), 3);
    assert_eq!(receipt.items[0].name, "Ролик");
    assert_eq!(receipt.items[1].sum, 201.5);
}

#[tokio::test]
async fn test_get_receipt_forbidden_is_status_error() {
    let (client, _) = spawn_server(StatusCode::FORBIDDEN, "not even json", None).await;
    let qr = parse_qr(QR).unwrap();

    let err = client
        .get_receipt_for_qr(&RequestContext::new(), "+79991234567", "wrong", &qr)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(!err.is_decoding());
}

#[tokio::test]
async fn test_get_receipt_malformed_body() {
    let (client, _) = spawn_server(StatusCode::OK, "<html>maintenance</html>", None).await;
    let qr = parse_qr(QR).unwrap();

    let err = client
        .get_receipt_for_qr(&RequestContext::new(), "+79991234567", "123456", &qr)
        .await
        .unwrap_err();
    assert!(err.is_decoding());
}

#[tokio::test]
async fn test_slow_server_hits_context_timeout() {
    let (client, _) = spawn_server(StatusCode::NO_CONTENT, "", Some(Duration::from_secs(5))).await;
    let qr = parse_qr(QR).unwrap();
    let ctx = RequestContext::new().with_timeout(Duration::from_millis(100));

    let err = client.check_qr(&ctx, &qr).await.unwrap_err();
    assert!(err.is_transport());
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::with_base_url(format!("http://{}", addr));
    let client = FnsClient::from_config(&config).unwrap();
    let qr = parse_qr(QR).unwrap();

    let err = client.check_qr(&RequestContext::new(), &qr).await.unwrap_err();
    assert!(err.is_transport());
    assert!(
        err.to_string().to_lowercase().contains("refused"),
        "cause missing from {}",
        err
    );
}
