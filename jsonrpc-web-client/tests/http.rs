//! End-to-end calls through `HyperTransport` against an in-process server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use jsonrpc_web_client::{
    CallOptions, ClientError, Code, HeaderInterceptor, JsonRpcClient, RequestError, Response,
};
use serde_json::{Value, json};

async fn rpc(
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Result<Json<Value>, (StatusCode, &'static str)> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();
    if query.get("method").map(String::as_str) != Some(method) {
        return Err((StatusCode::BAD_REQUEST, "method marker missing"));
    }

    let reply = match method {
        "math.add" => {
            let sum: i64 = request["params"]
                .as_array()
                .map(|items| items.iter().filter_map(Value::as_i64).sum())
                .unwrap_or_default();
            json!({"jsonrpc": "2.0", "id": id, "result": sum})
        }
        "whoami" => {
            let token = headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("anonymous");
            json!({"jsonrpc": "2.0", "id": id, "result": token})
        }
        "sleep" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            json!({"jsonrpc": "2.0", "id": id, "result": null})
        }
        "broken" => return Err((StatusCode::INTERNAL_SERVER_ERROR, "boom")),
        _ => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32601, "message": "Method not found"}
        }),
    };
    Ok(Json(reply))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

async fn serve() -> SocketAddr {
    init_tracing();
    let app = Router::new().route("/rpc", post(rpc));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn request_error(err: ClientError) -> RequestError {
    match err {
        ClientError::Request(err) => *err,
        other => panic!("expected a request failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_round_trip_over_http() {
    let addr = serve().await;
    let client = JsonRpcClient::new(format!("http://{}/rpc", addr)).unwrap();

    let sum: i64 = client.request("math.add", json!([40, 2])).await.unwrap();
    assert_eq!(sum, 42);
}

#[tokio::test]
async fn test_header_interceptor_over_http() {
    let addr = serve().await;
    let client = JsonRpcClient::builder(format!("http://{}/rpc", addr))
        .with_interceptor(HeaderInterceptor::new("authorization", "Bearer token123"))
        .build()
        .unwrap();

    let who: String = client.request("whoami", ()).await.unwrap();
    assert_eq!(who, "Bearer token123");
}

#[tokio::test]
async fn test_peer_error_over_http() {
    let addr = serve().await;
    let client = JsonRpcClient::new(format!("http://{}/rpc", addr)).unwrap();

    let err = request_error(client.request::<_, Value>("nope", json!({})).await.unwrap_err());
    assert_eq!(err.code(), Code::Rpc(-32601));
    assert_eq!(err.message(), "Method not found");
}

#[tokio::test]
async fn test_server_status_over_http() {
    let addr = serve().await;
    let client = JsonRpcClient::new(format!("http://{}/rpc", addr)).unwrap();

    let err = request_error(client.request::<_, Value>("broken", json!({})).await.unwrap_err());
    assert_eq!(err.code(), Code::Status(500));
    assert_eq!(err.message(), "Internal Server Error");
}

#[tokio::test]
async fn test_timeout_over_http() {
    let addr = serve().await;
    let client = JsonRpcClient::new(format!("http://{}/rpc", addr)).unwrap();

    let options = CallOptions::new().timeout(Duration::from_millis(50));
    let err = request_error(
        client
            .request_with_options::<_, Value>("sleep", json!({}), options)
            .await
            .unwrap_err(),
    );
    assert_eq!(err.code(), Code::Timeout);
}

#[tokio::test]
async fn test_retry_returns_envelope_over_http() {
    let addr = serve().await;
    let client = JsonRpcClient::new(format!("http://{}/rpc", addr)).unwrap();

    let request = jsonrpc_web_client::Request::new("math.add", 11).with_params(json!([1, 2]));
    let envelope: Response = client.retry(request).await.unwrap();
    assert_eq!(envelope.result, Some(json!(3)));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = JsonRpcClient::builder(format!("http://{}/rpc", addr))
        .network_error_message("server unreachable")
        .build()
        .unwrap();

    let err = request_error(client.request::<_, Value>("math.add", json!([1])).await.unwrap_err());
    assert_eq!(err.code(), Code::Network);
    assert_eq!(err.message(), "server unreachable");
}
