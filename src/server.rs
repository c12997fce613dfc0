use crate::agent::EmailAgent;
use crate::config::Config;
use crate::protocol;
use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode, header};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "email-ethan-agent";

pub struct AppState {
    pub agent: EmailAgent,
    pub config: Config,
}

pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = state
        .config
        .bind_addr()
        .parse()
        .with_context(|| format!("Invalid bind address {}", state.config.bind_addr()))?;

    let make_svc = make_service_fn(move |_conn| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let state = state.clone();
                async move { Ok::<_, Infallible>(route(&state, req).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind {}", addr))?
        .serve(make_svc);
    tracing::info!(%addr, "listening");

    server
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}

pub async fn route(state: &AppState, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    tracing::debug!(%method, %path, "request");

    match (method, path.as_str()) {
        (Method::POST, "/") | (Method::POST, "/a2a") => rpc(state, req).await,
        (Method::GET, "/") => json_response(
            StatusCode::OK,
            &json!({
                "message": format!("{} API is running!", state.config.agent.name),
                "status": "healthy",
                "version": state.config.agent.version,
            }),
        ),
        (Method::GET, "/health") => json_response(
            StatusCode::OK,
            &json!({
                "status": "healthy",
                "service": SERVICE_NAME,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }),
        ),
        (Method::GET, "/.well-known/agent.json") => {
            json_response(StatusCode::OK, &agent_card(&state.config))
        }
        _ => json_response(StatusCode::NOT_FOUND, &json!({ "error": "not found" })),
    }
}

async fn rpc(state: &AppState, req: Request<Body>) -> Response<Body> {
    let response = match hyper::body::to_bytes(req.into_body()).await {
        Ok(body) => protocol::handle_rpc(&state.agent, &body).await,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request body");
            protocol::internal_error(Value::Null, e.to_string())
        }
    };

    match serde_json::to_value(&response) {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response");
            let fallback = protocol::internal_error(response.id.clone(), e.to_string());
            json_response(
                StatusCode::OK,
                &serde_json::to_value(fallback).unwrap_or(Value::Null),
            )
        }
    }
}

pub fn agent_card(config: &Config) -> Value {
    let agent = &config.agent;
    json!({
        "name": agent.name,
        "description": agent.description,
        "url": config.server.public_url,
        "version": agent.version,
        "provider": {
            "organization": agent.organization,
            "url": agent.organization_url,
        },
        "capabilities": {
            "streaming": false,
            "pushNotifications": false,
        },
        "defaultInputModes": ["text/plain"],
        "defaultOutputModes": ["text/plain", "application/json"],
        "skills": [
            {
                "id": "check-emails",
                "name": "Check emails",
                "description": "Counts unread emails and flags urgent ones",
                "examples": ["Check my emails", "Show my last 5 emails"],
            },
            {
                "id": "summarize-emails",
                "name": "Summarize emails",
                "description": "Pulls key points out of recent unread emails",
                "examples": ["Summarize my inbox"],
            },
            {
                "id": "categorize-emails",
                "name": "Categorize emails",
                "description": "Groups unread emails by urgency",
                "examples": ["Categorize my emails"],
            },
        ],
    })
}

fn json_response(status: StatusCode, body: &Value) -> Response<Body> {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::source::FallbackSource;

    fn state() -> AppState {
        AppState {
            agent: EmailAgent::new(Arc::new(FallbackSource::sample_only()), Limits::default()),
            config: Config::default(),
        }
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(path: &str) -> Request<Body> {
        Request::get(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = route(&state(), get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], SERVICE_NAME);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_agent_card() {
        let response = route(&state(), get("/.well-known/agent.json")).await;
        let body = body_json(response).await;
        assert_eq!(body["name"], "Email Ethan");
        assert_eq!(body["url"], "http://localhost:8000");
        assert_eq!(body["provider"]["organization"], "Holladworld");
        assert_eq!(body["skills"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = route(&state(), get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rpc_over_http() {
        let request = Request::post("/a2a")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "jsonrpc": "2.0",
                    "id": "req-1",
                    "params": {"message": {"parts": [
                        {"kind": "text", "text": "categorize my emails"}
                    ]}}
                })
                .to_string(),
            ))
            .unwrap();

        let response = route(&state(), request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["id"], "req-1");
        assert_eq!(body["result"]["artifacts"][0]["name"], "categorizedEmails");
    }

    #[tokio::test]
    async fn test_rpc_protocol_error_is_http_200() {
        let request = Request::post("/")
            .body(Body::from(r#"{"jsonrpc":"2.0","params":{}}"#))
            .unwrap();
        let response = route(&state(), request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32600);
    }
}
