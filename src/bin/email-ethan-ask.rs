use anyhow::Context;
use hyper::{Body, Client, Request, header};
use serde_json::{Value, json};
use std::env;

const DEFAULT_URL: &str = "http://localhost:8000/";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <message> [server_url]", args[0]);
        eprintln!("Sends one message to a running email-ethan server and prints the reply.");
        std::process::exit(1);
    }

    let text = &args[1];
    let url = args.get(2).map(String::as_str).unwrap_or(DEFAULT_URL);

    let payload = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "message/send",
        "params": {
            "message": {
                "kind": "message",
                "role": "user",
                "parts": [{"kind": "text", "text": text}]
            }
        }
    });

    let request = Request::post(url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .context("Failed to build request")?;

    let response = Client::new()
        .request(request)
        .await
        .with_context(|| format!("Failed to reach {}", url))?;
    let bytes = hyper::body::to_bytes(response.into_body())
        .await
        .context("Failed to read response")?;
    let reply: Value = serde_json::from_slice(&bytes).context("Server did not return JSON")?;

    if let Some(error) = reply.get("error") {
        eprintln!(
            "Error {}: {}",
            error["code"],
            error["message"].as_str().unwrap_or("unknown")
        );
        if let Some(details) = error["data"]["details"].as_str() {
            eprintln!("{}", details);
        }
        std::process::exit(2);
    }

    let result = &reply["result"];
    println!(
        "{}",
        result["status"]["message"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("(no text)")
    );
    println!(
        "--------------------------------------------------------------------------------"
    );
    println!("Task:    {}", result["id"].as_str().unwrap_or("?"));
    println!("Context: {}", result["contextId"].as_str().unwrap_or("?"));
    println!("State:   {}", result["status"]["state"].as_str().unwrap_or("?"));
    if let Some(artifacts) = result["artifacts"].as_array() {
        for artifact in artifacts {
            println!("Artifact: {}", artifact["name"].as_str().unwrap_or("?"));
        }
    }

    Ok(())
}
