//! Async example: one externally owned session shared by concurrent calls.
//!
//! Run with: `cargo run --example async_session`

use restpath::{Client, RequestOptions};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("restpath=debug,async_session=info")
        .init();

    // The session belongs to this function; clients only borrow it.
    let session = Arc::new(reqwest::Client::new());

    let client = Client::builder()
        .host("https://jsonplaceholder.typicode.com")?
        .timeout(Duration::from_secs(10))
        .build_async()?;
    client.attach_session(session.clone())?;

    let users = client.path("users");
    let first = users.segment(1);
    let second = users.segment(2);

    let (one, two) = tokio::join!(
        first.get(RequestOptions::default()),
        second.get(RequestOptions::default()),
    );
    println!("User 1: {}", one?.to_json::<serde_json::Value>()?["name"]);
    println!("User 2: {}", two?.to_json::<serde_json::Value>()?["name"]);

    // Snapshots leave the session behind; attach it again after restoring.
    let saved = serde_json::to_string(&first.snapshot())?;
    println!("Saved client: {}", saved);

    let restored = serde_json::from_str::<restpath::ClientSnapshot>(&saved)?
        .into_builder()?
        .build_async()?;
    restored.attach_session(session.clone())?;
    let response = restored.path("todos").get(RequestOptions::default()).await?;
    println!("User 1 todos: {} bytes", response.body.len());

    Ok(())
}
