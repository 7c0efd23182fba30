//! Blocking example: build paths off one root client and call them.
//!
//! Run with: `cargo run --example basic_call`

use restpath::{Client, Error, HttpErrorKind, RequestOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("restpath=debug,basic_call=info")
        .init();

    let client = Client::builder()
        .host("https://jsonplaceholder.typicode.com")?
        .timeout(Duration::from_secs(10))
        .build()?;
    let posts = client.path("posts");

    println!("=== GET /posts/1 ===");
    let response = posts.segment(1).get(RequestOptions::default())?;
    let post: Post = response.to_json()?;
    println!("Post ID: {}", post.id);
    println!("Title: {}", post.title);
    println!("Status code: {}", response.status_code);
    println!();

    println!("=== GET /posts?userId=1 ===");
    let response = posts.get(RequestOptions::new().query("userId", "1"))?;
    let list: Vec<Post> = response.to_json()?;
    println!("User 1 has {} posts", list.len());
    println!();

    println!("=== POST /posts ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };
    let response = posts.post(RequestOptions::new().json(&new_post)?)?;
    println!("Created: {}", response.body);
    println!("Content-Type: {:?}", response.header("content-type"));
    println!();

    println!("=== GET /posts/does-not-exist ===");
    match posts.segment("does-not-exist").get(RequestOptions::default()) {
        Err(Error::Http(err)) if err.kind == HttpErrorKind::NotFound => {
            println!("Not found, as expected (status {})", err.status_code);
        }
        Err(e) => return Err(e.into()),
        Ok(response) => println!("Unexpected success: {}", response.body),
    }

    Ok(())
}
