//! Basic example demonstrating simple GET and POST requests.
//!
//! This example shows how to:
//! - Create a facade with default configuration
//! - Make GET requests to fetch data
//! - Make POST requests to create data
//! - Access response data and HTTP details
//!
//! Run with: `cargo run --example basic_call`

use courier::{CallOptions, Error, Facade};
use serde::{Deserialize, Serialize};

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

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing so the default log sink has somewhere to write.
    tracing_subscriber::fmt()
        .with_env_filter("courier=debug,basic_call=info")
        .init();

    let client = Facade::builder().build()?;

    println!("=== GET Request Example ===");
    let response = client
        .get::<Post>(
            "https://jsonplaceholder.typicode.com/posts/1",
            CallOptions::new(),
        )
        .await?;

    println!("Post ID: {}", response.data.id);
    println!("Title: {}", response.data.title);
    println!("Status code: {}", response.status);
    println!("Request latency: {:?}", response.latency);
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };

    let response = client
        .post::<_, Post>(
            "https://jsonplaceholder.typicode.com/posts",
            &new_post,
            CallOptions::new(),
        )
        .await?;

    println!("Created post ID: {}", response.data.id);
    println!("Title: {}", response.data.title);
    println!();

    println!("=== Accessing Response Details ===");
    println!("Raw response length: {} bytes", response.raw_body.len());
    println!("Content-Type: {:?}", response.header("content-type"));

    Ok(())
}
