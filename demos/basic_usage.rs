//! Basic usage example for the Orchestrate SDK

use orchestrate_sdk::{Client, ClientBuilder, Document, ListOpts, ListResult, SearchResult};
use serde::{Deserialize, Serialize};

const COLLECTION: &str = "example-users";

#[derive(Debug, Serialize, Deserialize)]
struct User {
    name: String,
    email: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = create_client()?;

    // Example 1: Create a collection
    println!("=== Example 1: Create a collection ===");
    create_example(&client).await?;

    // Example 2: Read a document
    println!("\n=== Example 2: Read a document ===");
    get_example(&client).await?;

    // Example 3: List and search
    println!("\n=== Example 3: List and search ===");
    list_search_example(&client).await?;

    // Example 4: Clean up
    println!("\n=== Example 4: Clean up ===");
    let result = client.delete_collection(COLLECTION).await?;
    println!("Collection deleted: {}", result.deleted);

    Ok(())
}

fn create_client() -> Result<Client, Box<dyn std::error::Error>> {
    // Falls back to a placeholder key so the example still builds a client
    let builder = ClientBuilder::from_env()
        .unwrap_or_else(|_| ClientBuilder::new().api_key("demo-api-key"));

    Ok(builder.user_agent_extra("examples/1.0").build()?)
}

async fn create_example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    let alice = User {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    };
    let result = client.create_collection(COLLECTION, "alice", &alice).await?;
    println!("Created {}/{} at ref {}", result.path.collection, result.path.key, result.path.reference);

    let bob = User {
        name: "Bob".to_string(),
        email: "bob@example.com".to_string(),
    };
    let result = client.put(COLLECTION, "bob", &bob).await?;
    println!("Stored bob at ref {}", result.path.reference);

    Ok(())
}

async fn get_example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    let doc: Document<User> = client.get(COLLECTION, "alice").await?;
    println!("{} <{}> (ref {})", doc.value.name, doc.value.email, doc.path.reference);

    match client.get::<User>(COLLECTION, "carol").await {
        Ok(_) => println!("carol exists"),
        Err(e) if e.is_not_found() => println!("carol does not exist"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

async fn list_search_example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    let page: ListResult<User> = client.list(COLLECTION, ListOpts::new(10)).await?;
    println!("Listed {} users:", page.count);
    for doc in &page.results {
        println!("  - {}: {}", doc.path.key, doc.value.name);
    }

    let hits: SearchResult<User> = client.search(COLLECTION, "name:Bob", 10, 0).await?;
    println!("Search matched {} of {}", hits.count, hits.total_count);

    Ok(())
}
