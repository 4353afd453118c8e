//! Read-modify-write with `If-Match`, retrying when another writer wins

use anyhow::Result;
use orchestrate_sdk::{ClientBuilder, Document, Error};
use serde::{Deserialize, Serialize};

const COLLECTION: &str = "example-counters";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Counter {
    hits: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    dotenv::dotenv().ok();

    let client = ClientBuilder::from_env()?.build()?;

    // Create the counter once; a 412 means it is already there
    match client
        .put_if_none_match(COLLECTION, "page-views", &Counter::default())
        .await
    {
        Ok(_) => println!("Counter created"),
        Err(Error::PreconditionFailed { .. }) => println!("Counter already exists"),
        Err(e) => return Err(e.into()),
    }

    for attempt in 1.. {
        let current: Document<Counter> = client.get(COLLECTION, "page-views").await?;
        let next = Counter {
            hits: current.value.hits + 1,
        };

        match client
            .put_if_match(COLLECTION, "page-views", &next, &current.path.reference)
            .await
        {
            Ok(written) => {
                println!(
                    "Incremented to {} on attempt {} (ref {})",
                    next.hits, attempt, written.path.reference
                );
                break;
            }
            Err(e) if e.is_precondition_failed() => {
                println!("Lost the race on attempt {}, re-reading", attempt);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
