//! Basic usage example for the HTTP task client
//!
//! Run this example with:
//! ```
//! # Terminal 1: Start the bridge
//! MONGO_PUBLIC_URL=mongodb://localhost:27017/e2e cargo run -p taskbridge-server -- serve
//!
//! # Terminal 2: Run the example
//! cargo run -p taskbridge-client --example basic_usage
//! ```

use serde_json::json;
use taskbridge_client::{HttpTaskClient, MongoCommands, TaskOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Task Bridge Client Example ===\n");

    let client = HttpTaskClient::new("http://127.0.0.1:3004")?;

    println!("1. Clearing test_users...");
    let cleared = client.clear_mongo_collection("test_users").await?;
    println!("   {}\n", cleared);

    println!("2. Inserting a user...");
    let inserted = client
        .insert_in_mongo(
            "test_users",
            json!({ "name": "Test User", "email": "test@example.com", "age": 30 }),
        )
        .await?;
    println!("   insertedId = {}\n", inserted["insertedId"]);

    println!("3. Updating the user...");
    let updated = client
        .update_in_mongo(
            "test_users",
            json!({ "email": "test@example.com" }),
            json!({ "$set": { "age": 31 } }),
        )
        .await?;
    println!("   modifiedCount = {}\n", updated["modifiedCount"]);

    println!("4. Finding users older than 30...");
    let found = client
        .find_in_mongo("test_users", Some(json!({ "age": { "$gt": 30 } })), None)
        .await?;
    println!("   {}\n", serde_json::to_string_pretty(&found)?);

    println!("5. A rejected update comes back as a value...");
    let rejected = client
        .update_in_mongo("test_users", json!({}), json!({ "age": 1 }))
        .await?;
    if let Some(message) = TaskOutcome::from_value(rejected).error() {
        println!("   error: {}\n", message);
    }

    println!("6. Deleting the user...");
    let deleted = client
        .delete_from_mongo("test_users", json!({ "email": "test@example.com" }))
        .await?;
    println!("   deletedCount = {}\n", deleted["deletedCount"]);

    println!("=== Example Complete ===");
    Ok(())
}
