//! End-to-end scenarios for the command aliases.
//!
//! These tests require a MongoDB server to be running.
//! Set MONGO_PUBLIC_URL (defaults to mongodb://localhost:27017) and run with:
//!   cargo test -p taskbridge-client -- --ignored
//!
//! Each scenario uses its own database so scenarios can run in parallel.

use serde_json::{json, Value};
use taskbridge_client::{MongoCommands, TaskBridge, TaskOutcome};
use taskbridge_common::BridgeConfig;

const TEST_COLLECTION: &str = "test_users";
const PRODUCTS_COLLECTION: &str = "test_products";

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Bridge against a scenario-private database, with both collections cleared
async fn setup(database: &str) -> Result<TaskBridge, Box<dyn std::error::Error>> {
    let uri = std::env::var("MONGO_PUBLIC_URL")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let bridge = TaskBridge::new(BridgeConfig::new(uri).with_database(database));

    for collection in [TEST_COLLECTION, PRODUCTS_COLLECTION] {
        let cleared = bridge.clear_mongo_collection(collection).await?;
        assert!(
            TaskOutcome::from_value(cleared.clone()).is_success(),
            "clear failed: {}",
            cleared
        );
    }

    Ok(bridge)
}

fn docs(value: &Value) -> &Vec<Value> {
    value.as_array().unwrap_or_else(|| panic!("expected documents, got {}", value))
}

fn field_values<'a>(docs: &'a [Value], field: &str) -> Vec<&'a str> {
    docs.iter().filter_map(|d| d[field].as_str()).collect()
}

#[tokio::test]
#[ignore] // Only run with --ignored flag when database is available
async fn test_insert_document() -> TestResult {
    let bridge = setup("taskbridge_insert").await?;

    let test_user = json!({
        "name": "Test User",
        "email": "test@example.com",
        "age": 30,
        "active": true,
        "createdAt": { "$date": "2024-05-01T12:00:00Z" }
    });

    let result = bridge.insert_in_mongo(TEST_COLLECTION, test_user).await?;
    assert_eq!(result["acknowledged"], true);
    assert!(!result["insertedId"].is_null());

    let found = bridge
        .find_in_mongo(TEST_COLLECTION, Some(json!({ "email": "test@example.com" })), None)
        .await?;
    let found = docs(&found);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Test User");
    assert_eq!(found[0]["age"], 30);
    assert_eq!(found[0]["active"], true);
    assert_eq!(found[0]["_id"], result["insertedId"]);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_update_document() -> TestResult {
    let bridge = setup("taskbridge_update").await?;

    bridge
        .insert_in_mongo(
            TEST_COLLECTION,
            json!({ "name": "Update Test", "email": "update@example.com", "age": 25 }),
        )
        .await?;
    bridge
        .insert_in_mongo(
            TEST_COLLECTION,
            json!({ "name": "Bystander", "email": "other@example.com", "age": 40 }),
        )
        .await?;

    let update_result = bridge
        .update_in_mongo(
            TEST_COLLECTION,
            json!({ "email": "update@example.com" }),
            json!({ "$set": { "age": 26, "updated": true } }),
        )
        .await?;
    assert_eq!(update_result["acknowledged"], true);
    assert_eq!(update_result["matchedCount"], 1);
    assert_eq!(update_result["modifiedCount"], 1);

    let found = bridge
        .find_in_mongo(TEST_COLLECTION, Some(json!({ "email": "update@example.com" })), None)
        .await?;
    let found = docs(&found);
    assert_eq!(found[0]["age"], 26);
    assert_eq!(found[0]["updated"], true);

    // Non-matching documents are untouched
    let others = bridge
        .find_in_mongo(TEST_COLLECTION, Some(json!({ "email": "other@example.com" })), None)
        .await?;
    let others = docs(&others);
    assert_eq!(others[0]["age"], 40);
    assert!(others[0].get("updated").is_none());

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_delete_document() -> TestResult {
    let bridge = setup("taskbridge_delete").await?;

    for (name, email) in [
        ("User 1", "user1@example.com"),
        ("User 2", "user2@example.com"),
        ("User 3", "user3@example.com"),
    ] {
        bridge
            .insert_in_mongo(TEST_COLLECTION, json!({ "name": name, "email": email }))
            .await?;
    }

    let all = bridge.find_in_mongo(TEST_COLLECTION, None, None).await?;
    assert_eq!(docs(&all).len(), 3);

    let delete_result = bridge
        .delete_from_mongo(TEST_COLLECTION, json!({ "email": "user2@example.com" }))
        .await?;
    assert_eq!(delete_result["acknowledged"], true);
    assert_eq!(delete_result["deletedCount"], 1);

    let remaining = bridge.find_in_mongo(TEST_COLLECTION, None, None).await?;
    let remaining = docs(&remaining);
    assert_eq!(remaining.len(), 2);
    let emails = field_values(remaining, "email");
    assert!(emails.contains(&"user1@example.com"));
    assert!(emails.contains(&"user3@example.com"));
    assert!(!emails.contains(&"user2@example.com"));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_range_operators() -> TestResult {
    let bridge = setup("taskbridge_operators").await?;

    for (name, email, age) in [
        ("Young User", "young@example.com", 18),
        ("Adult User", "adult@example.com", 35),
        ("Senior User", "senior@example.com", 65),
    ] {
        bridge
            .insert_in_mongo(TEST_COLLECTION, json!({ "name": name, "email": email, "age": age }))
            .await?;
    }

    let over_30 = bridge
        .find_in_mongo(TEST_COLLECTION, Some(json!({ "age": { "$gt": 30 } })), None)
        .await?;
    let over_30 = docs(&over_30);
    assert_eq!(over_30.len(), 2);
    let names = field_values(over_30, "name");
    assert!(names.contains(&"Adult User"));
    assert!(names.contains(&"Senior User"));

    let under_20 = bridge
        .find_in_mongo(TEST_COLLECTION, Some(json!({ "age": { "$lt": 20 } })), None)
        .await?;
    let under_20 = docs(&under_20);
    assert_eq!(under_20.len(), 1);
    assert_eq!(under_20[0]["name"], "Young User");

    let between = bridge
        .find_in_mongo(
            TEST_COLLECTION,
            Some(json!({ "age": { "$gte": 18, "$lte": 50 } })),
            None,
        )
        .await?;
    let between = docs(&between);
    assert_eq!(between.len(), 2);
    let names = field_values(between, "name");
    assert!(names.contains(&"Young User"));
    assert!(names.contains(&"Adult User"));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_nested_documents_and_arrays() -> TestResult {
    let bridge = setup("taskbridge_nested").await?;

    let product = json!({
        "name": "Phone",
        "price": 1200,
        "specs": {
            "cpu": "Intel i7",
            "ram": "16GB",
            "storage": { "type": "SSD", "capacity": "512GB" }
        },
        "categories": ["electronics", "computers"]
    });
    bridge.insert_in_mongo(PRODUCTS_COLLECTION, product).await?;

    let by_cpu = bridge
        .find_in_mongo(PRODUCTS_COLLECTION, Some(json!({ "specs.cpu": "Intel i7" })), None)
        .await?;
    let by_cpu = docs(&by_cpu);
    assert_eq!(by_cpu.len(), 1);
    assert_eq!(by_cpu[0]["name"], "Phone");

    let by_storage = bridge
        .find_in_mongo(PRODUCTS_COLLECTION, Some(json!({ "specs.storage.type": "SSD" })), None)
        .await?;
    let by_storage = docs(&by_storage);
    assert_eq!(by_storage.len(), 1);
    assert_eq!(by_storage[0]["specs"]["storage"]["capacity"], "512GB");

    let by_category = bridge
        .find_in_mongo(PRODUCTS_COLLECTION, Some(json!({ "categories": "computers" })), None)
        .await?;
    let by_category = docs(&by_category);
    assert_eq!(by_category.len(), 1);
    assert!(by_category[0]["categories"]
        .as_array()
        .unwrap()
        .contains(&json!("electronics")));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_clear_collection() -> TestResult {
    let bridge = setup("taskbridge_clear").await?;

    for n in 0..4 {
        bridge
            .insert_in_mongo(TEST_COLLECTION, json!({ "n": n }))
            .await?;
    }

    let cleared = bridge.clear_mongo_collection(TEST_COLLECTION).await?;
    assert_eq!(cleared["acknowledged"], true);
    assert_eq!(cleared["deletedCount"], 4);

    let all = bridge.find_in_mongo(TEST_COLLECTION, None, None).await?;
    assert!(docs(&all).is_empty());

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_find_options() -> TestResult {
    let bridge = setup("taskbridge_find_options").await?;

    for (name, age) in [("A", 18), ("B", 35), ("C", 65)] {
        bridge
            .insert_in_mongo(TEST_COLLECTION, json!({ "name": name, "age": age }))
            .await?;
    }

    let found = bridge
        .find_in_mongo(
            TEST_COLLECTION,
            None,
            Some(json!({
                "sort": { "age": -1 },
                "skip": 1,
                "limit": 1,
                "projection": { "_id": 0, "name": 1 }
            })),
        )
        .await?;
    assert_eq!(found, json!([{ "name": "B" }]));

    // Case-insensitive collation changes what matches
    let query = json!({ "name": "a" });
    let exact = bridge.find_in_mongo(TEST_COLLECTION, Some(query.clone()), None).await?;
    assert!(docs(&exact).is_empty());

    let folded = bridge
        .find_in_mongo(
            TEST_COLLECTION,
            Some(query),
            Some(json!({ "collation": { "locale": "en", "strength": 2 } })),
        )
        .await?;
    assert_eq!(docs(&folded).len(), 1);
    assert_eq!(folded[0]["name"], "A");

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_errors_come_back_as_values() -> TestResult {
    let bridge = setup("taskbridge_errors").await?;

    // Replacement-style update is refused
    let result = bridge
        .update_in_mongo(TEST_COLLECTION, json!({}), json!({ "age": 1 }))
        .await?;
    let outcome = TaskOutcome::from_value(result);
    assert!(outcome.error().unwrap().contains("atomic operators"));

    // Server-side failure: unknown query operator
    let result = bridge
        .find_in_mongo(TEST_COLLECTION, Some(json!({ "age": { "$bogus": 1 } })), None)
        .await?;
    assert!(result["error"].as_str().unwrap().starts_with("MongoDB error:"));

    // Duplicate _id
    let doc = json!({ "_id": "fixed-id", "name": "dup" });
    bridge.insert_in_mongo(TEST_COLLECTION, doc.clone()).await?;
    let result = bridge.insert_in_mongo(TEST_COLLECTION, doc).await?;
    assert!(result["error"].as_str().unwrap().contains("E11000"));

    Ok(())
}
