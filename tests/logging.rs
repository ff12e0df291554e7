// Runs in its own process: the global tracing dispatcher must be untouched.

use serde_json::json;

#[tokio::test]
async fn create_publisher_leaves_the_subscriber_to_the_application() {
    let options = json!({ "credentials": "not-json", "debug": true });
    let result = pubsub_adapter::create_publisher(options.as_object().unwrap()).await;

    assert!(result.is_err());
    assert!(!tracing::dispatcher::has_been_set());
}
