//! Generic paginated-listing adapter
//!
//! Drives any cursor-paginated backend listing operation to exhaustion and
//! maps each page item through a caller-supplied transform. The adapter makes
//! no assumption about the underlying resource type: the operation name, the
//! result key, and the transform are pure inputs.

use serde_json::{Map, Value};

use crate::connection::BackendClient;
use crate::error::Result;

/// Continuation keys recognized in page responses
///
/// The RDS-style API pages with `Marker`, the metrics API with `NextToken`.
/// Whichever key the backend uses is echoed back in the next request.
const CONTINUATION_KEYS: [&str; 2] = ["Marker", "NextToken"];

/// Fetch every page of a listing operation, transforming each item
///
/// Output preserves backend page order and within-page item order; nothing is
/// sorted or deduplicated. An empty or absent item list in a page contributes
/// nothing. A mid-pagination backend error aborts the fetch and surfaces the
/// error; accumulated partial results are discarded. Retry is a caller
/// policy, not this adapter's.
pub async fn fetch_all<T, F>(
    client: &dyn BackendClient,
    operation: &str,
    params: Value,
    result_key: &str,
    transform: F,
) -> Result<Vec<T>>
where
    F: Fn(&Value) -> T,
{
    let mut params = match params {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("params".to_string(), other);
            map
        }
    };

    let mut records = Vec::new();
    loop {
        let page = client
            .call(operation, &Value::Object(params.clone()))
            .await?;

        if let Some(items) = page.get(result_key).and_then(Value::as_array) {
            records.extend(items.iter().map(&transform));
        }

        match next_page_token(&page) {
            Some((key, token)) => {
                params.insert(key.to_string(), Value::String(token));
            }
            None => break,
        }
    }
    Ok(records)
}

/// Extract the continuation token from a page, if any
fn next_page_token(page: &Value) -> Option<(&'static str, String)> {
    for key in CONTINUATION_KEYS {
        if let Some(token) = page.get(key).and_then(Value::as_str) {
            if !token.is_empty() {
                return Some((key, token.to_string()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn name_of(item: &Value) -> String {
        item.get("Name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn concatenates_pages_in_order() {
        let backend = FakeBackend::new("rds-control");
        backend.script_pages(
            "DescribeThings",
            vec![
                json!({"Things": [{"Name": "a"}, {"Name": "b"}], "Marker": "p2"}),
                json!({"Things": [{"Name": "c"}, {"Name": "d"}, {"Name": "e"}], "Marker": "p3"}),
                json!({"Things": [{"Name": "f"}]}),
            ],
        );

        let names = fetch_all(&backend, "DescribeThings", json!({}), "Things", name_of)
            .await
            .unwrap();
        assert_eq!(names, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(backend.call_count("DescribeThings"), 3);

        // Continuation tokens were echoed back into subsequent requests.
        let calls = backend.calls("DescribeThings");
        assert_eq!(calls[1]["Marker"], "p2");
        assert_eq!(calls[2]["Marker"], "p3");
    }

    #[tokio::test]
    async fn next_token_style_pagination_is_recognized() {
        let backend = FakeBackend::new("metrics");
        backend.script_pages(
            "ListMetrics",
            vec![
                json!({"Metrics": [{"Name": "CPUUtilization"}], "NextToken": "t1"}),
                json!({"Metrics": [{"Name": "FreeableMemory"}]}),
            ],
        );

        let names = fetch_all(&backend, "ListMetrics", json!({}), "Metrics", name_of)
            .await
            .unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(backend.calls("ListMetrics")[1]["NextToken"], "t1");
    }

    #[tokio::test]
    async fn empty_first_page_yields_empty_sequence() {
        let backend = FakeBackend::new("rds-control");
        backend.script_pages("DescribeThings", vec![json!({"Things": []})]);

        let names = fetch_all(&backend, "DescribeThings", json!({}), "Things", name_of)
            .await
            .unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn page_missing_result_key_contributes_nothing() {
        let backend = FakeBackend::new("rds-control");
        backend.script_pages("DescribeThings", vec![json!({})]);

        let names = fetch_all(&backend, "DescribeThings", json!({}), "Things", name_of)
            .await
            .unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn mid_pagination_error_discards_partial_results() {
        let backend = FakeBackend::new("rds-control");
        backend.script_pages(
            "DescribeThings",
            vec![json!({"Things": [{"Name": "a"}], "Marker": "p2"})],
        );
        backend.fail_after_scripted_pages("DescribeThings", "ThrottlingException", "Rate exceeded");

        let result = fetch_all(&backend, "DescribeThings", json!({}), "Things", name_of).await;
        assert!(result.is_err());
    }
}
