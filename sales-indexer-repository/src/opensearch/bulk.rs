//! Bulk request body construction and response parsing.

use serde_json::{json, Value};

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationResult, BatchOperationSummary};
use sales_indexer_shared::SaleDocument;

/// Build the NDJSON lines for a bulk index request.
///
/// One action line and one source line per document. No `_id` is set, so
/// the engine assigns its own identifiers.
pub(crate) fn bulk_body(
    index_name: &str,
    documents: &[SaleDocument],
) -> Result<Vec<Value>, SearchIndexError> {
    let mut body = Vec::with_capacity(documents.len() * 2);

    for doc in documents {
        body.push(json!({ "index": { "_index": index_name } }));
        body.push(
            serde_json::to_value(doc).map_err(|e| SearchIndexError::serialization(e.to_string()))?,
        );
    }

    Ok(body)
}

/// Interpret a bulk response body as per-document results.
///
/// `submitted` is the number of documents sent. The response must report
/// exactly one item per document; anything else means the outcome of some
/// documents is unknown and the whole operation is treated as failed.
pub fn parse_bulk_response(
    response: &Value,
    submitted: usize,
) -> Result<BatchOperationSummary, SearchIndexError> {
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchIndexError::bulk_operation("bulk response has no items"))?;

    if items.len() != submitted {
        return Err(SearchIndexError::bulk_operation(format!(
            "bulk response has {} items for {} documents",
            items.len(),
            submitted
        )));
    }

    let results = items
        .iter()
        .enumerate()
        .map(|(position, item)| parse_item(position, item))
        .collect();

    Ok(BatchOperationSummary::from_results(results))
}

/// Each item is `{ "<action>": { "status": .., "error": .. } }`.
fn parse_item(position: usize, item: &Value) -> BatchOperationResult {
    let Some(outcome) = item.as_object().and_then(|obj| obj.values().next()) else {
        return BatchOperationResult::failed(
            position,
            None,
            SearchIndexError::index("malformed bulk item"),
        );
    };

    let status = outcome
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok());

    if let Some(error) = outcome.get("error") {
        return BatchOperationResult::failed(position, status, SearchIndexError::index(describe_error(error)));
    }

    match status {
        Some(code) if !(200..300).contains(&code) => BatchOperationResult::failed(
            position,
            status,
            SearchIndexError::index(format!("item rejected with status {}", code)),
        ),
        _ => BatchOperationResult::succeeded(position, status),
    }
}

fn describe_error(error: &Value) -> String {
    match (
        error.get("type").and_then(Value::as_str),
        error.get("reason").and_then(Value::as_str),
    ) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        (Some(kind), None) => kind.to_string(),
        (None, Some(reason)) => reason.to_string(),
        (None, None) => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_body_pairs_action_and_source() {
        let docs = vec![
            SaleDocument::from_record(vec![("id_transaction", Some("ID1-20230501_1250"))]),
            SaleDocument::from_record(vec![("id_transaction", Some("ID2-20230502_900"))]),
        ];

        let body = bulk_body("bike_sales_data", &docs).unwrap();

        assert_eq!(body.len(), 4);
        assert_eq!(body[0], json!({ "index": { "_index": "bike_sales_data" } }));
        assert!(body[0]["index"].get("_id").is_none());
        assert_eq!(body[1], json!({ "id_transaction": "ID1-20230501_1250" }));
        assert_eq!(body[3], json!({ "id_transaction": "ID2-20230502_900" }));
    }

    #[test]
    fn test_parse_all_succeeded() {
        let response = json!({
            "took": 3,
            "errors": false,
            "items": [
                { "index": { "_index": "bike_sales_data", "status": 201, "result": "created" } },
                { "index": { "_index": "bike_sales_data", "status": 201, "result": "created" } }
            ]
        });

        let summary = parse_bulk_response(&response, 2).unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_parse_partial_failure() {
        let response = json!({
            "errors": true,
            "items": [
                { "index": { "status": 201 } },
                { "index": { "status": 400, "error": {
                    "type": "mapper_parsing_exception",
                    "reason": "failed to parse field [date]"
                } } },
                { "index": { "status": 429, "error": { "type": "es_rejected_execution_exception" } } }
            ]
        });

        let summary = parse_bulk_response(&response, 3).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);

        let failed: Vec<_> = summary.failures().collect();
        assert_eq!(failed[0].position, 1);
        assert_eq!(failed[0].status, Some(400));
        let message = failed[0].error.as_ref().unwrap().to_string();
        assert!(message.contains("mapper_parsing_exception: failed to parse field [date]"));
        assert_eq!(failed[1].status, Some(429));
    }

    #[test]
    fn test_parse_non_success_status_without_error_body() {
        let response = json!({ "items": [ { "index": { "status": 503 } } ] });
        let summary = parse_bulk_response(&response, 1).unwrap();
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_parse_item_count_mismatch() {
        let response = json!({ "items": [ { "index": { "status": 201 } } ] });
        assert!(matches!(
            parse_bulk_response(&response, 2),
            Err(SearchIndexError::BulkOperationError(_))
        ));
    }

    #[test]
    fn test_parse_missing_items() {
        let response = json!({ "error": "boom" });
        assert!(parse_bulk_response(&response, 1).is_err());
    }
}
