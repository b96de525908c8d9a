//! Sender registry records
//!
//! Field names differ between account types and api versions, the records
//! are read from whichever list key and number key is present.

use serde::Serialize;
use serde_json::Value;

use crate::GatewayError;

const LIST_KEYS: [&str; 3] = ["data", "items", "senderIds"];
const NUMBER_KEYS: [&str; 3] = ["phoneNumber", "number", "senderId"];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SenderIdentity {
    pub number: String,
    pub status: String,
}

fn records(raw: &Value) -> Option<&[Value]> {
    if let Some(list) = raw.as_array() {
        return Some(list);
    }
    LIST_KEYS
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
}

fn text_field<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .filter(|v| !v.trim().is_empty())
}

/// Records without a number are skipped, a missing status reads as empty.
///
/// A body with no record list at all is a `Decode` error, not an empty
/// registry.
pub fn parse_sender_records(raw: &Value) -> Result<Vec<SenderIdentity>, GatewayError> {
    let records = records(raw).ok_or_else(|| {
        GatewayError::Decode(format!(
            "no sender list under {:?} or at the top level",
            LIST_KEYS
        ))
    })?;
    Ok(records
        .iter()
        .filter_map(|record| {
            let number = text_field(record, &NUMBER_KEYS)?;
            let status = text_field(record, &["status"]).unwrap_or_default();
            Some(SenderIdentity {
                number: number.to_string(),
                status: status.to_string(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_data_list() {
        let raw = json!({
            "data": [
                {"phoneNumber": "01022223333", "status": "APPROVED"},
                {"number": "+82 10-4444-5555", "status": "active"},
                {"status": "APPROVED"},
                {"phoneNumber": "", "status": "APPROVED"},
                {"phoneNumber": "01066667777"}
            ]
        });
        let identities = parse_sender_records(&raw).unwrap();
        assert_eq!(identities.len(), 3);
        assert_eq!(identities[0].number, "01022223333");
        assert_eq!(identities[1].number, "+82 10-4444-5555");
        assert_eq!(identities[1].status, "active");
        assert_eq!(identities[2].status, "");
    }

    #[test]
    fn test_parse_alternative_shapes() {
        let items = json!({"items": [{"senderId": "01022223333", "status": "REGISTERED"}]});
        assert_eq!(parse_sender_records(&items).unwrap()[0].number, "01022223333");

        let top = json!([{"phoneNumber": "01022223333", "status": "VERIFIED"}]);
        assert_eq!(parse_sender_records(&top).unwrap().len(), 1);

        //data wins over items when both are present
        let both = json!({
            "data": [{"phoneNumber": "01011111111", "status": "APPROVED"}],
            "items": [{"phoneNumber": "01022222222", "status": "APPROVED"}]
        });
        assert_eq!(parse_sender_records(&both).unwrap()[0].number, "01011111111");
    }

    #[test]
    fn test_parse_unexpected_shape_is_error() {
        for raw in [
            json!({"errorCode": "Forbidden"}),
            json!({"message": "unexpected"}),
            json!({"data": null}),
            json!("text"),
            json!({"data": {"phoneNumber": "1"}}),
        ] {
            assert!(matches!(
                parse_sender_records(&raw),
                Err(GatewayError::Decode(_))
            ));
        }
    }

    #[test]
    fn test_parse_empty_list_is_empty_registry() {
        assert!(parse_sender_records(&json!({"data": []})).unwrap().is_empty());
        assert!(parse_sender_records(&json!([])).unwrap().is_empty());
    }
}
