//! Wire codec for the two message shapes.
//!
//! Both channels carry UTF-8 JSON. Required fields are enforced by serde;
//! unknown fields are tolerated. Decode failures are `MalformedMessage`,
//! which consumers treat as permanent (poison) failures.

use crate::domain::{DomainError, DomainResult, EnrichmentWorkItem, UpdateNotification};
use bytes::Bytes;

pub fn encode_work_item(item: &EnrichmentWorkItem) -> DomainResult<Bytes> {
    let payload = serde_json::to_vec(item)
        .map_err(|e| DomainError::MalformedMessage(format!("work item encode: {}", e)))?;
    Ok(payload.into())
}

pub fn decode_work_item(payload: &[u8]) -> DomainResult<EnrichmentWorkItem> {
    serde_json::from_slice(payload)
        .map_err(|e| DomainError::MalformedMessage(format!("work item decode: {}", e)))
}

pub fn encode_notification(notification: &UpdateNotification) -> DomainResult<Bytes> {
    let payload = serde_json::to_vec(notification)
        .map_err(|e| DomainError::MalformedMessage(format!("notification encode: {}", e)))?;
    Ok(payload.into())
}

pub fn decode_notification(payload: &[u8]) -> DomainResult<UpdateNotification> {
    serde_json::from_slice(payload)
        .map_err(|e| DomainError::MalformedMessage(format!("notification decode: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationPayload;

    #[test]
    fn test_work_item_round_trip() {
        let item = EnrichmentWorkItem {
            city: "Delhi".to_string(),
            lat: 28.6,
            lon: 77.2,
        };

        let bytes = encode_work_item(&item).unwrap();
        let decoded = decode_work_item(&bytes).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn test_decode_work_item_from_wire_shape() {
        let decoded =
            decode_work_item(br#"{"city":"Delhi","lat":28.6,"lon":77.2}"#).unwrap();
        assert_eq!(decoded.city, "Delhi");
        assert_eq!(decoded.lat, 28.6);
        assert_eq!(decoded.lon, 77.2);
    }

    #[test]
    fn test_decode_work_item_missing_field_is_malformed() {
        let result = decode_work_item(br#"{"city":"Delhi","lat":28.6}"#);
        assert!(matches!(result, Err(DomainError::MalformedMessage(_))));
    }

    #[test]
    fn test_decode_work_item_invalid_json_is_malformed() {
        let result = decode_work_item(b"not json at all");
        assert!(matches!(result, Err(DomainError::MalformedMessage(_))));
    }

    #[test]
    fn test_decode_work_item_tolerates_unknown_fields() {
        let decoded =
            decode_work_item(br#"{"city":"Delhi","lat":28.6,"lon":77.2,"extra":true}"#).unwrap();
        assert_eq!(decoded.city, "Delhi");
    }

    #[test]
    fn test_notification_envelope_shape() {
        let notification = UpdateNotification {
            payload: NotificationPayload {
                id: "1".to_string(),
                city: "Delhi".to_string(),
                lat: 28.6,
                lon: 77.2,
            },
        };

        let bytes = encode_notification(&notification).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["payload"]["id"], "1");
        assert_eq!(json["payload"]["city"], "Delhi");

        let decoded = decode_notification(&bytes).unwrap();
        assert_eq!(decoded, notification);
    }

    #[test]
    fn test_decode_notification_without_payload_key_is_malformed() {
        let result =
            decode_notification(br#"{"id":"1","city":"Delhi","lat":28.6,"lon":77.2}"#);
        assert!(matches!(result, Err(DomainError::MalformedMessage(_))));
    }
}
