//! Remote file metadata model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata describing one remote object, as returned by a listing.
///
/// Records are transient query results and are never cached across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileRecord {
    /// Opaque identifier, unique per remote object
    pub id: String,
    /// Object name (base name of the uploaded file)
    #[serde(default)]
    pub name: String,
    /// Size in bytes; absent on some older API responses
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size: Option<u64>,
    /// Last modification instant, normalized to UTC
    pub modified_time: DateTime<Utc>,
}

/// One page of a remote listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFilePage {
    #[serde(default)]
    pub files: Vec<RemoteFileRecord>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// Drive encodes int64 fields as decimal strings; accept plain numbers too.
fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Text(String),
        Number(u64),
    }

    match Option::<RawSize>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawSize::Number(value)) => Ok(Some(value)),
        Some(RawSize::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decodes_drive_payload_with_string_size_and_offset() {
        let payload = r#"{
            "id": "1AbC",
            "name": ".xinitrc",
            "size": "1024",
            "modifiedTime": "2024-03-01T10:15:30.250+02:00"
        }"#;

        let record: RemoteFileRecord = serde_json::from_str(payload).unwrap();
        assert_eq!(record.id, "1AbC");
        assert_eq!(record.size, Some(1024));
        assert_eq!(
            record.modified_time,
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 30).unwrap()
                + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn missing_size_decodes_as_none() {
        let payload = r#"{"id": "x", "modifiedTime": "2024-03-01T10:15:30.000Z"}"#;
        let record: RemoteFileRecord = serde_json::from_str(payload).unwrap();
        assert_eq!(record.size, None);
        assert_eq!(record.name, "");
    }

    #[test]
    fn numeric_size_is_accepted() {
        let payload = r#"{"id": "x", "size": 7, "modifiedTime": "2024-03-01T10:15:30Z"}"#;
        let record: RemoteFileRecord = serde_json::from_str(payload).unwrap();
        assert_eq!(record.size, Some(7));
    }

    #[test]
    fn page_without_token_is_last_page() {
        let page: RemoteFilePage = serde_json::from_str(r#"{"files": []}"#).unwrap();
        assert!(page.files.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
