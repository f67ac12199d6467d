//! Knack field-name mapping.
//!
//! Knack addresses record fields by opaque identifiers such as `field_12`.
//! Payloads are built with logical key names and renamed here just before
//! they are sent.

use serde_json::{Map, Value};

use crate::config::require;
use crate::error::AppError;

/// The four logical keys of an endpoint record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Representation,
    Url,
    Format,
    Datastore,
}

impl LogicalField {
    pub const ALL: [LogicalField; 4] = [
        LogicalField::Representation,
        LogicalField::Url,
        LogicalField::Format,
        LogicalField::Datastore,
    ];

    /// Key used in unmapped payloads.
    pub fn key(self) -> &'static str {
        match self {
            LogicalField::Representation => "representation",
            LogicalField::Url => "url",
            LogicalField::Format => "format",
            LogicalField::Datastore => "datastore",
        }
    }

    /// Environment variable holding the Knack field number for this key.
    pub fn env_var(self) -> &'static str {
        match self {
            LogicalField::Representation => "KNACK_FIELD_REPRESENTATION",
            LogicalField::Url => "KNACK_FIELD_URL",
            LogicalField::Format => "KNACK_FIELD_FORMAT",
            LogicalField::Datastore => "KNACK_FIELD_DATASTORE",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Mapping from logical keys to Knack field identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    representation: String,
    url: String,
    format: String,
    datastore: String,
}

impl FieldMap {
    /// Builds the map from Knack field numbers, prefixing each with `field_`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingConfig` naming the first blank field number, or
    /// `AppError::DuplicateField` if two keys share a field.
    pub fn new(
        representation: &str,
        url: &str,
        format: &str,
        datastore: &str,
    ) -> Result<Self, AppError> {
        Self::from_numbers(|field| match field {
            LogicalField::Representation => Some(representation),
            LogicalField::Url => Some(url),
            LogicalField::Format => Some(format),
            LogicalField::Datastore => Some(datastore),
        })
    }

    /// Builds the map from a lookup that may be missing values, failing on the
    /// first logical key without a field number.
    pub fn from_numbers<'a>(
        mut lookup: impl FnMut(LogicalField) -> Option<&'a str>,
    ) -> Result<Self, AppError> {
        let mut field_id = |field: LogicalField| -> Result<String, AppError> {
            let number = require(lookup(field), field.env_var())?;
            Ok(format!("field_{}", number))
        };

        let map = Self {
            representation: field_id(LogicalField::Representation)?,
            url: field_id(LogicalField::Url)?,
            format: field_id(LogicalField::Format)?,
            datastore: field_id(LogicalField::Datastore)?,
        };

        // Two keys sharing a field would make the rename lossy.
        for (i, a) in LogicalField::ALL.iter().enumerate() {
            if LogicalField::ALL[i + 1..]
                .iter()
                .any(|b| map.field_id(*a) == map.field_id(*b))
            {
                return Err(AppError::DuplicateField(map.field_id(*a).to_string()));
            }
        }

        Ok(map)
    }

    /// Knack field identifier for a logical key.
    pub fn field_id(&self, field: LogicalField) -> &str {
        match field {
            LogicalField::Representation => &self.representation,
            LogicalField::Url => &self.url,
            LogicalField::Format => &self.format,
            LogicalField::Datastore => &self.datastore,
        }
    }

    /// Renames every payload key to its Knack field identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnmappedField` if a key is not one of the logical keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use endpoints_core::fields::FieldMap;
    /// use serde_json::json;
    ///
    /// let map = FieldMap::new("1", "2", "3", "4").unwrap();
    /// let payload = json!({"format": "CSV", "datastore": "Carto"});
    /// let mapped = map.map_fields(payload.as_object().unwrap()).unwrap();
    /// assert_eq!(mapped["field_3"], "CSV");
    /// assert_eq!(mapped["field_4"], "Carto");
    /// ```
    pub fn map_fields(&self, payload: &Map<String, Value>) -> Result<Map<String, Value>, AppError> {
        payload
            .iter()
            .map(|(key, value)| {
                let field = LogicalField::from_key(key)
                    .ok_or_else(|| AppError::UnmappedField(key.clone()))?;
                Ok((self.field_id(field).to_string(), value.clone()))
            })
            .collect()
    }

    /// Inverse of [`map_fields`](Self::map_fields).
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnmappedField` for a key that is not a configured field id.
    pub fn unmap_fields(
        &self,
        record: &Map<String, Value>,
    ) -> Result<Map<String, Value>, AppError> {
        record
            .iter()
            .map(|(key, value)| {
                let field = LogicalField::ALL
                    .into_iter()
                    .find(|field| self.field_id(*field) == key)
                    .ok_or_else(|| AppError::UnmappedField(key.clone()))?;
                Ok((field.key().to_string(), value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_map() -> FieldMap {
        FieldMap::new("101", "102", "103", "104").unwrap()
    }

    fn sample_payload() -> Map<String, Value> {
        json!({
            "format": "GeoJSON",
            "url": {"url": "https://carto.example/sql?q=SELECT+*+FROM+t"},
            "datastore": "Carto",
            "representation": ["rep-1"]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_field_ids_are_prefixed() {
        let map = field_map();
        assert_eq!(map.field_id(LogicalField::Representation), "field_101");
        assert_eq!(map.field_id(LogicalField::Datastore), "field_104");
    }

    #[test]
    fn test_map_fields_renames_every_key() {
        let payload = sample_payload();
        let mapped = field_map().map_fields(&payload).unwrap();

        assert_eq!(mapped.len(), payload.len());
        assert_eq!(mapped["field_101"], json!(["rep-1"]));
        assert_eq!(mapped["field_103"], "GeoJSON");
        assert!(mapped.keys().all(|k| k.starts_with("field_")));
    }

    #[test]
    fn test_unmap_restores_payload() {
        let map = field_map();
        let payload = sample_payload();
        let restored = map.unmap_fields(&map.map_fields(&payload).unwrap()).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn test_unknown_key_fails() {
        let mut payload = sample_payload();
        payload.insert("name".to_string(), json!("Crime (CSV)"));

        let err = field_map().map_fields(&payload).unwrap_err();
        assert!(matches!(err, AppError::UnmappedField(ref k) if k == "name"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_missing_field_number_fails_eagerly() {
        let err = FieldMap::new("1", "2", " ", "4").unwrap_err();
        assert!(matches!(err, AppError::MissingConfig("KNACK_FIELD_FORMAT")));
    }

    #[test]
    fn test_duplicate_field_number_fails() {
        let err = FieldMap::new("1", "2", "2", "4").unwrap_err();
        assert!(matches!(err, AppError::DuplicateField(ref id) if id == "field_2"));
    }

    #[test]
    fn test_from_numbers_with_absent_value() {
        let err = FieldMap::from_numbers(|field| match field {
            LogicalField::Datastore => None,
            _ => Some("9"),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::MissingConfig("KNACK_FIELD_DATASTORE")));
    }

    #[test]
    fn test_from_key_round_trips() {
        for field in LogicalField::ALL {
            assert_eq!(LogicalField::from_key(field.key()), Some(field));
        }
        assert_eq!(LogicalField::from_key("title"), None);
    }
}
