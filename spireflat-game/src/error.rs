//! Errors that make a single run unprocessable.
use thiserror::Error;

/// Fatal per-run failures. A run that raises any of these contributes no
/// floor records to the batch output.
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("malformed run envelope: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("{category} entry has a floor tag that is not an integer: {value}")]
    InvalidFloorTag {
        category: &'static str,
        value: serde_json::Value,
    },
    #[error("invalid character chosen: {0:?}")]
    UnknownCharacter(Option<String>),
    #[error("{category} entry on floor {floor} is missing `{field}`")]
    MissingField {
        category: &'static str,
        field: &'static str,
        floor: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_entry() {
        let err = FlattenError::InvalidFloorTag {
            category: "card_choices",
            value: serde_json::json!("upstairs"),
        };
        assert_eq!(
            err.to_string(),
            "card_choices entry has a floor tag that is not an integer: \"upstairs\""
        );

        let err = FlattenError::UnknownCharacter(Some("HERMIT".to_string()));
        assert!(err.to_string().contains("HERMIT"));

        let err = FlattenError::MissingField {
            category: "relics_obtained",
            field: "key",
            floor: 7,
        };
        assert_eq!(
            err.to_string(),
            "relics_obtained entry on floor 7 is missing `key`"
        );
    }
}
