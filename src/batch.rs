use crate::{
    entry::DictionaryEntry,
    error::{Error, Result},
};

/// Decode a JSON array of entries into an import batch.
///
/// Fails as a whole: either every entry decodes and carries a korean name,
/// or an error describing the first problem is returned and nothing is
/// handed to the merge engine.
pub fn decode_batch(json: &str) -> Result<Vec<DictionaryEntry>> {
    let entries: Vec<DictionaryEntry> =
        serde_json::from_str(json).map_err(Error::decode)?;

    if let Some(position) = entries
        .iter()
        .position(|e| e.korean_name.trim().is_empty())
    {
        return Err(Error::InvalidEntry {
            position,
            reason: "korean name is blank".to_string(),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;

    #[test]
    fn decodes_array() {
        let json = r#"[
            {"type": "TERM", "koName": "고객명", "enAbbr": "CUST_NM"},
            {"type": "WORD", "koreanName": "고객", "englishAbbreviation": "CUST"}
        ]"#;
        let batch = decode_batch(json).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].kind, EntryKind::Term);
        assert_eq!(batch[1].english_abbreviation.as_deref(), Some("CUST"));
    }

    #[test]
    fn empty_array_is_an_empty_batch() {
        assert!(decode_batch("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = decode_batch("[{\"type\": \"TERM\"").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(err.to_string().starts_with("could not decode import batch"));
    }

    #[test]
    fn unknown_kind_is_a_decode_error() {
        let err = decode_batch(r#"[{"type": "SHEET", "koName": "x"}]"#)
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn blank_name_rejects_whole_batch() {
        let json = r#"[
            {"type": "WORD", "koName": "고객"},
            {"type": "WORD", "koName": "  "}
        ]"#;
        match decode_batch(json) {
            Err(Error::InvalidEntry { position, .. }) => assert_eq!(position, 1),
            other => panic!("expected InvalidEntry, got {other:?}"),
        }
    }
}
