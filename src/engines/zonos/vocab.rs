use std::collections::HashMap;
use std::path::Path;

use super::model::ZonosError;

/// Load the text vocabulary from a config.json file.
///
/// The config.json must contain a `"vocab"` field mapping single-character
/// strings to integer token IDs.
pub fn load_vocab(config_path: &Path) -> Result<HashMap<char, i64>, ZonosError> {
    let content = std::fs::read_to_string(config_path)?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| ZonosError::Config(format!("Failed to parse JSON: {e}")))?;

    let vocab_obj = json
        .get("vocab")
        .ok_or_else(|| ZonosError::Config("Missing 'vocab' field".to_string()))?
        .as_object()
        .ok_or_else(|| ZonosError::Config("'vocab' must be an object".to_string()))?;

    let mut map = HashMap::new();
    for (k, v) in vocab_obj {
        let ch = k
            .chars()
            .next()
            .ok_or_else(|| ZonosError::Config(format!("Empty key in vocab: {k:?}")))?;
        let id = v
            .as_i64()
            .ok_or_else(|| ZonosError::Config(format!("Non-integer vocab value for key {k:?}")))?;
        map.insert(ch, id);
    }

    Ok(map)
}

/// Built-in character vocabulary matching the Zonos text frontend.
///
/// IDs 0–3 are reserved (pad, bos, eos, unk); printable ASCII maps to
/// consecutive IDs from 4. Only used as a fallback when config.json is not
/// present; prefer loading from config.json via `load_vocab()`.
pub fn hardcoded_vocab() -> HashMap<char, i64> {
    (' '..='~')
        .enumerate()
        .map(|(i, ch)| (ch, i as i64 + 4))
        .collect()
}

/// Convert text into token IDs for the generator.
///
/// Characters not in the vocabulary are silently dropped, matching the
/// reference frontend's behavior.
pub fn tokenize(text: &str, vocab: &HashMap<char, i64>) -> Vec<i64> {
    text.chars().filter_map(|ch| vocab.get(&ch).copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hardcoded_vocab_covers_printable_ascii() {
        let vocab = hardcoded_vocab();
        assert_eq!(vocab.len(), 95);
        assert_eq!(vocab[&' '], 4);
        assert_eq!(vocab[&'~'], 98);
    }

    #[test]
    fn tokenize_drops_unknown_characters() {
        let vocab = hardcoded_vocab();
        let ids = tokenize("aé b", &vocab);
        assert_eq!(ids, vec![vocab[&'a'], vocab[&' '], vocab[&'b']]);
    }

    #[test]
    fn loads_vocab_from_config_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"vocab": {"a": 1, "b": 2}}"#).unwrap();

        let vocab = load_vocab(file.path()).unwrap();
        assert_eq!(vocab[&'a'], 1);
        assert_eq!(vocab[&'b'], 2);
    }

    #[test]
    fn rejects_config_without_vocab_field() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"model": "zonos"}"#).unwrap();

        let err = load_vocab(file.path()).unwrap_err();
        assert!(matches!(err, ZonosError::Config(_)));
    }
}
