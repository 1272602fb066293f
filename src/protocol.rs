//! Wire types shared by the HTTP server and the panel client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key → (language code → value).
pub type StringTable = BTreeMap<String, BTreeMap<String, String>>;

/// Body of `GET /api/strings`.
///
/// `langs` lists the languages present in `strings`, default language
/// first. It only holds the default language while translations are hidden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringsResponse {
    pub langs: Vec<String>,
    pub strings: StringTable,
    pub show_translations: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_camel_case_field_names() {
        let mut strings = StringTable::new();
        strings.insert(
            "greeting".to_string(),
            BTreeMap::from([("en".to_string(), "Hello".to_string())]),
        );
        let resp = StringsResponse {
            langs: vec!["en".to_string()],
            strings,
            show_translations: false,
        };

        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(
            json,
            r#"{"langs":["en"],"strings":{"greeting":{"en":"Hello"}},"showTranslations":false}"#
        );
    }

    #[test]
    fn decodes_server_payload() {
        let json = r#"{"langs":["en","fr"],"strings":{"k":{"en":"a","fr":"b"}},"showTranslations":true}"#;
        let resp: StringsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.langs, vec!["en", "fr"]);
        assert_eq!(resp.strings["k"]["fr"], "b");
        assert!(resp.show_translations);
    }
}
