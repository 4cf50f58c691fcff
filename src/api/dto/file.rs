//! DTOs for the file upload endpoint.

use serde::Deserialize;
use validator::Validate;

use crate::api::dto::link::ALIAS_REGEX;
use crate::domain::entities::AliasKind;

/// JSON carried in the `json_field` part of a file upload.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ShortenFileRequest {
    #[validate(length(min = 5, max = 30))]
    #[validate(regex(path = "*ALIAS_REGEX"))]
    pub alias: String,

    #[serde(rename = "type")]
    pub kind: AliasKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_validate() {
        let req: ShortenFileRequest =
            serde_json::from_str(r#"{"alias":"filealias1","type":"FILE"}"#).unwrap();

        assert_eq!(req.kind, AliasKind::File);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_invalid_alias() {
        let req: ShortenFileRequest =
            serde_json::from_str(r#"{"alias":"a_b","type":"FILE"}"#).unwrap();

        assert!(req.validate().is_err());
    }
}
