//! DTOs for the link creation endpoint.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::domain::entities::{AliasKind, NewLink};

/// Aliases are plain ASCII alphanumerics.
pub(crate) static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// Request to create a LINK alias.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ShortenLinkRequest {
    #[validate(length(min = 5, max = 30))]
    #[validate(regex(path = "*ALIAS_REGEX"))]
    pub alias: String,

    #[serde(rename = "type")]
    pub kind: AliasKind,

    /// Absolute `http` or `https` URL.
    #[validate(custom(function = "validate_redirect_url"))]
    pub redirect_to: String,
}

fn validate_redirect_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ValidationError::new("url")
            .with_message("must be an absolute http or https URL".into())),
    }
}

impl From<ShortenLinkRequest> for NewLink {
    fn from(req: ShortenLinkRequest) -> Self {
        NewLink {
            alias: req.alias,
            kind: req.kind,
            redirect_to: req.redirect_to,
        }
    }
}
