//! JSON request body decoding.
//!
//! Bodies are taken as raw bytes so the response cache can fingerprint them;
//! this module decodes those bytes and reports schema violations as 422.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::Error;
use crate::inbound::http::ApiResult;

/// Decode a JSON body; an empty body decodes as `T::default()`.
///
/// # Errors
///
/// Returns an unprocessable-entity error when the body is not valid JSON for
/// `T`.
pub fn parse_json_body<T>(body: &[u8]) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        Error::unprocessable(format!("Invalid request body: {err}"))
            .with_details(json!({ "field": "body" }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq, Eq)]
    struct Body {
        name: Option<String>,
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"  \n".as_slice())]
    fn blank_body_is_default(#[case] raw: &[u8]) {
        assert_eq!(parse_json_body::<Body>(raw).expect("default"), Body::default());
    }

    #[rstest]
    fn decodes_json() {
        let body: Body = parse_json_body(br#"{"name": "x"}"#).expect("decodes");
        assert_eq!(body.name.as_deref(), Some("x"));
    }

    #[rstest]
    #[case(b"{".as_slice())]
    #[case(br#"{"name": 3}"#.as_slice())]
    fn invalid_json_is_unprocessable(#[case] raw: &[u8]) {
        let err = parse_json_body::<Body>(raw).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::UnprocessableEntity);
        assert_eq!(err.details(), Some(&json!({ "field": "body" })));
    }
}
