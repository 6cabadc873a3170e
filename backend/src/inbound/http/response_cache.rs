//! Response caching for data endpoints.
//!
//! Successful JSON bodies are stored under a fingerprint of the request and
//! replayed verbatim on later identical requests. The `Cache-Trace` header
//! tells clients which path served them. Cache failures are logged and the
//! request proceeds uncached; errors are never stored.

use std::future::Future;

use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{ResponseCache, ResponseCacheKey};
use crate::inbound::http::ApiResult;

/// Header naming the cache path that served a response.
pub const CACHE_TRACE_HEADER: &str = "Cache-Trace";
/// Served from the cache.
pub const CACHE_HIT: &str = "hit-cache";
/// Computed and stored in the cache.
pub const CACHE_SET: &str = "set-cache";

/// Serve `compute`'s result through the response cache.
///
/// # Errors
///
/// Propagates errors from `compute` and JSON serialisation failures.
pub async fn cached_json<T, Fut>(
    cache: &dyn ResponseCache,
    req: &HttpRequest,
    body: &[u8],
    compute: Fut,
) -> ApiResult<HttpResponse>
where
    T: Serialize,
    Fut: Future<Output = ApiResult<T>>,
{
    let key = ResponseCacheKey::for_request(
        req.method().as_str(),
        req.path(),
        req.query_string(),
        body,
    );

    match cache.get(&key).await {
        Ok(Some(cached)) => {
            return Ok(HttpResponse::Ok()
                .content_type(ContentType::json())
                .insert_header((CACHE_TRACE_HEADER, CACHE_HIT))
                .body(cached));
        }
        Ok(None) => {}
        Err(error) => warn!(%error, key = %key, "response cache read failed"),
    }

    let value = compute.await?;
    let bytes = serde_json::to_vec(&value).map_err(|err| Error::internal(err.to_string()))?;

    let mut response = HttpResponse::Ok();
    response.content_type(ContentType::json());
    match cache.put(&key, &bytes).await {
        Ok(()) => {
            response.insert_header((CACHE_TRACE_HEADER, CACHE_SET));
        }
        Err(error) => warn!(%error, key = %key, "response cache write failed"),
    }
    Ok(response.body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockResponseCache, ResponseCacheError};
    use actix_web::body::to_bytes;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn request() -> HttpRequest {
        TestRequest::get()
            .uri("/api/v2/recipient/x/?year=all")
            .to_http_request()
    }

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn cache_trace(response: &HttpResponse) -> Option<&str> {
        response
            .headers()
            .get(CACHE_TRACE_HEADER)
            .and_then(|value| value.to_str().ok())
    }

    #[rstest]
    #[actix_web::test]
    async fn hit_replays_stored_body() {
        let mut cache = MockResponseCache::new();
        cache
            .expect_get()
            .times(1)
            .return_once(|_| Ok(Some(br#"{"count":7}"#.to_vec())));
        cache.expect_put().never();

        let response = cached_json(&cache, &request(), b"", async {
            Ok::<_, Error>(json!({"count": 1}))
        })
        .await
        .expect("response");

        assert_eq!(cache_trace(&response), Some(CACHE_HIT));
        assert_eq!(body_json(response).await, json!({"count": 7}));
    }

    #[rstest]
    #[actix_web::test]
    async fn miss_computes_and_stores() {
        let mut cache = MockResponseCache::new();
        cache.expect_get().times(1).return_once(|_| Ok(None));
        cache
            .expect_put()
            .withf(|key, body| {
                key.as_str().starts_with("response:v1:") && body == br#"{"count":1}"#.as_slice()
            })
            .times(1)
            .return_once(|_, _| Ok(()));

        let response = cached_json(&cache, &request(), b"", async {
            Ok::<_, Error>(json!({"count": 1}))
        })
        .await
        .expect("response");

        assert_eq!(cache_trace(&response), Some(CACHE_SET));
        assert_eq!(body_json(response).await, json!({"count": 1}));
    }

    #[rstest]
    #[actix_web::test]
    async fn cache_failures_do_not_fail_the_request() {
        let mut cache = MockResponseCache::new();
        cache
            .expect_get()
            .return_once(|_| Err(ResponseCacheError::backend("redis down")));
        cache
            .expect_put()
            .return_once(|_, _| Err(ResponseCacheError::backend("redis down")));

        let response = cached_json(&cache, &request(), b"", async {
            Ok::<_, Error>(json!({"count": 1}))
        })
        .await
        .expect("response");

        assert_eq!(cache_trace(&response), None);
        assert_eq!(body_json(response).await, json!({"count": 1}));
    }

    #[rstest]
    #[actix_web::test]
    async fn errors_are_not_cached() {
        let mut cache = MockResponseCache::new();
        cache.expect_get().return_once(|_| Ok(None));
        cache.expect_put().never();

        let err = cached_json(&cache, &request(), b"", async {
            Err::<Value, _>(Error::invalid_request("Invalid year: x."))
        })
        .await
        .expect_err("error propagates");

        assert_eq!(err.message(), "Invalid year: x.");
    }
}
