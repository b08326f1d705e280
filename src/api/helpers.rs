use actix_web::http::header;
use actix_web::HttpResponse;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::cache::model::CachedValue;

/// 200 response whose Cache-Control/Expires headers reflect how long the
/// backing cache entry has left. Stale entries advertise a shortened
/// lifetime so clients re-check sooner.
pub fn json_with_cache_headers<T, B: Serialize>(lookup: &CachedValue<T>, body: &B) -> HttpResponse {
    let now = Utc::now();
    let max_age = lookup.max_age_secs(now.timestamp_millis());
    let expires = (now + Duration::seconds(max_age)).format("%a, %d %b %Y %H:%M:%S GMT");

    HttpResponse::Ok()
        .insert_header((
            header::CACHE_CONTROL,
            format!("public, max-age={}", max_age),
        ))
        .insert_header((header::EXPIRES, expires.to_string()))
        .json(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_reflect_remaining_ttl() {
        let lookup = CachedValue {
            value: (),
            cached_at_ms: Utc::now().timestamp_millis(),
            ttl_ms: 30_000,
            stale: false,
        };

        let response = json_with_cache_headers(&lookup, &serde_json::json!({"ok": true}));

        let cache_control = response
            .headers()
            .get(header::CACHE_CONTROL)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let max_age: i64 = cache_control
            .strip_prefix("public, max-age=")
            .unwrap()
            .parse()
            .unwrap();
        assert!((28..=30).contains(&max_age), "max-age was {}", max_age);

        let expires = response.headers().get(header::EXPIRES).unwrap();
        assert!(expires.to_str().unwrap().ends_with("GMT"));
    }

    #[test]
    fn test_stale_lookup_advertises_half_ttl() {
        let lookup = CachedValue {
            value: (),
            cached_at_ms: 0,
            ttl_ms: 60_000,
            stale: true,
        };

        let response = json_with_cache_headers(&lookup, &serde_json::json!({"ok": true}));

        let cache_control = response
            .headers()
            .get(header::CACHE_CONTROL)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(cache_control, "public, max-age=30");
    }
}
