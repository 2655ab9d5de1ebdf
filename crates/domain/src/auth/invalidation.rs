//! Requests that must not be replayed after a token refresh.
//!
//! Some requests embed the current tokens in their payload (a logout call
//! sending the refresh token, for example). Replaying such a request after the
//! tokens rotated would send stale data, so a request can opt out of the
//! replay by carrying the marker header. When a refresh happens on behalf of a
//! marked request the authenticator fails with [`AuthFinishedInvalidation`]
//! instead, and callers detect it anywhere in an error chain with
//! [`is_caused_by_auth_invalidation`].

use std::error::Error;

use thiserror::Error;

use crate::request::HttpRequest;

/// Header name marking a request for invalidation after a refresh.
pub const INVALIDATION_AFTER_REFRESH_HEADER_NAME: &str = "INVALIDATION_AFTER_REFRESH_HEADER_NAME";

/// Header value marking a request for invalidation after a refresh.
pub const INVALIDATION_AFTER_REFRESH_HEADER_VALUE: &str = "INVALIDATION_AFTER_REFRESH_HEADER_VALUE";

/// Raised instead of replaying a marked request once the tokens were refreshed.
#[derive(Debug, Error, Clone, Copy, Default, PartialEq, Eq)]
#[error("authentication was finished, invalidating the request")]
pub struct AuthFinishedInvalidation;

/// Returns a copy of `request` carrying the invalidation marker.
#[must_use]
pub fn mark_for_invalidation(request: HttpRequest) -> HttpRequest {
    request.with_header(
        INVALIDATION_AFTER_REFRESH_HEADER_NAME,
        INVALIDATION_AFTER_REFRESH_HEADER_VALUE,
    )
}

/// Returns true if `request` carries the invalidation marker.
#[must_use]
pub fn is_marked_for_invalidation(request: &HttpRequest) -> bool {
    request.header(INVALIDATION_AFTER_REFRESH_HEADER_NAME)
        == Some(INVALIDATION_AFTER_REFRESH_HEADER_VALUE)
}

/// Returns the first error of type `T` in the cause chain of `error`,
/// starting with `error` itself.
#[must_use]
pub fn find_cause<'a, T>(error: &'a (dyn Error + 'static)) -> Option<&'a T>
where
    T: Error + 'static,
{
    std::iter::successors(Some(error), |&current| current.source())
        .find_map(|current| current.downcast_ref::<T>())
}

/// Returns true if [`AuthFinishedInvalidation`] appears in the cause chain.
#[must_use]
pub fn is_caused_by_auth_invalidation(error: &(dyn Error + 'static)) -> bool {
    find_cause::<AuthFinishedInvalidation>(error).is_some()
}

/// Replaces an invalidation failure with `fallback()`.
///
/// Every other error is returned unchanged.
///
/// # Errors
///
/// Returns the original error when it was not caused by an invalidation.
pub fn recover_auth_invalidation<T, E, F>(result: Result<T, E>, fallback: F) -> Result<T, E>
where
    E: Error + 'static,
    F: FnOnce() -> T,
{
    match result {
        Err(error) if is_caused_by_auth_invalidation(&error) => Ok(fallback()),
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Error)]
    #[error("request failed")]
    struct Outer(#[source] Middle);

    #[derive(Debug, Error)]
    #[error("auth failed")]
    struct Middle(#[source] AuthFinishedInvalidation);

    #[derive(Debug, Error)]
    #[error("unrelated")]
    struct Unrelated;

    #[test]
    fn test_marker_detection() {
        let request = HttpRequest::parse(HttpMethod::Post, "https://example.com/logout").unwrap();
        assert!(!is_marked_for_invalidation(&request));
        assert!(is_marked_for_invalidation(&mark_for_invalidation(request)));
    }

    #[test]
    fn test_marker_requires_exact_value() {
        let request = HttpRequest::parse(HttpMethod::Post, "https://example.com/logout")
            .unwrap()
            .with_header(INVALIDATION_AFTER_REFRESH_HEADER_NAME, "yes");
        assert!(!is_marked_for_invalidation(&request));
    }

    #[test]
    fn test_found_through_wrapping() {
        let error = Outer(Middle(AuthFinishedInvalidation));
        assert!(is_caused_by_auth_invalidation(&error));
        assert!(is_caused_by_auth_invalidation(&AuthFinishedInvalidation));
        assert!(!is_caused_by_auth_invalidation(&Unrelated));
    }

    #[test]
    fn test_recover_only_invalidation() {
        let recovered: Result<u8, Outer> =
            recover_auth_invalidation(Err(Outer(Middle(AuthFinishedInvalidation))), || 7);
        assert_eq!(recovered.unwrap(), 7);

        let kept: Result<u8, Unrelated> = recover_auth_invalidation(Err(Unrelated), || 7);
        assert!(kept.is_err());

        let ok: Result<u8, Unrelated> = recover_auth_invalidation(Ok(1), || 7);
        assert_eq!(ok.unwrap(), 1);
    }
}
