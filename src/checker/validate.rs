// src/checker/validate.rs
// =============================================================================
// Decides whether an href is something we can probe.
//
// A browser resolves every anchor's href against the document URL before a
// script ever sees it (`link.href` is always absolute). We do the same with
// `Url::join`, then only keep http and https targets. Anything else
// (mailto:, tel:, javascript:, data:, file:, or plain garbage) is rejected
// and must never be registered or probed.
//
// Rust concepts:
// - Result<T, E>: the rejection reason travels back to the caller
// - map_err: converting the url crate's error into our own
// =============================================================================

use url::Url;

use crate::error::ValidationError;

// Resolves an href against the page URL and checks its scheme
//
// Parameters:
//   base: the page URL (document base)
//   href: the raw attribute value, possibly relative
//
// Returns: the normalized absolute URL, or why it was rejected
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs"               -> Ok("https://example.com/docs")
//   href = "https://other.com"   -> Ok("https://other.com/")
//   href = "javascript:void(0)"  -> Err(UnsupportedScheme)
pub fn validate_href(base: &Url, href: &str) -> Result<Url, ValidationError> {
    // join() handles both cases: absolute hrefs replace the base entirely,
    // relative ones are resolved against it
    let url = base.join(href.trim()).map_err(|e| ValidationError::Malformed {
        href: href.to_string(),
        reason: e.to_string(),
    })?;

    if is_probeable(&url) {
        Ok(url)
    } else {
        Err(ValidationError::UnsupportedScheme {
            href: href.to_string(),
            scheme: url.scheme().to_string(),
        })
    }
}

// Parses an already-absolute URL string the way the background prober does
// before probing. Used as a guard on incoming checkLink messages.
pub fn parse_absolute(url: &str) -> Result<Url, ValidationError> {
    let parsed = Url::parse(url).map_err(|e| ValidationError::Malformed {
        href: url.to_string(),
        reason: e.to_string(),
    })?;

    if is_probeable(&parsed) {
        Ok(parsed)
    } else {
        Err(ValidationError::UnsupportedScheme {
            href: url.to_string(),
            scheme: parsed.scheme().to_string(),
        })
    }
}

/// Only http and https targets are probed.
pub fn is_probeable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    #[test]
    fn test_absolute_link_is_normalized() {
        let url = validate_href(&base(), "https://www.rust-lang.org").unwrap();
        assert_eq!(url.as_str(), "https://www.rust-lang.org/");
    }

    #[test]
    fn test_relative_link_resolves_against_page() {
        let url = validate_href(&base(), "../about").unwrap();
        assert_eq!(url.as_str(), "https://example.com/about");
    }

    #[test]
    fn test_javascript_is_rejected() {
        let err = validate_href(&base(), "javascript:void(0)").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedScheme {
                href: "javascript:void(0)".to_string(),
                scheme: "javascript".to_string(),
            }
        );
    }

    #[test]
    fn test_mailto_and_tel_are_rejected() {
        assert!(validate_href(&base(), "mailto:test@example.com").is_err());
        assert!(validate_href(&base(), "tel:+123456").is_err());
    }

    #[test]
    fn test_malformed_is_rejected() {
        let err = validate_href(&base(), "http://[::1").unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }));
    }

    #[test]
    fn test_fragment_only_href_stays_on_page() {
        let url = validate_href(&base(), "#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page/#section");
    }

    #[test]
    fn test_parse_absolute_guards_scheme() {
        assert!(parse_absolute("https://example.com").is_ok());
        assert!(parse_absolute("ftp://example.com").is_err());
        assert!(parse_absolute("not a url").is_err());
    }
}
