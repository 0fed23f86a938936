use url::Url;

/// Schemes a bookmark is allowed to carry. Anything else with an explicit
/// scheme is refused outright.
pub const ACCEPTED_SCHEMES: &[&str] = &[
    "http",
    "https",
    "file",
    "about",
    "data",
    "javascript",
    "content",
];

/// Field-level validation failure, rendered inline next to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    TitleRequired,
    UrlRequired,
    CannotSave,
    NotValid,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            FieldError::TitleRequired => "Bookmark needs a title",
            FieldError::UrlRequired => "Bookmark needs a URL",
            FieldError::CannotSave => "Can't save this URL",
            FieldError::NotValid => "URL is not valid",
        };
        f.write_str(msg)
    }
}

/// Outcome of validating the two editable fields. Both fields are checked
/// independently so both errors can be shown at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub title_error: Option<FieldError>,
    pub url_error: Option<FieldError>,
    /// Normalized URL, present iff `url_error` is `None`.
    pub url: Option<String>,
}

impl Validation {
    pub fn is_ok(&self) -> bool {
        self.title_error.is_none() && self.url_error.is_none()
    }
}

pub fn validate(title: &str, raw_url: &str) -> Validation {
    let title_error = if title.trim().is_empty() {
        Some(FieldError::TitleRequired)
    } else {
        None
    };

    let trimmed = raw_url.trim();
    let (url_error, url) = if trimmed.is_empty() {
        (Some(FieldError::UrlRequired), None)
    } else {
        match check_url(trimmed) {
            Ok(normalized) => (None, Some(normalized)),
            Err(e) => (Some(e), None),
        }
    };

    Validation {
        title_error,
        url_error,
        url,
    }
}

/// Script bookmarks are intentionally permitted and are usually not
/// well-formed URIs, so they bypass parsing entirely. Everything else is
/// parsed; scheme-less input is retried as a bare host with implicit http.
fn check_url(trimmed: &str) -> Result<String, FieldError> {
    if trimmed
        .get(.."javascript:".len())
        .is_some_and(|p| p.eq_ignore_ascii_case("javascript:"))
    {
        return Ok(trimmed.to_string());
    }

    match Url::parse(trimmed) {
        Ok(parsed) => {
            if ACCEPTED_SCHEMES.contains(&parsed.scheme()) {
                Ok(parsed.to_string())
            } else {
                Err(FieldError::CannotSave)
            }
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let with_scheme = format!("http://{}", trimmed);
            match Url::parse(&with_scheme) {
                Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => {
                    Ok(parsed.to_string())
                }
                _ => Err(FieldError::NotValid),
            }
        }
        Err(_) => Err(FieldError::NotValid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_error_independently() {
        let v = validate("", "example.com");
        assert_eq!(v.title_error, Some(FieldError::TitleRequired));
        assert_eq!(v.url_error, None);

        let v = validate("x", "   ");
        assert_eq!(v.title_error, None);
        assert_eq!(v.url_error, Some(FieldError::UrlRequired));

        let v = validate("", "");
        assert_eq!(v.title_error, Some(FieldError::TitleRequired));
        assert_eq!(v.url_error, Some(FieldError::UrlRequired));
        assert!(!v.is_ok());
    }

    #[test]
    fn test_javascript_urls_accepted_verbatim() {
        let v = validate("bookmarklet", "javascript:alert(1)");
        assert!(v.is_ok());
        assert_eq!(v.url.as_deref(), Some("javascript:alert(1)"));

        // Prefix check is case-insensitive.
        let v = validate("bookmarklet", "JavaScript:void(0)");
        assert!(v.is_ok());
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        let v = validate("t", "ftp://host/file");
        assert_eq!(v.url_error, Some(FieldError::CannotSave));
    }

    #[test]
    fn test_bare_host_gets_implicit_http() {
        let v = validate("t", "example.com");
        assert!(v.is_ok());
        assert_eq!(v.url.as_deref(), Some("http://example.com/"));

        let v = validate("t", "example.com/page?q=1");
        assert_eq!(v.url.as_deref(), Some("http://example.com/page?q=1"));
    }

    #[test]
    fn test_hostless_input_is_not_valid() {
        let v = validate("t", "not a url at all");
        assert_eq!(v.url_error, Some(FieldError::NotValid));
    }

    #[test]
    fn test_url_is_trimmed_before_checks() {
        let v = validate("t", "  https://example.com  ");
        assert!(v.is_ok());
        assert_eq!(v.url.as_deref(), Some("https://example.com/"));
    }
}
