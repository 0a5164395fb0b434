//! Error taxonomy and classification for everything the update loop routes.

use time::OffsetDateTime;

/// Curated auth-indicating phrases; matched case-insensitively as a last
/// resort after status and code checks.
const AUTH_PHRASES: &[&str] = &[
    "401",
    "403",
    "unauthorized",
    "forbidden",
    "authentication",
    "invalid credentials",
    "token is expired",
    "permissiondenied",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    Connection,
    Api,
    NotFound,
    Conflict,
    Validation,
    Internal,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Auth => "Auth",
            ErrorCategory::Connection => "Connection",
            ErrorCategory::Api => "API",
            ErrorCategory::NotFound => "NotFound",
            ErrorCategory::Conflict => "Conflict",
            ErrorCategory::Validation => "Validation",
            ErrorCategory::Internal => "Internal",
        }
    }
}

/// A classified error with enough context for the error view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
    pub hint: Option<String>,
    pub recoverable: bool,
    pub timestamp: OffsetDateTime,
}

impl ClassifiedError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            status: None,
            code: None,
            message: message.into(),
            hint: None,
            recoverable: !matches!(category, ErrorCategory::Internal),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn is_auth(&self) -> bool {
        self.category == ErrorCategory::Auth
    }

    /// Returns whether this error signals a stale watch resume token.
    ///
    /// The transport surfaces `410 Gone` (or a `GONE`/`EXPIRED` code) when
    /// the resource version can no longer be resumed; the coordinator
    /// answers with a fresh list+watch cycle.
    pub fn is_stale_resume_token(&self) -> bool {
        self.status == Some(410)
            || self
                .code
                .as_deref()
                .is_some_and(|code| matches!(code, "GONE" | "EXPIRED"))
    }
}

/// Classifies raw error parts into the taxonomy.
///
/// Precedence: explicit category, then recognized HTTP status, then code
/// string, then auth phrase matching on the message. Anything left over is
/// `Internal`.
pub fn classify(
    explicit: Option<ErrorCategory>,
    status: Option<u16>,
    code: Option<&str>,
    message: &str,
) -> ClassifiedError {
    let category = explicit
        .or_else(|| status.and_then(category_for_status))
        .or_else(|| code.and_then(category_for_code))
        .or_else(|| auth_category_for_message(message))
        .unwrap_or(ErrorCategory::Internal);

    let mut classified = ClassifiedError::new(category, message);
    classified.status = status;
    classified.code = code.map(ToString::to_string);
    if category == ErrorCategory::Auth {
        classified.hint = Some("Re-authenticate and try again".to_string());
    }

    classified
}

fn category_for_status(status: u16) -> Option<ErrorCategory> {
    match status {
        401 | 403 => Some(ErrorCategory::Auth),
        404 => Some(ErrorCategory::NotFound),
        409 => Some(ErrorCategory::Conflict),
        400..=499 | 500..=599 => Some(ErrorCategory::Api),
        _ => None,
    }
}

fn category_for_code(code: &str) -> Option<ErrorCategory> {
    match code.to_ascii_uppercase().as_str() {
        "UNAUTHENTICATED" | "PERMISSION_DENIED" => Some(ErrorCategory::Auth),
        "NOT_FOUND" => Some(ErrorCategory::NotFound),
        "ABORTED" | "ALREADY_EXISTS" | "CONFLICT" => Some(ErrorCategory::Conflict),
        "UNAVAILABLE" | "DEADLINE_EXCEEDED" => Some(ErrorCategory::Connection),
        "GONE" | "EXPIRED" => Some(ErrorCategory::Api),
        _ => None,
    }
}

fn auth_category_for_message(message: &str) -> Option<ErrorCategory> {
    let lowered = message.to_lowercase();

    AUTH_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
        .then_some(ErrorCategory::Auth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_category_wins_over_status() {
        // Arrange & Act
        let classified = classify(
            Some(ErrorCategory::Validation),
            Some(401),
            None,
            "bad argument",
        );

        // Assert
        assert_eq!(classified.category, ErrorCategory::Validation);
    }

    #[test]
    fn test_status_wins_over_code_and_message() {
        // Arrange & Act
        let classified = classify(None, Some(404), Some("UNAUTHENTICATED"), "unauthorized");

        // Assert
        assert_eq!(classified.category, ErrorCategory::NotFound);
        assert_eq!(classified.status, Some(404));
    }

    #[test]
    fn test_code_wins_over_message() {
        // Arrange & Act
        let classified = classify(None, None, Some("ABORTED"), "authentication failed");

        // Assert
        assert_eq!(classified.category, ErrorCategory::Conflict);
    }

    #[test]
    fn test_auth_phrases_promote_to_auth() {
        // Arrange
        let messages = [
            "server returned 401",
            "request Forbidden by policy",
            "invalid credentials supplied",
            "the Token is Expired",
        ];

        for message in messages {
            // Act
            let classified = classify(None, None, None, message);

            // Assert
            assert_eq!(classified.category, ErrorCategory::Auth, "{message}");
            assert!(classified.hint.is_some());
        }
    }

    #[test]
    fn test_unrecognized_error_falls_back_to_internal() {
        // Arrange & Act
        let classified = classify(None, None, None, "wat");

        // Assert
        assert_eq!(classified.category, ErrorCategory::Internal);
        assert!(!classified.recoverable);
    }

    #[test]
    fn test_stale_resume_token_detection() {
        // Arrange
        let gone = classify(None, Some(410), None, "resource version too old");
        let expired = classify(None, None, Some("EXPIRED"), "watch expired");
        let plain = classify(None, Some(500), None, "boom");

        // Assert
        assert!(gone.is_stale_resume_token());
        assert!(expired.is_stale_resume_token());
        assert!(!plain.is_stale_resume_token());
    }
}
