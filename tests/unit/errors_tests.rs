/*!
 * Tests for error classification
 */

use termguard::providers::deepl::map_status_error;
use termguard::{GlossaryError, RemoteError};

/// Callers decide between retrying, skipping and asking the user
#[test]
fn test_mappedStatuses_shouldClassifyForCallerPolicy() {
    let cases = [
        (401, false, true),
        (403, false, true),
        (456, false, true),
        (429, true, false),
        (400, false, false),
        (404, false, false),
        (500, true, false),
        (503, true, false),
    ];

    for (status, retryable, user_action) in cases {
        let err = map_status_error(status, "", None);
        assert_eq!(err.is_retryable(), retryable, "status {}", status);
        assert_eq!(err.requires_user_action(), user_action, "status {}", status);
    }
}

#[test]
fn test_glossaryError_display_shouldIncludeRemoteKind() {
    let err = GlossaryError::from(RemoteError::QuotaExceeded("Quota for this billing period has been exceeded".into()));

    let message = err.to_string();

    assert!(message.starts_with("Remote error: Quota exceeded"));
    assert!(err.remote().is_some());
}

#[test]
fn test_glossaryError_fromIo_shouldBecomeFileError() {
    let err = GlossaryError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing.tsv"));

    assert!(matches!(err, GlossaryError::File(ref m) if m.contains("missing.tsv")));
}
