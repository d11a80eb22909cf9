use regex::Regex;
use std::sync::OnceLock;

/// Credential shapes that must never reach a log line
struct CredentialPatterns {
    bearer: Regex,
    basic: Regex,
    jwt: Regex,
    token_field: Regex,
    password_field: Regex,
}

static PATTERNS: OnceLock<CredentialPatterns> = OnceLock::new();

fn patterns() -> &'static CredentialPatterns {
    PATTERNS.get_or_init(|| CredentialPatterns {
        bearer: Regex::new(r"(?i)\bBearer\s+[A-Za-z0-9\-_\.~+/=]+").expect("static regex"),
        basic: Regex::new(r"(?i)\bBasic\s+[A-Za-z0-9+/=]+").expect("static regex"),
        // Three base64url segments, the first starting with a JSON object header
        jwt: Regex::new(r"\beyJ[A-Za-z0-9\-_]*\.[A-Za-z0-9\-_]+\.[A-Za-z0-9\-_]*").expect("static regex"),
        token_field: Regex::new(r#"(?i)"(token|access_token|refresh_token)"\s*:\s*"[^"]*""#)
            .expect("static regex"),
        password_field: Regex::new(r"(?i)(password|passwd|pwd)\s*[:=]\s*\S+").expect("static regex"),
    })
}

/// Redact credentials from a message before it is logged or echoed.
///
/// - `Bearer <x>` / `Basic <x>` keep the scheme, lose the value
/// - bare JWTs become `[REDACTED]`
/// - `"token": "<x>"` style JSON fields keep the key
/// - `password=<x>` style fields keep the key
pub fn sanitize_log_message(message: &str) -> String {
    let patterns = patterns();

    let result = patterns.bearer.replace_all(message, "Bearer [REDACTED]");
    let result = patterns.basic.replace_all(&result, "Basic [REDACTED]");
    let result = patterns.jwt.replace_all(&result, "[REDACTED]");
    let result = patterns.token_field.replace_all(&result, r#""$1":"[REDACTED]""#);
    let result = patterns.password_field.replace_all(&result, "$1=[REDACTED]");

    result.into_owned()
}
