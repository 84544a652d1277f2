use url::Url;

/// Redact the password portion of a connection URL for display.
///
/// URLs without a password, or that do not parse, are returned unchanged.
pub(crate) fn redact_url_password(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    if parsed.password().is_none() {
        return url.to_string();
    }

    // Fails only for URLs that cannot carry credentials
    if parsed.set_password(Some("***")).is_err() {
        return url.to_string();
    }
    parsed.to_string()
}
