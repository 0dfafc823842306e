//! Live reload script injection.

/// Inject the live reload script into HTML when the push channel is live.
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, live: bool) -> Vec<u8> {
    if live && crate::utils::mime::is_html(content_type) {
        inject_script(&body, crate::embed::serve::livereload_tag().as_bytes())
    } else {
        body
    }
}

/// Insert `script` immediately before the last `</html>`, or append it.
fn inject_script(content: &[u8], script: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</html>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}
