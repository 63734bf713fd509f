//! Turns the `svgContent` field of a request into SVG markup.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use log::debug;
use percent_encoding::percent_decode_str;

/// Decodes request content that may be raw markup, a `data:` URI, or bare base64.
/// A `data:` URI payload without `;base64` is percent-decoded.
///
/// Decoding fails open: whenever a step does not produce valid UTF-8 the
/// input string is returned as-is, and the extraction stage simply finds
/// nothing in it.
pub fn decode_svg_content(input: &str) -> String {
    let trimmed = input.trim();

    // --- data: URI ---
    if let Some(rest) = trimmed.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(',') {
            if header.contains(";base64") {
                if let Some(decoded) = decode_base64_utf8(payload) {
                    return decoded;
                }
                debug!("data URI claims base64 but payload did not decode; using raw input");
                return input.to_string();
            }
            return match percent_decode_str(payload).decode_utf8() {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => {
                    debug!("data URI payload is not UTF-8 once percent-decoded; using it as-is");
                    payload.to_string()
                }
            };
        }
    }

    // --- Bare base64 ---
    // Markup always contains '<', base64 never does.
    if !trimmed.contains('<') {
        if let Some(decoded) = decode_base64_utf8(trimmed) {
            return decoded;
        }
        debug!("Content is neither markup nor base64; using raw input");
    }

    input.to_string()
}

fn decode_base64_utf8(payload: &str) -> Option<String> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(&compact)
        .or_else(|_| URL_SAFE.decode(&compact))
        .ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r#"<svg viewBox="0 0 10 10"></svg>"#;

    #[test]
    fn test_raw_markup_passes_through() {
        assert_eq!(decode_svg_content(SVG), SVG);
    }

    #[test]
    fn test_bare_base64() {
        let encoded = STANDARD.encode(SVG);
        assert_eq!(decode_svg_content(&encoded), SVG);
    }

    #[test]
    fn test_base64_data_uri() {
        let uri = format!("data:image/svg+xml;base64,{}", STANDARD.encode(SVG));
        assert_eq!(decode_svg_content(&uri), SVG);
    }

    #[test]
    fn test_plain_data_uri_returns_payload() {
        let uri = format!("data:image/svg+xml;utf8,{}", SVG);
        assert_eq!(decode_svg_content(&uri), SVG);
    }

    #[test]
    fn test_percent_encoded_data_uri() {
        let uri = "data:image/svg+xml,%3Csvg%20viewBox%3D%220%200%2010%2010%22%3E%3C%2Fsvg%3E";
        assert_eq!(decode_svg_content(uri), SVG);

        // A literal '%' that starts no escape is kept.
        let uri = r#"data:image/svg+xml;utf8,<svg width="100%"></svg>"#;
        assert_eq!(decode_svg_content(uri), r#"<svg width="100%"></svg>"#);
    }

    #[test]
    fn test_undecodable_content_falls_back_to_raw() {
        assert_eq!(decode_svg_content("not base64 !!"), "not base64 !!");
        assert_eq!(
            decode_svg_content("data:image/svg+xml;base64,@@@"),
            "data:image/svg+xml;base64,@@@"
        );
    }
}
