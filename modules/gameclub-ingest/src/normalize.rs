use url::Url;

/// Resolve a media reference scraped from a page into an absolute URL.
///
/// - Already absolute (has a scheme): returned unchanged.
/// - Protocol-relative (`//cdn/...`): prefixed with `https:`.
/// - Anything else: joined against `base`.
///
/// Returns `None` when the reference is blank or cannot be resolved into a
/// valid URL; callers drop the candidate in that case.
pub fn normalize_media_ref(raw: &str, base: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if has_scheme(raw) {
        return Url::parse(raw).ok().map(|_| raw.to_string());
    }

    if raw.starts_with("//") {
        let absolute = format!("https:{raw}");
        return Url::parse(&absolute).ok().map(|_| absolute);
    }

    let base = Url::parse(base).ok()?;
    base.join(raw).ok().map(String::from)
}

/// RFC 3986 scheme prefix: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":".
fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://df.example";

    #[test]
    fn absolute_reference_is_unchanged() {
        let url = "https://game.gtimg.cn/images/df/p4/hero.png?v=2";
        assert_eq!(normalize_media_ref(url, BASE).as_deref(), Some(url));
    }

    #[test]
    fn protocol_relative_gets_https() {
        assert_eq!(
            normalize_media_ref("//game.gtimg.cn/a.png", BASE).as_deref(),
            Some("https://game.gtimg.cn/a.png")
        );
    }

    #[test]
    fn root_relative_resolves_against_base() {
        assert_eq!(
            normalize_media_ref("/img/m4.png", BASE).as_deref(),
            Some("https://df.example/img/m4.png")
        );
    }

    #[test]
    fn path_relative_resolves_against_base_directory() {
        assert_eq!(
            normalize_media_ref("img/m4.png", "https://www.yjwujian.cn/index/").as_deref(),
            Some("https://www.yjwujian.cn/index/img/m4.png")
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["/img/m4.png", "//cdn.example/x.jpg", "https://a.example/b.png", "c.png"] {
            let once = normalize_media_ref(raw, BASE).unwrap();
            let twice = normalize_media_ref(&once, BASE).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw}");
        }
    }

    #[test]
    fn same_input_same_output() {
        assert_eq!(
            normalize_media_ref("../p5/ak.png", "https://df.example/a/b/"),
            normalize_media_ref("../p5/ak.png", "https://df.example/a/b/"),
        );
    }

    #[test]
    fn blank_reference_is_unresolvable() {
        assert_eq!(normalize_media_ref("   ", BASE), None);
    }

    #[test]
    fn bad_base_makes_relative_unresolvable() {
        assert_eq!(normalize_media_ref("/img/m4.png", "not a url"), None);
        // Absolute references do not depend on the base.
        assert!(normalize_media_ref("https://a.example/x.png", "not a url").is_some());
    }

    #[test]
    fn malformed_protocol_relative_is_dropped() {
        assert_eq!(normalize_media_ref("//", BASE), None);
    }

    #[test]
    fn scheme_detection() {
        assert!(has_scheme("data:image/png;base64,AAAA"));
        assert!(has_scheme("svn+ssh://host/x"));
        assert!(!has_scheme("/img/a:b.png"));
        assert!(!has_scheme("1http://x"));
        assert!(!has_scheme("img.png"));
    }
}
