//! Specifier resolution: decides whether a specifier names a remote module.
//!
//! Purely syntactic. Nothing here touches the network or the module table,
//! so the bundler may call it as often as it likes.

use url::Url;

/// Outcome of resolving one specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// In scope: the canonical URL of a remote module.
    Remote(String),
    /// Out of scope: leave it to the bundler's default resolution.
    Declined,
}

impl Resolution {
    pub fn remote_url(&self) -> Option<&str> {
        match self {
            Resolution::Remote(u) => Some(u),
            Resolution::Declined => None,
        }
    }
}

/// Resolves `specifier` as imported by `importer` (the importer's canonical
/// URL, or `None` / a filesystem path for local modules).
///
/// - An `http://` or `https://` specifier is its own canonical URL.
/// - Otherwise, if the importer is a remote URL, the specifier is resolved
///   against it as a relative reference (`./`, `../`, `/`, bare names alike).
/// - Otherwise the specifier is declined.
pub fn resolve(specifier: &str, importer: Option<&str>) -> Resolution {
    if has_remote_scheme(specifier) {
        return Resolution::Remote(canonicalize(specifier));
    }

    let Some(base) = importer.and_then(parse_remote) else {
        return Resolution::Declined;
    };

    match base.join(specifier) {
        Ok(mut joined) if is_remote(&joined) => {
            joined.set_fragment(None);
            Resolution::Remote(joined.into())
        }
        // `node:fs`, `data:...` and friends are not CDN modules.
        Ok(_) => Resolution::Declined,
        // Keep unparseable references in scope as-is; the path mapper gives
        // them a fallback name and the fetch reports the failure.
        Err(_) => Resolution::Remote(specifier.to_string()),
    }
}

/// True when `specifier` starts with `http://` or `https://` (ASCII case-insensitive).
pub fn has_remote_scheme(specifier: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        specifier
            .get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

/// WHATWG serialization without fragment; the raw string if it does not parse.
fn canonicalize(specifier: &str) -> String {
    match Url::parse(specifier) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.into()
        }
        Err(_) => specifier.to_string(),
    }
}

fn parse_remote(importer: &str) -> Option<Url> {
    Url::parse(importer).ok().filter(is_remote)
}

fn is_remote(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMPORTER: &str = "https://cdn.example/pkg/index.js";

    #[test]
    fn relative_specifiers_resolve_against_remote_importer() {
        assert_eq!(
            resolve("./util.js", Some(IMPORTER)),
            Resolution::Remote("https://cdn.example/pkg/util.js".to_string())
        );
        assert_eq!(
            resolve("../shared/a.js", Some(IMPORTER)),
            Resolution::Remote("https://cdn.example/shared/a.js".to_string())
        );
    }

    #[test]
    fn root_relative_specifier_keeps_importer_origin() {
        assert_eq!(
            resolve("/react@18.2.0/es2022/react.mjs", Some("https://esm.sh/react@18")),
            Resolution::Remote("https://esm.sh/react@18.2.0/es2022/react.mjs".to_string())
        );
    }

    #[test]
    fn absolute_specifier_is_in_scope_regardless_of_importer() {
        let expected = Resolution::Remote("https://esm.sh/lodash@4".to_string());
        assert_eq!(resolve("https://esm.sh/lodash@4", None), expected);
        assert_eq!(resolve("https://esm.sh/lodash@4", Some(IMPORTER)), expected);
        assert_eq!(resolve("https://esm.sh/lodash@4", Some("/home/me/app/main.js")), expected);
        assert_eq!(
            resolve("http://cdn.example/a.js", None).remote_url(),
            Some("http://cdn.example/a.js")
        );
    }

    #[test]
    fn absolute_specifier_is_canonicalized() {
        assert_eq!(
            resolve("HTTPS://CDN.Example/a/../b.js#frag", None),
            Resolution::Remote("https://cdn.example/b.js".to_string())
        );
    }

    #[test]
    fn bare_specifier_without_remote_importer_is_declined() {
        assert_eq!(resolve("lodash", None), Resolution::Declined);
        assert_eq!(resolve("./main.js", None), Resolution::Declined);
        assert_eq!(resolve("./util.js", Some("/home/me/app/main.js")), Resolution::Declined);
        assert_eq!(resolve("lodash", Some("file:///home/me/app/main.js")), Resolution::Declined);
    }

    #[test]
    fn bare_specifier_with_remote_importer_is_joined() {
        assert_eq!(
            resolve("lodash", Some(IMPORTER)),
            Resolution::Remote("https://cdn.example/pkg/lodash".to_string())
        );
    }

    #[test]
    fn non_http_scheme_from_remote_importer_is_declined() {
        assert_eq!(resolve("node:fs", Some(IMPORTER)), Resolution::Declined);
        assert_eq!(resolve("data:text/javascript,export{}", Some(IMPORTER)), Resolution::Declined);
    }

    #[test]
    fn has_remote_scheme_checks_prefix_only() {
        assert!(has_remote_scheme("https://x"));
        assert!(has_remote_scheme("HTTP://x"));
        assert!(!has_remote_scheme("httpx://x"));
        assert!(!has_remote_scheme("./https://x"));
        assert!(!has_remote_scheme("ht"));
    }
}
