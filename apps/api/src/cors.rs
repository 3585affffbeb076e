//! CORS origin patterns.
//!
//! `ALLOWED_ORIGINS` entries may be exact origins, `*`, a wildcard port
//! (`http://localhost:*`) or a wildcard subdomain (`https://*.example.com`).
//! Credentials are allowed, so a matching origin is always echoed back
//! rather than answered with `*`.

use axum::http::{request::Parts, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// A single parsed entry of the allowed-origins list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPattern {
    Any,
    Exact(String),
    AnyPort {
        scheme: String,
        host: String,
    },
    Subdomain {
        scheme: String,
        /// Includes the leading dot, e.g. `.example.com`
        suffix: String,
        port: PortRule,
    },
}

/// Port constraint of a subdomain pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortRule {
    Default,
    Exact(String),
    Any,
}

impl OriginPattern {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().trim_end_matches('/').to_ascii_lowercase();
        if normalized == "*" {
            return OriginPattern::Any;
        }

        let Some((scheme, authority)) = normalized.split_once("://") else {
            return OriginPattern::Exact(normalized);
        };

        if let Some(rest) = authority.strip_prefix("*.") {
            let (domain, port) = match rest.strip_suffix(":*") {
                Some(domain) => (domain, PortRule::Any),
                None => match split_port(rest) {
                    (domain, Some(port)) => (domain, PortRule::Exact(port.to_string())),
                    (domain, None) => (domain, PortRule::Default),
                },
            };
            return OriginPattern::Subdomain {
                scheme: scheme.to_string(),
                suffix: format!(".{domain}"),
                port,
            };
        }

        if let Some(host) = authority.strip_suffix(":*") {
            return OriginPattern::AnyPort {
                scheme: scheme.to_string(),
                host: host.to_string(),
            };
        }

        OriginPattern::Exact(normalized)
    }

    pub fn matches(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/').to_ascii_lowercase();
        match self {
            OriginPattern::Any => true,
            OriginPattern::Exact(expected) => *expected == origin,
            OriginPattern::AnyPort { scheme, host } => {
                let Some((o_scheme, authority)) = origin.split_once("://") else {
                    return false;
                };
                if o_scheme != scheme {
                    return false;
                }
                match authority.strip_prefix(host.as_str()) {
                    Some("") => true,
                    Some(rest) => rest
                        .strip_prefix(':')
                        .is_some_and(|port| is_port(port)),
                    None => false,
                }
            }
            OriginPattern::Subdomain {
                scheme,
                suffix,
                port,
            } => {
                let Some((o_scheme, authority)) = origin.split_once("://") else {
                    return false;
                };
                if o_scheme != scheme {
                    return false;
                }
                let (o_host, o_port) = split_port(authority);
                let port_ok = match port {
                    PortRule::Default => o_port.is_none(),
                    PortRule::Exact(expected) => o_port == Some(expected.as_str()),
                    PortRule::Any => true,
                };
                o_host.len() > suffix.len() && o_host.ends_with(suffix.as_str()) && port_ok
            }
        }
    }
}

/// Parses every configured origin into a pattern.
pub fn parse_patterns(origins: &[String]) -> Vec<OriginPattern> {
    origins.iter().map(|o| OriginPattern::parse(o)).collect()
}

/// Returns true when any pattern accepts the origin.
pub fn is_allowed(patterns: &[OriginPattern], origin: &str) -> bool {
    patterns.iter().any(|p| p.matches(origin))
}

/// Builds the CORS layer: GET/POST, mirrored request headers, credentials on.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let patterns = parse_patterns(origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|o| is_allowed(&patterns, o))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn split_port(authority: &str) -> (&str, Option<&str>) {
    match authority.rsplit_once(':') {
        Some((host, port)) if is_port(port) => (host, Some(port)),
        _ => (authority, None),
    }
}

fn is_port(s: &str) -> bool {
    !s.is_empty() && s.len() <= 5 && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_port_matches_any_port() {
        let p = OriginPattern::parse("http://localhost:*");
        assert!(p.matches("http://localhost:3000"));
        assert!(p.matches("http://localhost:54321"));
        assert!(p.matches("http://localhost"));
    }

    #[test]
    fn test_wildcard_port_rejects_other_hosts_and_schemes() {
        let p = OriginPattern::parse("http://localhost:*");
        assert!(!p.matches("https://localhost:3000"));
        assert!(!p.matches("http://localhost.evil.com:3000"));
        assert!(!p.matches("http://localhostx:3000"));
        assert!(!p.matches("http://localhost:abc"));
    }

    #[test]
    fn test_wildcard_port_ipv4_loopback() {
        let p = OriginPattern::parse("http://127.0.0.1:*");
        assert!(p.matches("http://127.0.0.1:8080"));
        assert!(!p.matches("http://127.0.0.10:8080"));
    }

    #[test]
    fn test_exact_origin_ignores_case_and_trailing_slash() {
        let p = OriginPattern::parse("https://Roast.App/");
        assert!(p.matches("https://roast.app"));
        assert!(!p.matches("https://roast.app:8443"));
    }

    #[test]
    fn test_star_matches_everything() {
        let p = OriginPattern::parse("*");
        assert_eq!(p, OriginPattern::Any);
        assert!(p.matches("https://anything.example"));
    }

    #[test]
    fn test_subdomain_wildcard() {
        let p = OriginPattern::parse("https://*.roast.app");
        assert!(p.matches("https://www.roast.app"));
        assert!(p.matches("https://a.b.roast.app"));
        assert!(!p.matches("https://roast.app"));
        assert!(!p.matches("https://evilroast.app"));
        assert!(!p.matches("http://www.roast.app"));
        assert!(!p.matches("https://www.roast.app:8443"));
    }

    #[test]
    fn test_subdomain_wildcard_with_port() {
        let p = OriginPattern::parse("https://*.roast.app:8443");
        assert!(p.matches("https://api.roast.app:8443"));
        assert!(!p.matches("https://api.roast.app"));
    }

    #[test]
    fn test_subdomain_wildcard_with_any_port() {
        let p = OriginPattern::parse("https://*.roast.app:*");
        assert_eq!(
            p,
            OriginPattern::Subdomain {
                scheme: "https".to_string(),
                suffix: ".roast.app".to_string(),
                port: PortRule::Any,
            }
        );
        assert!(p.matches("https://api.roast.app:8443"));
        assert!(p.matches("https://www.roast.app"));
        assert!(!p.matches("https://roast.app:8443"));
        assert!(!p.matches("http://api.roast.app:8443"));
    }

    #[test]
    fn test_is_allowed_with_default_patterns() {
        let patterns = parse_patterns(&[
            "http://localhost:*".to_string(),
            "http://127.0.0.1:*".to_string(),
        ]);
        assert!(is_allowed(&patterns, "http://localhost:61234"));
        assert!(is_allowed(&patterns, "http://127.0.0.1:5000"));
        assert!(!is_allowed(&patterns, "https://example.com"));
    }

    #[test]
    fn test_empty_pattern_list_allows_nothing() {
        assert!(!is_allowed(&[], "http://localhost:3000"));
    }
}
