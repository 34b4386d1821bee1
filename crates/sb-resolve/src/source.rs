// source.rs — SourceReference parsing and effective-URL rewriting.
//
// The invariant that matters: canonical_uri() always reproduces the
// pre-rewrite form. Anything that persists a source for later
// reproducibility must use canonical_uri(), never effective_url() —
// the effective form only makes sense inside the process that holds
// the rewrite target.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Organization every mirrored module is published under on the forge.
pub const DEFAULT_ORG: &str = "amplifier";

/// A parsed module fetch URI of the form `scheme+origin-url[@ref]`,
/// e.g. `git+https://github.com/acme/mod-extras@main`.
///
/// Immutable once parsed; the effective fetch URL is derived, never
/// stored back into the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    /// Fetch scheme (the part before `+`, e.g. `git`).
    pub scheme: String,

    /// Canonical origin URL (e.g. `https://github.com/acme/mod-extras`).
    pub canonical_url: String,

    /// Ref to fetch (branch, tag, or commit); `None` if the URI had no
    /// `@ref` suffix.
    pub ref_name: Option<String>,
}

impl SourceReference {
    /// Parse a fetch URI into its canonical parts.
    pub fn parse(uri: &str) -> Result<Self, ResolveError> {
        let (scheme, rest) = uri.split_once('+').ok_or(ResolveError::InvalidUri {
            uri: uri.to_string(),
            reason: "missing 'scheme+' prefix",
        })?;

        if scheme.is_empty() {
            return Err(ResolveError::InvalidUri {
                uri: uri.to_string(),
                reason: "empty scheme",
            });
        }
        if !rest.contains("://") {
            return Err(ResolveError::InvalidUri {
                uri: uri.to_string(),
                reason: "origin is not a URL",
            });
        }

        // The ref separator is the last '@' *after* the last '/', so
        // userinfo in the authority part never gets misparsed as a ref.
        let (canonical_url, ref_name) = match rest.rfind('@') {
            Some(at) if at > rest.rfind('/').unwrap_or(0) => {
                (rest[..at].to_string(), Some(rest[at + 1..].to_string()))
            }
            _ => (rest.to_string(), None),
        };

        if ref_name.as_deref() == Some("") {
            return Err(ResolveError::InvalidUri {
                uri: uri.to_string(),
                reason: "empty ref after '@'",
            });
        }

        Ok(Self {
            scheme: scheme.to_string(),
            canonical_url,
            ref_name,
        })
    }

    /// The original, un-rewritten locator — the only form that may be
    /// persisted (lock records, configs). Round-trips `parse` exactly.
    pub fn canonical_uri(&self) -> String {
        match &self.ref_name {
            Some(r) => format!("{}+{}@{}", self.scheme, self.canonical_url, r),
            None => format!("{}+{}", self.scheme, self.canonical_url),
        }
    }

    /// Module name: the last path segment of the canonical URL, with
    /// any trailing `.git` stripped.
    pub fn name(&self) -> &str {
        let tail = self
            .canonical_url
            .rsplit('/')
            .next()
            .unwrap_or(&self.canonical_url);
        tail.strip_suffix(".git").unwrap_or(tail)
    }

    /// The URL to actually fetch from.
    ///
    /// Equal to the canonical URL unless `rewrite` carries a target, in
    /// which case host and owner are replaced by the target and the
    /// forge organization.
    pub fn effective_url(&self, rewrite: &RewriteConfig) -> String {
        match &rewrite.target {
            None => self.canonical_url.clone(),
            Some(target) => {
                let base = if target.contains("://") {
                    target.trim_end_matches('/').to_string()
                } else {
                    // Bare host:port targets get a scheme; the forge
                    // serves plain HTTP inside the shadow network.
                    format!("http://{}", target.trim_end_matches('/'))
                };
                format!("{}/{}/{}", base, rewrite.org, self.name())
            }
        }
    }
}

/// Rewrite configuration, threaded in explicitly by the caller.
///
/// `None` target means no rewriting at all — the effective URL equals
/// the canonical URL.
#[derive(Debug, Clone, Default)]
pub struct RewriteConfig {
    /// Alternate fetch host (`http://forge:3000` or bare `host:port`).
    pub target: Option<String>,

    /// Forge organization modules are published under.
    pub org: String,
}

impl RewriteConfig {
    /// Config with the standard forge organization.
    pub fn new(target: Option<String>) -> Self {
        Self {
            target,
            org: DEFAULT_ORG.to_string(),
        }
    }

    /// No rewriting: effective URLs equal canonical URLs.
    pub fn disabled() -> Self {
        Self::new(None)
    }
}

/// Outcome of resolving a module specifier: either a directory that is
/// already on disk, or a reference that still has to be fetched.
///
/// The single fetch-then-use call site matches this exhaustively; no
/// code path treats an unresolved reference as a path or vice versa.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A local directory, usable as-is.
    Resolved(PathBuf),

    /// A remote reference that must be fetched via its effective URL.
    Unresolved(SourceReference),
}

impl Resolution {
    /// Classify a module specifier.
    ///
    /// Specifiers with a `scheme+url` shape parse as references;
    /// everything else is treated as a local path.
    pub fn of(spec: &str) -> Result<Self, ResolveError> {
        if spec.split_once('+').is_some_and(|(_, rest)| rest.contains("://")) {
            Ok(Resolution::Unresolved(SourceReference::parse(spec)?))
        } else {
            Ok(Resolution::Resolved(PathBuf::from(spec)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_scheme_url_and_ref() {
        let r = SourceReference::parse("git+https://github.com/acme/mod-extras@main").unwrap();
        assert_eq!(r.scheme, "git");
        assert_eq!(r.canonical_url, "https://github.com/acme/mod-extras");
        assert_eq!(r.ref_name.as_deref(), Some("main"));
        assert_eq!(r.name(), "mod-extras");
    }

    #[test]
    fn canonical_uri_round_trips() {
        for uri in [
            "git+https://github.com/acme/mod-extras@main",
            "git+https://github.com/acme/mod-extras@v1.2.3",
            "git+https://github.com/acme/mod-extras",
            "git+http://user@host.example/owner/repo@dev",
        ] {
            let r = SourceReference::parse(uri).unwrap();
            assert_eq!(r.canonical_uri(), uri, "round trip failed for {uri}");
        }
    }

    #[test]
    fn canonical_round_trips_even_when_rewrite_configured() {
        let uri = "git+https://github.com/acme/mod-extras@main";
        let r = SourceReference::parse(uri).unwrap();
        let rewrite = RewriteConfig::new(Some("http://forge:3000".into()));

        assert_ne!(r.effective_url(&rewrite), r.canonical_url);
        assert_eq!(r.canonical_uri(), uri);
    }

    #[test]
    fn no_target_means_no_rewriting() {
        let r = SourceReference::parse("git+https://github.com/acme/mod-extras@main").unwrap();
        assert_eq!(
            r.effective_url(&RewriteConfig::disabled()),
            r.canonical_url
        );
    }

    #[test]
    fn rewrite_replaces_host_and_owner() {
        let r = SourceReference::parse("git+https://github.com/acme/mod-extras@main").unwrap();
        let rewrite = RewriteConfig::new(Some("http://forge:3000".into()));
        assert_eq!(
            r.effective_url(&rewrite),
            "http://forge:3000/amplifier/mod-extras"
        );
    }

    #[test]
    fn bare_host_target_gets_http_scheme() {
        let r = SourceReference::parse("proto+https://host.example/org/name@main").unwrap();
        let rewrite = RewriteConfig::new(Some("alt-host:3000".into()));
        assert_eq!(
            r.effective_url(&rewrite),
            "http://alt-host:3000/amplifier/name"
        );
    }

    #[test]
    fn dot_git_suffix_stripped_from_name() {
        let r = SourceReference::parse("git+https://github.com/acme/mod-extras.git@main").unwrap();
        assert_eq!(r.name(), "mod-extras");
    }

    #[test]
    fn userinfo_at_sign_is_not_a_ref() {
        let r = SourceReference::parse("git+http://admin@forge:3000/org/repo").unwrap();
        assert_eq!(r.canonical_url, "http://admin@forge:3000/org/repo");
        assert!(r.ref_name.is_none());
    }

    #[test]
    fn invalid_uris_rejected() {
        assert!(SourceReference::parse("https://github.com/acme/x").is_err());
        assert!(SourceReference::parse("+https://github.com/acme/x").is_err());
        assert!(SourceReference::parse("git+not-a-url").is_err());
        assert!(SourceReference::parse("git+https://github.com/acme/x@").is_err());
    }

    #[test]
    fn resolution_classifies_paths_and_references() {
        match Resolution::of("./modules/local-mod").unwrap() {
            Resolution::Resolved(p) => assert_eq!(p, PathBuf::from("./modules/local-mod")),
            Resolution::Unresolved(_) => panic!("local path misclassified"),
        }
        match Resolution::of("git+https://github.com/acme/mod-x@main").unwrap() {
            Resolution::Unresolved(r) => assert_eq!(r.name(), "mod-x"),
            Resolution::Resolved(_) => panic!("fetch URI misclassified"),
        }
    }
}
