//! Splitting fully-qualified names into registrable domain and subdomain
//!
//! Which multi-label suffixes are public (`co.uk`, `com.au`, ...) cannot be
//! derived from the name itself. The splitter asks a [`SuffixResolver`];
//! [`BuiltinSuffixes`] ships a small table of common second-level ccTLD
//! suffixes and is best effort only. Plug in a full public-suffix list for
//! anything billing-sensitive.

use serde::Serialize;

use crate::error::{LoopiaError, Result};

/// Result of [`split_domain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitDomain {
    /// Registrable root, e.g. `"example.co.uk"`.
    pub domain: String,
    /// Leading labels, e.g. `"static.img"`; `None` for a root domain.
    pub subdomain: Option<String>,
}

/// Decides whether a multi-label, lowercase candidate such as `"co.uk"` is
/// a public suffix. Single labels are always treated as suffixes.
pub trait SuffixResolver {
    fn is_public_suffix(&self, candidate: &str) -> bool;
}

impl<F> SuffixResolver for F
where
    F: Fn(&str) -> bool,
{
    fn is_public_suffix(&self, candidate: &str) -> bool {
        self(candidate)
    }
}

/// Embedded table of common multi-label suffixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSuffixes;

const BUILTIN_SUFFIXES: &[&str] = &[
    // United Kingdom
    "co.uk", "org.uk", "me.uk", "ltd.uk", "plc.uk", "net.uk", "ac.uk", "gov.uk",
    // Australia / New Zealand
    "com.au", "net.au", "org.au", "edu.au", "gov.au", "asn.au", "id.au",
    "co.nz", "net.nz", "org.nz", "ac.nz", "govt.nz",
    // Asia
    "co.jp", "ne.jp", "or.jp", "ac.jp", "go.jp",
    "co.kr", "or.kr", "com.cn", "net.cn", "org.cn", "com.hk", "com.sg", "com.tw",
    "co.in", "net.in", "org.in", "co.id", "co.th", "com.my",
    // Americas
    "com.br", "net.br", "org.br", "com.ar", "com.mx", "com.co",
    // Africa / Middle East
    "co.za", "org.za", "co.il", "org.il", "com.tr", "com.eg",
    // Europe
    "com.pl", "net.pl", "org.pl", "co.at", "or.at", "com.es", "com.pt", "com.gr",
    "in.rs", "co.rs", "org.rs", "edu.rs",
];

impl SuffixResolver for BuiltinSuffixes {
    fn is_public_suffix(&self, candidate: &str) -> bool {
        BUILTIN_SUFFIXES.contains(&candidate)
    }
}

/// [`split_domain_with`] using [`BuiltinSuffixes`].
pub fn split_domain(fqdn: &str) -> Result<SplitDomain> {
    split_domain_with(fqdn, &BuiltinSuffixes)
}

/// Splits `fqdn` into registrable domain and optional subdomain.
///
/// The longest trailing label run accepted by `resolver` is the public
/// suffix; the registrable domain is that suffix plus one more label when
/// there is one. A bare suffix (`"com"`, `"co.uk"`) is returned as-is.
pub fn split_domain_with(fqdn: &str, resolver: &dyn SuffixResolver) -> Result<SplitDomain> {
    let name = fqdn.strip_suffix('.').unwrap_or(fqdn);
    let labels: Vec<&str> = name.split('.').collect();
    if labels.iter().any(|label| label.is_empty()) {
        return Err(LoopiaError::invalid_value(
            "domain",
            format!("'{fqdn}' is not a valid domain name"),
        ));
    }

    let lowered = name.to_ascii_lowercase();
    let lowered_labels: Vec<&str> = lowered.split('.').collect();

    // Longest suffix first; a single label always qualifies.
    let suffix_len = (2..=lowered_labels.len())
        .rev()
        .find(|&n| resolver.is_public_suffix(&lowered_labels[lowered_labels.len() - n..].join(".")))
        .unwrap_or(1);

    let root_len = (suffix_len + 1).min(labels.len());
    let split_at = labels.len() - root_len;

    let subdomain = (split_at > 0).then(|| labels[..split_at].join("."));
    Ok(SplitDomain {
        domain: labels[split_at..].join("."),
        subdomain,
    })
}
