//! Request exclusion predicates.

use std::fmt;
use std::sync::Arc;

use crate::config::FilterConfig;
use crate::events::RequestDescriptor;

type Predicate = dyn Fn(&RequestDescriptor) -> bool + Send + Sync;

/// Excludes every request it matches from start and completion logging.
#[derive(Clone)]
pub struct RequestFilter {
    predicate: Arc<Predicate>,
}

impl RequestFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&RequestDescriptor) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Build a filter from declarative rules. Returns `None` when there are
    /// no rules.
    pub fn from_config(config: &FilterConfig) -> Option<Self> {
        if config.is_empty() {
            return None;
        }

        let rules = config.clone();
        Some(Self::new(move |request| {
            rules.methods.iter().any(|m| m.eq_ignore_ascii_case(request.method().as_str()))
                || rules.path_prefixes.iter().any(|p| request.url().path().starts_with(p.as_str()))
                || request
                    .url()
                    .host_str()
                    .is_some_and(|host| rules.hosts.iter().any(|pattern| host_matches(pattern, host)))
        }))
    }

    pub fn matches(&self, request: &RequestDescriptor) -> bool {
        (self.predicate)(request)
    }
}

impl fmt::Debug for RequestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestFilter").finish_non_exhaustive()
    }
}

/// `*.example.com` matches any subdomain of example.com; anything else is an
/// exact, case-insensitive host match.
fn host_matches(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(suffix) => {
            host.len() > suffix.len() + 1
                && host.to_ascii_lowercase().ends_with(&format!(".{}", suffix.to_ascii_lowercase()))
        }
        None => pattern.eq_ignore_ascii_case(host),
    }
}
