use arc_swap::ArcSwap;
use http::{HeaderName, HeaderValue};
use std::sync::Arc;

/// The rotating credential material attached to outbound requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub admin_key: Option<String>,
}

/// Computes the auth headers for a request from the current credential set.
///
/// Reads are lock-free: rotation (`set_access_token`/`set_refresh_token`)
/// swaps in a new `Arc<CredentialSet>` without blocking concurrent readers,
/// the same read-mostly/write-rare shape the circuit breaker addresses with
/// a plain atomic, generalized here to a struct-sized value.
pub struct Authenticator {
    credentials: ArcSwap<CredentialSet>,
}

impl Authenticator {
    pub fn new(credentials: CredentialSet) -> Self {
        Self {
            credentials: ArcSwap::from_pointee(credentials),
        }
    }

    pub fn credentials(&self) -> Arc<CredentialSet> {
        self.credentials.load_full()
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.credentials.rcu(|current| {
            let mut next = (**current).clone();
            next.access_token = Some(token.clone());
            next
        });
    }

    pub fn set_refresh_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.credentials.rcu(|current| {
            let mut next = (**current).clone();
            next.refresh_token = Some(token.clone());
            next
        });
    }

    /// Returns `(Authorization, X-Admin-Key)` header pairs to attach, in the
    /// order: access token beats API key beats no auth; admin key is
    /// additive and only attached for admin-resource requests.
    pub fn header_for(
        &self,
        is_admin_resource: bool,
    ) -> (
        Option<(HeaderName, HeaderValue)>,
        Option<(HeaderName, HeaderValue)>,
    ) {
        let creds = self.credentials.load();

        let auth = match (&creds.access_token, &creds.api_key) {
            (Some(token), _) if !token.is_empty() => bearer(token),
            (_, Some(key)) if !key.is_empty() => bearer(key),
            _ => None,
        };

        let admin = if is_admin_resource {
            creds
                .admin_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .and_then(|key| {
                    HeaderValue::from_str(key)
                        .ok()
                        .map(|v| (HeaderName::from_static("x-admin-key"), v))
                })
        } else {
            None
        };

        (auth, admin)
    }
}

fn bearer(value: &str) -> Option<(HeaderName, HeaderValue)> {
    HeaderValue::from_str(&format!("Bearer {value}"))
        .ok()
        .map(|v| (http::header::AUTHORIZATION, v))
}
