//! Authorization collaborator
//!
//! Identity and role management live with an external identity provider.
//! The services only ask one question: may this principal exercise this
//! capability? The answer comes from an [`Authorizer`].

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// **A named permission**
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Capability {
    /// Listing and reading transactions
    #[serde(rename = "view-transactions")]
    ViewTransactions,
    /// Reconciling transactions
    #[serde(rename = "execute-reconciliation")]
    ExecuteReconciliation,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewTransactions => "view-transactions",
            Capability::ExecuteReconciliation => "execute-reconciliation",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity a bearer token resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Principal(pub String);

impl Principal {
    /// The principal used when authorization is switched off.
    pub fn anonymous() -> Self {
        Principal("anonymous".to_string())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// **Resolves bearer tokens and answers capability checks**
pub trait Authorizer: Send + Sync {
    /// Maps a bearer token to a principal; `None` for unknown tokens.
    fn authenticate(&self, token: &str) -> Option<Principal>;

    /// `true` if `principal` holds `capability`.
    fn authorize(&self, principal: &Principal, capability: Capability) -> bool;

    /// Whether requests need a bearer token at all.
    fn requires_token(&self) -> bool {
        true
    }
}

/// Grants every capability to everyone. For local development.
#[derive(Debug, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authenticate(&self, _token: &str) -> Option<Principal> {
        Some(Principal::anonymous())
    }

    fn authorize(&self, _principal: &Principal, _capability: Capability) -> bool {
        true
    }

    fn requires_token(&self) -> bool {
        false
    }
}

/// A bearer token, the principal it stands for, and what it may do.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TokenGrant {
    pub token: String,
    pub principal: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

/// **A fixed table of tokens and capabilities**
///
/// Stands in for the identity provider; loaded from configuration.
#[derive(Debug, Default)]
pub struct StaticTokenAuthorizer {
    principals: HashMap<String, Principal>,
    grants: HashMap<Principal, HashSet<Capability>>,
}

impl StaticTokenAuthorizer {
    pub fn new(grants: impl IntoIterator<Item = TokenGrant>) -> Self {
        let mut authorizer = Self::default();
        for grant in grants {
            let principal = Principal(grant.principal);
            authorizer
                .grants
                .entry(principal.clone())
                .or_default()
                .extend(grant.capabilities);
            authorizer.principals.insert(grant.token, principal);
        }
        authorizer
    }
}

impl Authorizer for StaticTokenAuthorizer {
    fn authenticate(&self, token: &str) -> Option<Principal> {
        self.principals.get(token).cloned()
    }

    fn authorize(&self, principal: &Principal, capability: Capability) -> bool {
        self.grants
            .get(principal)
            .map_or(false, |caps| caps.contains(&capability))
    }
}

/// **Extracts the token from an `Authorization` header value**
///
/// Accepts `Bearer <token>`, case-insensitive on the scheme.
/// Returns `None` for any other scheme or an empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authorizer() -> StaticTokenAuthorizer {
        StaticTokenAuthorizer::new([
            TokenGrant {
                token: "viewer-token".to_string(),
                principal: "auditor".to_string(),
                capabilities: vec![Capability::ViewTransactions],
            },
            TokenGrant {
                token: "service-token".to_string(),
                principal: "settlement-service".to_string(),
                capabilities: vec![
                    Capability::ViewTransactions,
                    Capability::ExecuteReconciliation,
                ],
            },
        ])
    }

    #[test]
    fn known_token_resolves() {
        assert_eq!(
            Some(Principal("auditor".to_string())),
            authorizer().authenticate("viewer-token")
        );
        assert_eq!(None, authorizer().authenticate("nope"));
    }

    #[test]
    fn capabilities_are_checked() {
        let authz = authorizer();
        let auditor = Principal("auditor".to_string());
        let service = Principal("settlement-service".to_string());

        assert!(authz.authorize(&auditor, Capability::ViewTransactions));
        assert!(!authz.authorize(&auditor, Capability::ExecuteReconciliation));
        assert!(authz.authorize(&service, Capability::ExecuteReconciliation));
        assert!(!authz.authorize(&Principal::anonymous(), Capability::ViewTransactions));
    }

    #[test]
    fn allow_all_allows() {
        assert!(!AllowAll.requires_token());
        assert!(AllowAll.authorize(&Principal::anonymous(), Capability::ExecuteReconciliation));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(Some("abc"), bearer_token("Bearer abc"));
        assert_eq!(Some("abc"), bearer_token("bearer   abc "));
        assert_eq!(None, bearer_token("Basic abc"));
        assert_eq!(None, bearer_token("Bearer "));
        assert_eq!(None, bearer_token("abc"));
    }

    #[test]
    fn capability_names() {
        assert_eq!(
            "\"execute-reconciliation\"",
            serde_json::to_string(&Capability::ExecuteReconciliation).unwrap()
        );
        assert_eq!("view-transactions", Capability::ViewTransactions.to_string());
    }
}
