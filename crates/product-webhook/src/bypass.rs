use std::collections::HashSet;
use std::fmt;

/// Caller lists consulted before any policy runs.
#[derive(Clone, Debug, Default)]
pub struct BypassRules {
    pub blacklist_users: HashSet<String>,
    pub blacklist_namespaces: HashSet<String>,
    pub system_users: HashSet<String>,
    pub system_namespaces: HashSet<String>,
}

/// Outcome of [`BypassRules::classify`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bypass {
    /// Regular caller, the policies decide.
    None,
    BlacklistedUser(String),
    BlacklistedNamespace(String),
    SystemUser(String),
    SystemNamespace(String),
}

impl Bypass {
    pub fn is_denied(&self) -> bool {
        matches!(
            self,
            Bypass::BlacklistedUser(_) | Bypass::BlacklistedNamespace(_)
        )
    }

    pub fn is_trusted(&self) -> bool {
        matches!(self, Bypass::SystemUser(_) | Bypass::SystemNamespace(_))
    }
}

impl fmt::Display for Bypass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bypass::None => write!(f, "no bypass"),
            Bypass::BlacklistedUser(user) => write!(f, "user {user} is blacklisted"),
            Bypass::BlacklistedNamespace(ns) => write!(f, "namespace {ns} is blacklisted"),
            Bypass::SystemUser(user) => write!(f, "user {user} is a system user"),
            Bypass::SystemNamespace(ns) => write!(f, "namespace {ns} is a system namespace"),
        }
    }
}

impl BypassRules {
    /// Classify a caller. First match wins, in this order: blacklisted
    /// user, blacklisted namespace, system user, system namespace. A
    /// blacklisted caller is denied even when it is also trusted.
    pub fn classify(&self, username: &str, namespace: &str) -> Bypass {
        if self.blacklist_users.contains(username) {
            return Bypass::BlacklistedUser(username.to_owned());
        }
        if self.blacklist_namespaces.contains(namespace) {
            return Bypass::BlacklistedNamespace(namespace.to_owned());
        }
        if self.system_users.contains(username) {
            return Bypass::SystemUser(username.to_owned());
        }
        if self.system_namespaces.contains(namespace) {
            return Bypass::SystemNamespace(namespace.to_owned());
        }
        Bypass::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[fixture]
    fn rules() -> BypassRules {
        BypassRules {
            blacklist_users: set(&["mallory", "both"]),
            blacklist_namespaces: set(&["quarantine"]),
            system_users: set(&["system:admin", "both"]),
            system_namespaces: set(&["kube-system"]),
        }
    }

    #[rstest]
    #[case::regular("alice", "shop", Bypass::None)]
    #[case::blacklisted_user("mallory", "shop", Bypass::BlacklistedUser("mallory".to_owned()))]
    #[case::blacklisted_namespace("alice", "quarantine", Bypass::BlacklistedNamespace("quarantine".to_owned()))]
    #[case::system_user("system:admin", "shop", Bypass::SystemUser("system:admin".to_owned()))]
    #[case::system_namespace("alice", "kube-system", Bypass::SystemNamespace("kube-system".to_owned()))]
    #[case::blacklist_beats_system_user("both", "shop", Bypass::BlacklistedUser("both".to_owned()))]
    #[case::blacklisted_namespace_beats_system_user("system:admin", "quarantine", Bypass::BlacklistedNamespace("quarantine".to_owned()))]
    #[case::user_checked_before_namespace("mallory", "quarantine", Bypass::BlacklistedUser("mallory".to_owned()))]
    #[case::empty_user("", "shop", Bypass::None)]
    fn classify(
        rules: BypassRules,
        #[case] user: &str,
        #[case] namespace: &str,
        #[case] expected: Bypass,
    ) {
        assert_eq!(rules.classify(user, namespace), expected);
    }

    #[test]
    fn denied_and_trusted_are_disjoint() {
        let denied = Bypass::BlacklistedUser("x".to_owned());
        assert!(denied.is_denied());
        assert!(!denied.is_trusted());

        let trusted = Bypass::SystemNamespace("kube-system".to_owned());
        assert!(trusted.is_trusted());
        assert!(!trusted.is_denied());

        assert!(!Bypass::None.is_denied());
        assert!(!Bypass::None.is_trusted());
    }
}
