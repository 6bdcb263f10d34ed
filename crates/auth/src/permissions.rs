use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. `"tariffs.update"`). The special
/// wildcard `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission::from_static("*");

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

/// Permissions the back-office screens check.
pub mod catalog {
    use super::Permission;

    pub const TARIFFS_READ: Permission = Permission::from_static("tariffs.read");
    pub const TARIFFS_CREATE: Permission = Permission::from_static("tariffs.create");
    pub const TARIFFS_UPDATE: Permission = Permission::from_static("tariffs.update");
    pub const TARIFFS_DELETE: Permission = Permission::from_static("tariffs.delete");
    pub const TARIFFS_IMPORT: Permission = Permission::from_static("tariffs.import");

    pub const CITIES_READ: Permission = Permission::from_static("cities.read");
    pub const CITIES_MANAGE: Permission = Permission::from_static("cities.manage");

    pub const EXPEDITIONS_READ: Permission = Permission::from_static("expeditions.read");
    pub const EXPEDITIONS_UPDATE: Permission = Permission::from_static("expeditions.update");
    pub const EXPEDITIONS_RECEIVE: Permission = Permission::from_static("expeditions.receive");

    pub const SLIPS_READ: Permission = Permission::from_static("slips.read");
    pub const SLIPS_SCAN: Permission = Permission::from_static("slips.scan");
    pub const SLIPS_UPDATE: Permission = Permission::from_static("slips.update");

    pub const INVOICES_READ: Permission = Permission::from_static("invoices.read");
    pub const INVOICES_MANAGE: Permission = Permission::from_static("invoices.manage");

    pub const STOCK_READ: Permission = Permission::from_static("stock.read");

    pub const USERS_READ: Permission = Permission::from_static("users.read");
    pub const USERS_CREATE: Permission = Permission::from_static("users.create");
    pub const USERS_UPDATE: Permission = Permission::from_static("users.update");
    pub const USERS_DELETE: Permission = Permission::from_static("users.delete");

    pub const SETTINGS_READ: Permission = Permission::from_static("settings.read");
    pub const SETTINGS_UPDATE: Permission = Permission::from_static("settings.update");
}

/// Permission list held by a session, as last fetched from the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<Permission>);

impl PermissionSet {
    pub fn new(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self(permissions.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_wildcard(&self) -> bool {
        self.0.iter().any(Permission::is_wildcard)
    }

    /// True iff `permission` or `"*"` is held.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0
            .iter()
            .any(|p| p.is_wildcard() || p.as_str() == permission)
    }

    /// True if at least one of `permissions` is held. An empty list is never satisfied.
    pub fn has_any_permission<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        permissions.iter().any(|p| self.has_permission(p.as_ref()))
    }

    /// True if every one of `permissions` is held. An empty list is always satisfied.
    pub fn has_all_permissions<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        permissions.iter().all(|p| self.has_permission(p.as_ref()))
    }

    /// The subset of `permissions` that is not held, in input order.
    pub fn missing<'a, P: AsRef<str>>(&self, permissions: &'a [P]) -> Vec<&'a str> {
        permissions
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| !self.has_permission(p))
            .collect()
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(perms: &[&'static str]) -> PermissionSet {
        perms.iter().copied().map(Permission::from_static).collect()
    }

    #[test]
    fn wildcard_grants_everything() {
        let perms = set(&["*"]);
        assert!(perms.has_permission("tariffs.delete"));
        assert!(perms.has_all_permissions(&["a", "b"]));
    }

    #[test]
    fn any_and_all_on_empty_inputs() {
        let perms = set(&["tariffs.read"]);
        let none: [&str; 0] = [];
        assert!(!perms.has_any_permission(&none));
        assert!(perms.has_all_permissions(&none));
    }

    #[test]
    fn missing_lists_unheld_permissions() {
        let perms = set(&["users.read"]);
        assert_eq!(
            perms.missing(&["users.read", "users.create", "users.delete"]),
            vec!["users.create", "users.delete"]
        );
    }

    proptest! {
        #[test]
        fn has_permission_iff_present_or_wildcard(
            held in proptest::collection::vec("[a-c]\\.[a-c]|\\*", 0..6),
            probe in "[a-c]\\.[a-c]",
        ) {
            let perms: PermissionSet = held.iter().cloned().map(Permission::new).collect();
            let expected = held.iter().any(|p| p == "*" || *p == probe);
            prop_assert_eq!(perms.has_permission(&probe), expected);
        }
    }
}
