use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier carried in token claims.
///
/// Roles are opaque strings; the only role with special meaning is
/// [`Role::ADMIN`], which the role gate requires for privileged operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// The single privileged role.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == Self::ADMIN.as_str()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_compared_by_value() {
        assert!(Role::new("admin".to_string()).is_admin());
        assert!(!Role::new("viewer").is_admin());
        // Case matters: "Admin" is just another role.
        assert!(!Role::new("Admin").is_admin());
    }
}
