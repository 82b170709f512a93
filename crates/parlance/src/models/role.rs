use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::errors::{AstError, AstResult};

/// The speaker of a message in a conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    System,
    Assistant,
}

impl Role {
    /// Parse a wire role name, failing on anything outside the known set.
    pub fn parse(name: &str) -> AstResult<Role> {
        name.parse()
            .map_err(|_| AstError::UnsupportedRole(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_roles() -> anyhow::Result<()> {
        assert_eq!(Role::parse("user")?, Role::User);
        assert_eq!(Role::parse("system")?, Role::System);
        assert_eq!(Role::parse("assistant")?, Role::Assistant);
        Ok(())
    }

    #[test]
    fn parse_unknown_role_fails() {
        let err = Role::parse("zzz").unwrap_err();
        assert_eq!(err, AstError::UnsupportedRole("zzz".to_string()));
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
