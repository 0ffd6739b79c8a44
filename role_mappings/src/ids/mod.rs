//! Platform-assigned snowflake identifiers.

use serde::{Deserialize, Serialize};

use crate::MappingError;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Get the raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake_id!(
    /// Identifier of a guild (the community a message and its roles live in).
    GuildId
);
snowflake_id!(
    /// Identifier of a tracked message.
    MessageId
);
snowflake_id!(
    /// Identifier of a grantable role.
    RoleId
);
snowflake_id!(
    /// Identifier of a platform user.
    UserId
);

/// A complete guild/message/role association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mapping {
    pub guild: GuildId,
    pub message: MessageId,
    pub role: RoleId,
}

impl Mapping {
    /// Create a mapping from identifiers that are known to be present.
    pub fn new(guild: GuildId, message: MessageId, role: RoleId) -> Self {
        Self {
            guild,
            message,
            role,
        }
    }

    /// Build a mapping from optional parts, as delivered by command options.
    ///
    /// Fails with [`MappingError::InvalidArgument`] naming the first absent identifier.
    pub fn from_parts(
        guild: Option<GuildId>,
        message: Option<MessageId>,
        role: Option<RoleId>,
    ) -> Result<Self, MappingError> {
        let guild = guild.ok_or(MappingError::InvalidArgument("guild id"))?;
        let message = message.ok_or(MappingError::InvalidArgument("message id"))?;
        let role = role.ok_or(MappingError::InvalidArgument("role id"))?;
        Ok(Self::new(guild, message, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&GuildId(933960413534617611)).unwrap();
        assert_eq!(json, "933960413534617611");

        let role: RoleId = serde_json::from_str("42").unwrap();
        assert_eq!(role, RoleId(42));
    }

    #[test]
    fn test_from_parts_complete() {
        let mapping =
            Mapping::from_parts(Some(GuildId(1)), Some(MessageId(2)), Some(RoleId(3))).unwrap();
        assert_eq!(mapping, Mapping::new(GuildId(1), MessageId(2), RoleId(3)));
    }

    #[test]
    fn test_from_parts_reports_missing_id() {
        let err = Mapping::from_parts(Some(GuildId(1)), None, Some(RoleId(3))).unwrap_err();
        assert!(matches!(err, MappingError::InvalidArgument("message id")));

        let err = Mapping::from_parts(None, None, None).unwrap_err();
        assert!(matches!(err, MappingError::InvalidArgument("guild id")));
    }
}
