//! Discord snowflake identifiers.

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }
        }
    };
}

snowflake!(
    /// Guild (server) identifier.
    GuildId
);
snowflake!(
    /// User identifier.
    UserId
);
snowflake!(
    /// Text channel identifier.
    ChannelId
);
snowflake!(
    /// Role identifier.
    RoleId
);
