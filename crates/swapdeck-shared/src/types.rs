use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Identity of an [`Item`](crate::models::Item) in an inventory or deck.
    ItemId
}

uuid_id! {
    /// Identity of an [`Offer`](crate::models::Offer).
    OfferId
}

uuid_id! {
    /// Identity of the chat session attached to an offer (1:1).
    ChatId
}

uuid_id! {
    /// Identity of a single chat [`Message`](crate::models::Message).
    MessageId
}

uuid_id! {
    /// Identity of a user (the local user or a counterpart).
    UserId
}
