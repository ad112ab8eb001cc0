//! Shared wire types: integer-coded enums, 0/1 flags and the generic
//! acknowledgement body.
//!
//! # Design
//! The backend encodes every enumeration as a small integer. Each enum here
//! keeps an `Unknown(code)` variant so a newer server that introduces a code
//! never breaks decoding on an older client.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! int_code {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "u8", into = "u8")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A code this client does not recognize.
            Unknown(u8),
        }

        impl From<u8> for $name {
            fn from(code: u8) -> Self {
                match code {
                    $($code => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $($name::$variant => $code,)+
                    $name::Unknown(code) => code,
                }
            }
        }

        impl $name {
            pub fn code(self) -> u8 {
                self.into()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    };
}

int_code! {
    /// Kind of messaging destination.
    ChannelType {
        Person = 1,
        Group = 2,
        CustomerService = 3,
        Community = 4,
        CommunityTopic = 5,
        News = 6,
        Livestream = 9,
        Visitor = 10,
        SingleAgent = 11,
        GroupAgent = 12,
    }
}

int_code! {
    /// Which address family `/route` should return.
    IntranetType {
        External = 0,
        Internal = 1,
    }
}

int_code! {
    OnlineStatus {
        Offline = 0,
        Online = 1,
    }
}

int_code! {
    /// Whether conversation sync returns everything or only unread conversations.
    OnlyUnreadMode {
        All = 0,
        Unread = 1,
    }
}

int_code! {
    DeviceFlag {
        App = 0,
        Web = 1,
        Pc = 2,
    }
}

int_code! {
    /// Master devices can kick slaves; slaves cannot kick anyone.
    DeviceLevel {
        Slave = 0,
        Master = 1,
    }
}

int_code! {
    /// Direction of a message-history pull relative to `start_message_seq`.
    PullMode {
        Down = 0,
        Up = 1,
    }
}

impl Default for IntranetType {
    fn default() -> Self {
        IntranetType::External
    }
}

impl Default for OnlyUnreadMode {
    fn default() -> Self {
        OnlyUnreadMode::All
    }
}

impl Default for DeviceFlag {
    fn default() -> Self {
        DeviceFlag::App
    }
}

impl Default for DeviceLevel {
    fn default() -> Self {
        DeviceLevel::Master
    }
}

impl Default for PullMode {
    fn default() -> Self {
        PullMode::Down
    }
}

/// Body returned by endpoints that only acknowledge a mutation.
///
/// Backend builds answer with `{"status":"ok"}`, `{"status":200}` or an empty
/// body; all of them decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default, deserialize_with = "string_or_number")]
    pub status: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Decode `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `bool` carried as `0`/`1` on the wire.
pub(crate) mod int_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(Option::<u8>::deserialize(deserializer)?.unwrap_or_default() != 0)
    }
}

/// `Option<bool>` carried as `0`/`1`; pair with `skip_serializing_if`.
pub(crate) mod opt_int_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(flag) => serializer.serialize_some(&u8::from(*flag)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        Ok(Option::<u8>::deserialize(deserializer)?.map(|v| v != 0))
    }
}
