use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Maps the role strings used by both backend variants. Anything that is
    /// not the user is treated as the assistant, which includes `system`.
    pub fn parse(text: &str) -> Role {
        if text.eq_ignore_ascii_case("user") {
            return Role::User;
        }

        return Role::Assistant;
    }

    pub fn display_name(&self) -> String {
        match self {
            Role::User => return Config::get(ConfigKey::Username),
            Role::Assistant => return String::from("Tutor"),
        }
    }
}
