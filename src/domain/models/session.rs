#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::fmt;

use chrono::Utc;
use rand::Rng;
use serde_derive::Deserialize;
use serde_derive::Serialize;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Opaque conversation identifier, either generated locally or issued by the
/// backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: &str) -> SessionId {
        return SessionId(id.to_string());
    }

    /// `session-{unix millis}-{random base36}`. Unique enough for one user;
    /// no cross-process guarantee.
    pub fn generate() -> SessionId {
        let mut rng = rand::thread_rng();
        let suffix = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..SUFFIX_ALPHABET.len());
                return SUFFIX_ALPHABET[idx] as char;
            })
            .collect::<String>();

        return SessionId(format!(
            "session-{}-{suffix}",
            Utc::now().timestamp_millis()
        ));
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}
