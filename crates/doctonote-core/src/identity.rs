//! Cache key derivation for doctor identities.
//!
//! Keys keep the historical `"<name>-<address>"` layout of the browser store.
//! `\` and `-` inside a field are escaped, so the mapping stays injective and
//! fields without either character produce exactly the historical key.
//! No normalization: two renderings of the same address are two keys.

use crate::types::Identity;

/// Separator between name and address.
pub const KEY_SEPARATOR: char = '-';

const ESCAPE: char = '\\';

/// Opaque cache key derived from an [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the cache key for an identity.
pub fn build_key(identity: &Identity) -> IdentityKey {
    let mut key = String::with_capacity(identity.name.len() + identity.address.len() + 1);
    push_escaped(&mut key, &identity.name);
    key.push(KEY_SEPARATOR);
    push_escaped(&mut key, &identity.address);
    IdentityKey(key)
}

fn push_escaped(out: &mut String, field: &str) {
    for c in field.chars() {
        if c == ESCAPE || c == KEY_SEPARATOR {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, address: &str) -> String {
        build_key(&Identity::new(name, address)).into_string()
    }

    #[test]
    fn test_plain_fields_use_historical_format() {
        assert_eq!(key("Dr. Martin", "12 Rue de Paris"), "Dr. Martin-12 Rue de Paris");
        assert_eq!(key("", ""), "-");
    }

    #[test]
    fn test_no_normalization() {
        assert_ne!(key("Dr. Martin", "12 rue de Paris"), key("Dr. Martin", "12 Rue de Paris"));
        assert_ne!(key("Dr. Martin ", "12 Rue de Paris"), key("Dr. Martin", "12 Rue de Paris"));
        assert_ne!(key("Dr. Hélène", "Lyon"), key("Dr. Helene", "Lyon"));
    }

    #[test]
    fn test_separator_inside_fields_stays_injective() {
        // Without escaping both would collapse to "a-b-c".
        assert_ne!(key("a-b", "c"), key("a", "b-c"));
        assert_eq!(key("Jean-Pierre", "Paris"), "Jean\\-Pierre-Paris");
    }

    #[test]
    fn test_escape_char_inside_fields_stays_injective() {
        assert_ne!(key("a\\", "-b"), key("a", "\\-b"));
        assert_ne!(key("a\\-", "b"), key("a", "-b"));
    }

    #[test]
    fn test_key_equality_iff_fields_equal() {
        let samples = [
            "", "-", "\\", "a", "a-", "-a", "a\\", "\\-", "Dr. Martin", "12 Rue de Paris",
            "Jean-Pierre", "a-b", "b-c",
        ];
        for n1 in samples {
            for a1 in samples {
                for n2 in samples {
                    for a2 in samples {
                        let same_identity = n1 == n2 && a1 == a2;
                        let same_key = key(n1, a1) == key(n2, a2);
                        assert_eq!(
                            same_identity, same_key,
                            "({:?},{:?}) vs ({:?},{:?})",
                            n1, a1, n2, a2
                        );
                    }
                }
            }
        }
    }
}
