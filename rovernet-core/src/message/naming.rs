/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Name validation for actions, services, and topics.
//!
//! Every name stored in a registry is validated once, at registration time.
//! Characters outside the whitelist (protocol delimiters, control characters,
//! punctuation) must never reach the wire, so the registries only ever hold
//! previously-validated names and dispatch needs no per-message check.

/// Characters permitted in action, service, and topic names.
pub const NAME_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ";

/// Returns whether `name` is a valid action, service, or topic name.
///
/// A valid name is non-empty and consists entirely of characters from
/// [`NAME_ALPHABET`] (ASCII letters, digits, and space). The empty string is
/// rejected because an empty key cannot address a handler.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| NAME_ALPHABET.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_and_space() {
        assert!(is_valid_name("echo"));
        assert!(is_valid_name("Echo Service 2"));
        assert!(is_valid_name("UPPER lower 0123456789"));
    }

    #[test]
    fn rejects_underscore() {
        assert!(!is_valid_name("test_action"));
    }

    #[test]
    fn rejects_protocol_delimiters_and_control_characters() {
        assert!(!is_valid_name("echo\n"));
        assert!(!is_valid_name("a{b}"));
        assert!(!is_valid_name("name\"quoted\""));
        assert!(!is_valid_name("tab\tseparated"));
        assert!(!is_valid_name("dash-separated"));
    }

    #[test]
    fn rejects_empty_and_non_ascii() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("caf\u{e9}"));
    }
}
