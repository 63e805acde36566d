//! Member identifier rules for dynamically attached behaviors.

/// Returns `true` if `name` can be used as a member name.
///
/// The first character must be an ASCII letter, `_`, or any non-ASCII
/// character; the remaining characters may additionally be ASCII digits.
pub fn is_valid_member_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_start(first) => chars.all(|c| is_start(c) || c.is_ascii_digit()),
        _ => false,
    }
}

fn is_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_conventional_names() {
        for name in ["greet", "_private", "toString", "snake_case_2", "ünïcode", "x"] {
            assert!(is_valid_member_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in ["", "123bad", "has space", "dash-ed", "dot.ted", "semi;", "9"] {
            assert!(!is_valid_member_name(name), "{name:?} should be invalid");
        }
    }

    proptest! {
        /// Property: a leading ASCII digit always disqualifies a name.
        #[test]
        fn leading_digit_is_never_valid(rest in "[A-Za-z0-9_]{0,16}", digit in 0u8..10) {
            let name = format!("{digit}{rest}");
            prop_assert!(!is_valid_member_name(&name));
        }

        #[test]
        fn identifier_shaped_names_are_valid(name in "[A-Za-z_][A-Za-z0-9_]{0,32}") {
            prop_assert!(is_valid_member_name(&name));
        }
    }
}
