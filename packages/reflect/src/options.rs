//! Decoder options.

use serde::{Deserialize, Serialize};

/// How the decoder treats null and unknown values that reach a target with
/// no way to represent them.
///
/// `Option<T>` targets always handle null (as `None`), so these flags only
/// matter for targets like `String`, `u32`, `Vec<T>` or plain structs. When a
/// flag is set, the unhandled value decodes to the target's empty value
/// (`""`, `0`, `false`, an empty collection, a struct of empty fields).
/// When it is clear, decoding fails with a `DecodeError` naming the path.
///
/// Options deserialize with every field optional, so hosts can embed them in
/// their own configuration:
///
/// ```rust
/// use tfattr_reflect::Options;
///
/// let opts: Options = serde_json::from_str(r#"{"unhandled_null_as_empty": true}"#).unwrap();
/// assert!(opts.unhandled_null_as_empty);
/// assert!(!opts.unhandled_unknown_as_empty);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Decode unhandled nulls as the target's empty value.
    pub unhandled_null_as_empty: bool,
    /// Decode unhandled unknowns as the target's empty value.
    pub unhandled_unknown_as_empty: bool,
}

impl Options {
    /// Fail on any unhandled null or unknown.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Set both flags to `allow`.
    pub fn allow_unhandled(allow: bool) -> Self {
        Self {
            unhandled_null_as_empty: allow,
            unhandled_unknown_as_empty: allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_strict() {
        assert_eq!(Options::default(), Options::strict());
        assert!(!Options::strict().unhandled_null_as_empty);
    }

    #[test]
    fn allow_unhandled_sets_both() {
        let opts = Options::allow_unhandled(true);
        assert!(opts.unhandled_null_as_empty);
        assert!(opts.unhandled_unknown_as_empty);
    }

    #[test]
    fn serde_roundtrip() {
        let opts = Options::allow_unhandled(true);
        let json = serde_json::to_value(opts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "unhandled_null_as_empty": true,
                "unhandled_unknown_as_empty": true,
            })
        );
        let back: Options = serde_json::from_value(json).unwrap();
        assert_eq!(back, opts);
    }
}
