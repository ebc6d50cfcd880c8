// ABOUTME: Codec configuration: naming policies and the sum-encoding strategy.
// ABOUTME: Constructed once by the caller and shared read-only across every encode/decode call.

/// A pure name transform applied to field names or constructor tags.
///
/// The same modifier runs on both the encode and decode paths, so decoding
/// always compares modified names against the input, never raw ones.
pub type NameModifier = fn(&str) -> String;

/// The wire shape used to encode a sum type's tag and payload together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SumEncoding {
    /// `{tag_key: "Tag", value_key: payload}` — except that a record-shaped
    /// payload has the tag merged into its own object as a leading key
    /// instead of being wrapped under `value_key`.
    TaggedObject {
        /// Key holding the alternative's tag.
        tag_key: String,
        /// Key holding the payload when it is not record-shaped.
        value_key: String,
    },
    /// `{"Tag": payload}` — a one-entry object keyed by the tag.
    ObjectWithSingleField,
    /// `["Tag", payload]` — a two-element array.
    TwoElementArray,
}

impl SumEncoding {
    /// Shorthand for [`SumEncoding::TaggedObject`] with owned keys.
    #[must_use]
    pub fn tagged(tag_key: &str, value_key: &str) -> Self {
        SumEncoding::TaggedObject {
            tag_key: tag_key.to_owned(),
            value_key: value_key.to_owned(),
        }
    }
}

impl Default for SumEncoding {
    fn default() -> Self {
        SumEncoding::tagged("tag", "value")
    }
}

/// Configuration for derived codecs.
///
/// Built once, never mutated mid-traversal; every encode/decode call
/// borrows it read-only, so one `Options` can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Options {
    /// Transform applied to every record field name before emission/lookup.
    pub field_name_modifier: NameModifier,
    /// Transform applied to every alternative tag name.
    pub constructor_name_modifier: NameModifier,
    /// Suppress absent optional record fields instead of emitting `null`.
    pub omit_absent_optional_fields: bool,
    /// When every alternative of a sum is payload-free, encode/decode the
    /// sum as a bare string holding the (modified) tag.
    pub nullary_alternatives_as_string: bool,
    /// Fail record decoding on object keys that match no field name.
    pub reject_unknown_fields: bool,
    /// Wire shape for sums that are not covered by the nullary-as-string rule.
    pub sum_encoding: SumEncoding,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            field_name_modifier: case::identity,
            constructor_name_modifier: case::identity,
            omit_absent_optional_fields: false,
            nullary_alternatives_as_string: true,
            reject_unknown_fields: false,
            sum_encoding: SumEncoding::default(),
        }
    }
}

/// Ready-made name modifiers covering the conventional rename styles.
pub mod case {
    /// Leaves the name untouched.
    #[must_use]
    pub fn identity(name: &str) -> String {
        name.to_owned()
    }

    /// `first_name` / `FirstName` → `firstName`.
    #[must_use]
    pub fn to_camel_case(name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        for (i, word) in words(name).iter().enumerate() {
            if i == 0 {
                out.push_str(word);
            } else {
                out.push_str(&capitalize(word));
            }
        }
        out
    }

    /// `firstName` / `FirstName` → `first_name`.
    #[must_use]
    pub fn to_snake_case(name: &str) -> String {
        words(name).join("_")
    }

    /// `first_name` / `firstName` → `FirstName`.
    #[must_use]
    pub fn to_pascal_case(name: &str) -> String {
        words(name).iter().map(|w| capitalize(w)).collect()
    }

    /// `firstName` → `first-name`.
    #[must_use]
    pub fn to_kebab_case(name: &str) -> String {
        words(name).join("-")
    }

    /// `firstName` → `FIRST_NAME`.
    #[must_use]
    pub fn to_screaming_snake_case(name: &str) -> String {
        words(name)
            .iter()
            .map(|w| w.to_uppercase())
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Split a name into lowercase words at `_`, `-`, whitespace, and
    /// lower-to-upper case boundaries.
    fn words(name: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut prev_lower = false;
        for c in name.chars() {
            if c == '_' || c == '-' || c.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                prev_lower = false;
            } else if c.is_uppercase() && prev_lower {
                words.push(std::mem::take(&mut current));
                current.extend(c.to_lowercase());
                prev_lower = false;
            } else {
                prev_lower = c.is_lowercase() || c.is_ascii_digit();
                current.extend(c.to_lowercase());
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
    }

    fn capitalize(word: &str) -> String {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

}
