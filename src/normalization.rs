use serde::{Deserialize, Deserializer};

/// Normalizes a name by stripping surrounding whitespace and composing
/// it into Unicode Normalization Form C, so that the same drink typed
/// on two keyboards is stored identically.
///
/// ```
/// use vino::normalization::normalize_name;
/// assert_eq!(normalize_name(" Château\u{0020}"), "Château");
/// assert_eq!(normalize_name("Cha\u{0302}teau"), "Ch\u{00e2}teau");
/// ```
pub fn normalize_name(name: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    name.as_ref().trim().nfc().collect()
}

/// Deserializes a `String` after running it through `normalize_name`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(normalize_name(s))
}
