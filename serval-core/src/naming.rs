//! Naming conventions used to turn resource names into handler identifiers.
//!
//! Resource names come from URL segments (`sessions`, `categories`) while
//! handlers are named after the singular, capitalized noun (`Session`,
//! `Category`). The transformations here only cover regular English plurals:
//!
//! | plural        | singular   |
//! |---------------|------------|
//! | `sessions`    | `session`  |
//! | `categories`  | `category` |
//! | `boxes`       | `box`      |
//! | `addresses`   | `address`  |
//! | `watches`     | `watch`    |
//!
//! Irregular nouns (`people`, `children`, `mice`) and words whose singular
//! already ends in `-ie`/`-che`/`-us` (`movies`, `pies`, `caches`, `status`) are a
//! known limitation: they are transformed by the regular rules and will map
//! to the wrong handler name. Name such resources after their regular form.

use crate::Error;

/// Uppercase the first character of `s`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] on empty input: a handler identifier must
/// never be built from an empty resource name.
pub fn capitalize(s: &str) -> Result<String, Error> {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => Ok(first.to_uppercase().chain(chars).collect()),
        None => Err(Error::InvalidInput(
            "cannot capitalize an empty resource name".to_string(),
        )),
    }
}

/// Turn a regular English plural into its singular form.
///
/// Case is preserved; words that do not look plural are returned unchanged.
pub fn singularize(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let strip = |n: usize| s[..s.len() - n].to_string();

    if lower.len() > 3 && lower.ends_with("ies") {
        // categories -> category
        let mut singular = strip(3);
        singular.push(if s.ends_with("IES") { 'Y' } else { 'y' });
        singular
    } else if lower.ends_with("sses")
        || lower.ends_with("xes")
        || lower.ends_with("zzes")
        || lower.ends_with("ches")
        || lower.ends_with("shes")
    {
        strip(2)
    } else if lower.len() > 1 && lower.ends_with('s') && !lower.ends_with("ss") {
        strip(1)
    } else {
        s.to_string()
    }
}

/// Turn a singular English noun into its regular plural form.
pub fn pluralize(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let upper = !s.is_empty() && s.chars().all(|c| !c.is_ascii_lowercase());

    let consonant_y = lower.ends_with('y')
        && lower
            .chars()
            .rev()
            .nth(1)
            .is_some_and(|c| c.is_ascii_alphabetic() && !"aeiou".contains(c));

    let (stem, ending) = if consonant_y {
        (&s[..s.len() - 1], "ies")
    } else if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        (s, "es")
    } else {
        (s, "s")
    };

    if upper {
        format!("{}{}", stem, ending.to_ascii_uppercase())
    } else {
        format!("{}{}", stem, ending)
    }
}

/// Handler base name for a resource: singular, capitalized.
///
/// `sessions` -> `Session`.
pub fn base_name(resource: &str) -> Result<String, Error> {
    capitalize(&singularize(resource))
}

/// Simple (unqualified) handler name: `{Prefix}{Base}{Suffix}`.
///
/// `prefix` is capitalized when present, so a `json` prefix with resource
/// `sessions` and suffix `Serializer` gives `JsonSessionSerializer`.
pub fn class_name(prefix: Option<&str>, resource: &str, suffix: &str) -> Result<String, Error> {
    let mut name = match prefix {
        Some(prefix) => capitalize(prefix)?,
        None => String::new(),
    };
    name.push_str(&base_name(resource)?);
    name.push_str(suffix);
    Ok(name)
}

/// Join a namespace and a simple name with `.`; an empty namespace yields
/// the simple name on its own.
pub fn qualify(namespace: &str, simple: &str) -> String {
    if namespace.is_empty() {
        simple.to_string()
    } else {
        format!("{}.{}", namespace, simple)
    }
}
