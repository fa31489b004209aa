//! Device language detection.
//!
//! The QuickVerse service picks the best translation set from an ordered
//! preference list. This crate works out what the device prefers and builds
//! that list.

use std::env;

/// Environment variables consulted, highest priority first.
pub mod vars {
    pub const QUICKVERSE_LOCALE: &str = "QUICKVERSE_LOCALE";
    pub const LANGUAGE: &str = "LANGUAGE";
    pub const LC_ALL: &str = "LC_ALL";
    pub const LC_MESSAGES: &str = "LC_MESSAGES";
    pub const LANG: &str = "LANG";

    pub const ALL: [&str; 5] = [QUICKVERSE_LOCALE, LANGUAGE, LC_ALL, LC_MESSAGES, LANG];
}

/// Fallback when nothing usable is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Normalize a POSIX or BCP-47 locale string to a language tag.
///
/// `fr_FR.UTF-8` becomes `fr-FR`, `de_DE@euro` becomes `de-DE`. The `C` and
/// `POSIX` pseudo-locales carry no language and yield `None`.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_modifier = trimmed.split('@').next()?;
    let without_codeset = without_modifier.split('.').next()?;

    if without_codeset.is_empty()
        || without_codeset.eq_ignore_ascii_case("c")
        || without_codeset.eq_ignore_ascii_case("posix")
    {
        return None;
    }

    let mut parts = without_codeset.split(['_', '-']);
    let language = parts.next()?.to_ascii_lowercase();
    if language.len() < 2 || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut tag = language;
    for part in parts.filter(|p| !p.is_empty()) {
        tag.push('-');
        if part.len() == 2 {
            tag.push_str(&part.to_ascii_uppercase());
        } else {
            tag.push_str(part);
        }
    }
    Some(tag)
}

/// The primary language subtag of a tag (`pt-BR` gives `pt`).
pub fn language_of(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Collect device language tags using `lookup` to read variables.
///
/// Tags are ordered by variable priority, `LANGUAGE` may contain a
/// colon-separated list, and duplicates keep their first position.
pub fn detect_with<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut tags: Vec<String> = Vec::new();

    for var in vars::ALL {
        let Some(value) = lookup(var) else { continue };
        for candidate in value.split(':') {
            if let Some(tag) = normalize_tag(candidate) {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
    }

    tags
}

/// Detect the device language tags from the process environment, with a
/// platform lookup as a last resort.
pub fn device_language_tags() -> Vec<String> {
    let tags = detect_with(|var| env::var(var).ok());

    #[cfg(target_os = "macos")]
    let tags = if tags.is_empty() {
        detect_macos().into_iter().collect()
    } else {
        tags
    };

    tracing::trace!(?tags, "detected device languages");
    tags
}

/// The language code of the first tag in `tags`, or [`DEFAULT_LANGUAGE`]
/// when there is none.
pub fn primary_language(tags: &[String]) -> String {
    tags.first()
        .map(|tag| language_of(tag).to_string())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Build the comma-joined preference list sent to the service: the requested
/// code first, then the device tags, without repeating the requested code.
pub fn preference_list(requested: &str, device_tags: &[String]) -> String {
    let mut list = vec![requested];
    list.extend(
        device_tags
            .iter()
            .map(String::as_str)
            .filter(|tag| *tag != requested),
    );
    list.join(",")
}

/// Detect locale on macOS using defaults.
#[cfg(target_os = "macos")]
fn detect_macos() -> Option<String> {
    use std::process::Command;

    let output = Command::new("defaults")
        .args(["read", "-g", "AppleLocale"])
        .output()
        .ok()?;

    if output.status.success() {
        let locale = String::from_utf8_lossy(&output.stdout);
        return normalize_tag(&locale);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("fr_FR.UTF-8").as_deref(), Some("fr-FR"));
        assert_eq!(normalize_tag("de_DE@euro").as_deref(), Some("de-DE"));
        assert_eq!(normalize_tag("en-us").as_deref(), Some("en-US"));
        assert_eq!(normalize_tag("zh-Hans-CN").as_deref(), Some("zh-Hans-CN"));
        assert_eq!(normalize_tag("ES").as_deref(), Some("es"));
        assert_eq!(normalize_tag("C"), None);
        assert_eq!(normalize_tag("POSIX"), None);
        assert_eq!(normalize_tag("C.UTF-8"), None);
        assert_eq!(normalize_tag(""), None);
        assert_eq!(normalize_tag("1x"), None);
    }

    #[test]
    fn test_language_of() {
        assert_eq!(language_of("pt-BR"), "pt");
        assert_eq!(language_of("en"), "en");
    }

    #[test]
    fn test_priority_order() {
        let lookup = lookup_from(&[
            (vars::LANG, "de_DE.UTF-8"),
            (vars::LC_ALL, "fr_FR"),
            (vars::QUICKVERSE_LOCALE, "ja"),
        ]);
        assert_eq!(detect_with(lookup), vec!["ja", "fr-FR", "de-DE"]);
    }

    #[test]
    fn test_language_list_and_dedup() {
        let lookup = lookup_from(&[
            (vars::LANGUAGE, "pt_BR:pt:en"),
            (vars::LANG, "pt_BR.UTF-8"),
        ]);
        assert_eq!(detect_with(lookup), vec!["pt-BR", "pt", "en"]);
    }

    #[test]
    fn test_pseudo_locales_ignored() {
        let lookup = lookup_from(&[(vars::LC_ALL, "C"), (vars::LANG, "POSIX")]);
        assert!(detect_with(lookup).is_empty());
    }

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language(&["pt-BR".to_string(), "en".to_string()]), "pt");
        assert_eq!(primary_language(&[]), DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_preference_list() {
        let device = vec!["fr-FR".to_string(), "en".to_string()];
        assert_eq!(preference_list("es", &device), "es,fr-FR,en");
        assert_eq!(preference_list("en", &device), "en,fr-FR");
        assert_eq!(preference_list("it", &[]), "it");
    }

    #[test]
    #[serial]
    fn test_device_language_from_env() {
        let saved: Vec<(&str, Option<String>)> =
            vars::ALL.iter().map(|v| (*v, env::var(v).ok())).collect();
        for var in vars::ALL {
            env::remove_var(var);
        }

        env::set_var(vars::QUICKVERSE_LOCALE, "it_IT");
        let tags = device_language_tags();
        assert_eq!(tags.first().map(String::as_str), Some("it-IT"));
        assert_eq!(primary_language(&tags), "it");

        for (var, value) in saved {
            match value {
                Some(v) => env::set_var(var, v),
                None => env::remove_var(var),
            }
        }
    }

    proptest! {
        #[test]
        fn prop_preference_list_starts_with_requested(
            requested in "[a-z]{2}",
            device in proptest::collection::vec("[a-z]{2}(-[A-Z]{2})?", 0..5),
        ) {
            let list = preference_list(&requested, &device);
            prop_assert!(list.starts_with(&requested));
            prop_assert_eq!(list.split(',').filter(|t| *t == requested).count(), 1);
        }
    }
}
