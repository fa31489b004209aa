//! Placeholder replacement in localized text.

/// Replace every literal occurrence of `placeholder` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub placeholder: String,
    pub replacement: String,
}

impl Substitution {
    pub fn new(placeholder: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            replacement: replacement.into(),
        }
    }

    /// Apply `substitutions` to `text` in order.
    ///
    /// Each pass sees the output of the previous one, so a replacement can
    /// introduce a placeholder consumed later in the list. Empty placeholders
    /// are skipped.
    pub fn apply_all(text: &str, substitutions: &[Substitution]) -> String {
        substitutions
            .iter()
            .filter(|s| !s.placeholder.is_empty())
            .fold(text.to_string(), |acc, s| acc.replace(&s.placeholder, &s.replacement))
    }
}

impl<P, R> From<(P, R)> for Substitution
where
    P: Into<String>,
    R: Into<String>,
{
    fn from((placeholder, replacement): (P, R)) -> Self {
        Self::new(placeholder, replacement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_replaces_every_occurrence() {
        let subs = [Substitution::new("{name}", "Ada")];
        assert_eq!(
            Substitution::apply_all("Hi {name}, bye {name}", &subs),
            "Hi Ada, bye Ada"
        );
    }

    #[test]
    fn test_applied_in_order() {
        let subs: Vec<Substitution> = vec![("{a}", "{b}").into(), ("{b}", "x").into()];
        assert_eq!(Substitution::apply_all("{a}{b}", &subs), "xx");

        let reversed: Vec<Substitution> = vec![("{b}", "x").into(), ("{a}", "{b}").into()];
        assert_eq!(Substitution::apply_all("{a}{b}", &reversed), "{b}x");
    }

    #[test]
    fn test_empty_placeholder_skipped() {
        let subs = [Substitution::new("", "boom")];
        assert_eq!(Substitution::apply_all("intact", &subs), "intact");
    }

    #[test]
    fn test_absent_placeholder_is_noop() {
        let subs = [Substitution::new("{count}", "3")];
        assert_eq!(Substitution::apply_all("Hello", &subs), "Hello");
        assert_eq!(Substitution::apply_all("", &subs), "");
    }

    proptest! {
        #[test]
        fn prop_no_substitutions_is_identity(text in ".*") {
            prop_assert_eq!(Substitution::apply_all(&text, &[]), text);
        }

        #[test]
        fn prop_placeholder_removed(prefix in "[a-z ]*", suffix in "[a-z ]*", value in "[0-9]+") {
            let text = format!("{prefix}{{n}}{suffix}");
            let out = Substitution::apply_all(&text, &[Substitution::new("{n}", value.clone())]);
            let placeholder = "{n}";
            prop_assert!(!out.contains(placeholder));
            prop_assert_eq!(out, format!("{prefix}{value}{suffix}"));
        }
    }
}
