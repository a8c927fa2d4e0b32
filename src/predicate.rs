//! Attribute predicates and count conditions.
//!
//! A [`Predicate`] narrows a query by element attributes; it is handed to the
//! driver for evaluation and rendered into the query's annotation. A
//! [`CountCondition`] is the compound predicate a query wait checks against
//! the live match count.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An element attribute a predicate can compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Accessibility label.
    Label,
    /// Accessibility identifier.
    Identifier,
    /// Current value (text field contents, switch state).
    Value,
    /// Placeholder shown by an empty text field.
    PlaceholderValue,
    /// Title, for elements that have one.
    Title,
}

impl Attribute {
    /// Key used when rendering predicates.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Identifier => "identifier",
            Self::Value => "value",
            Self::PlaceholderValue => "placeholderValue",
            Self::Title => "title",
        }
    }
}

/// String comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// Whole-string equality.
    Equals,
    /// Substring match.
    Contains,
    /// Prefix match.
    BeginsWith,
    /// Suffix match.
    EndsWith,
}

impl Comparison {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::Contains => "CONTAINS",
            Self::BeginsWith => "BEGINSWITH",
            Self::EndsWith => "ENDSWITH",
        }
    }

    fn apply(&self, haystack: &str, needle: &str) -> bool {
        match self {
            Self::Equals => haystack == needle,
            Self::Contains => haystack.contains(needle),
            Self::BeginsWith => haystack.starts_with(needle),
            Self::EndsWith => haystack.ends_with(needle),
        }
    }
}

/// Something a predicate can be evaluated against.
pub trait Attributes {
    /// Value of the attribute, or `None` when the element does not carry it.
    fn attribute(&self, attribute: Attribute) -> Option<Cow<'_, str>>;

    /// Whether the element accepts interaction.
    fn is_enabled(&self) -> bool;
}

/// A filter over element attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Compare one attribute against a string.
    Compare {
        /// Attribute to read.
        attribute: Attribute,
        /// How to compare.
        comparison: Comparison,
        /// Right-hand side.
        text: String,
        /// Fold case on both sides before comparing.
        case_insensitive: bool,
    },
    /// Match on the enabled flag.
    Enabled(bool),
    /// All of the inner predicates hold.
    And(Vec<Predicate>),
    /// At least one of the inner predicates holds.
    Or(Vec<Predicate>),
    /// The inner predicate does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Case-insensitive substring match on an attribute.
    pub fn contains(attribute: Attribute, text: impl Into<String>) -> Self {
        Self::Compare {
            attribute,
            comparison: Comparison::Contains,
            text: text.into(),
            case_insensitive: true,
        }
    }

    /// Exact, case-sensitive match on an attribute.
    pub fn equals(attribute: Attribute, text: impl Into<String>) -> Self {
        Self::Compare {
            attribute,
            comparison: Comparison::Equals,
            text: text.into(),
            case_insensitive: false,
        }
    }

    /// Case-insensitive prefix match on an attribute.
    pub fn begins_with(attribute: Attribute, text: impl Into<String>) -> Self {
        Self::Compare {
            attribute,
            comparison: Comparison::BeginsWith,
            text: text.into(),
            case_insensitive: true,
        }
    }

    /// Conjunction with another predicate.
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Self::And(mut all) => {
                all.push(other);
                Self::And(all)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Disjunction with another predicate.
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Self::Or(mut any) => {
                any.push(other);
                Self::Or(any)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Negation.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Whether the subject satisfies this predicate.
    ///
    /// A comparison on a missing attribute is false.
    pub fn evaluate<A: Attributes + ?Sized>(&self, subject: &A) -> bool {
        match self {
            Self::Compare {
                attribute,
                comparison,
                text,
                case_insensitive,
            } => {
                let Some(value) = subject.attribute(*attribute) else {
                    return false;
                };
                if *case_insensitive {
                    comparison.apply(&value.to_lowercase(), &text.to_lowercase())
                } else {
                    comparison.apply(&value, text)
                }
            }
            Self::Enabled(expected) => subject.is_enabled() == *expected,
            Self::And(all) => all.iter().all(|p| p.evaluate(subject)),
            Self::Or(any) => any.iter().any(|p| p.evaluate(subject)),
            Self::Not(inner) => !inner.evaluate(subject),
        }
    }

    /// Render as a predicate format string, e.g. `label CONTAINS[c] 'Login'`.
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare {
                attribute,
                comparison,
                text,
                case_insensitive,
            } => {
                let modifier = if *case_insensitive { "[c]" } else { "" };
                write!(
                    f,
                    "{} {}{} '{}'",
                    attribute.key(),
                    comparison.keyword(),
                    modifier,
                    text.replace('\'', "\\'")
                )
            }
            Self::Enabled(expected) => write!(f, "isEnabled == {expected}"),
            Self::And(all) => join(f, all, " AND "),
            Self::Or(any) => join(f, any, " OR "),
            Self::Not(inner) => write!(f, "NOT ({inner})"),
        }
    }
}

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, parts: &[T], separator: &str) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "({part})")?;
    }
    Ok(())
}

/// Condition on the number of elements a query matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountCondition {
    /// `count >= n`
    AtLeast(usize),
    /// `count <= n`
    AtMost(usize),
    /// `count == n`
    Exactly(usize),
    /// Every inner condition holds.
    All(Vec<CountCondition>),
    /// Some inner condition holds.
    Any(Vec<CountCondition>),
}

impl CountCondition {
    /// Whether a live count satisfies the condition.
    pub fn holds(&self, count: usize) -> bool {
        match self {
            Self::AtLeast(n) => count >= *n,
            Self::AtMost(n) => count <= *n,
            Self::Exactly(n) => count == *n,
            Self::All(all) => all.iter().all(|c| c.holds(count)),
            Self::Any(any) => any.iter().any(|c| c.holds(count)),
        }
    }
}

impl fmt::Display for CountCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeast(n) => write!(f, "count >= {n}"),
            Self::AtMost(n) => write!(f, "count <= {n}"),
            Self::Exactly(n) => write!(f, "count == {n}"),
            Self::All(all) => join(f, all, " AND "),
            Self::Any(any) => join(f, any, " OR "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Field {
        label: &'static str,
        placeholder: Option<&'static str>,
        enabled: bool,
    }

    impl Attributes for Field {
        fn attribute(&self, attribute: Attribute) -> Option<Cow<'_, str>> {
            match attribute {
                Attribute::Label => Some(Cow::Borrowed(self.label)),
                Attribute::PlaceholderValue => self.placeholder.map(Cow::Borrowed),
                _ => None,
            }
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    const USERNAME: Field = Field {
        label: "Username",
        placeholder: Some("Enter your username"),
        enabled: true,
    };

    #[test]
    fn contains_folds_case() {
        assert!(Predicate::contains(Attribute::PlaceholderValue, "USERNAME").evaluate(&USERNAME));
        assert!(!Predicate::contains(Attribute::PlaceholderValue, "password").evaluate(&USERNAME));
    }

    #[test]
    fn equals_is_case_sensitive() {
        assert!(Predicate::equals(Attribute::Label, "Username").evaluate(&USERNAME));
        assert!(!Predicate::equals(Attribute::Label, "username").evaluate(&USERNAME));
    }

    #[test]
    fn missing_attribute_never_matches() {
        let predicate = Predicate::contains(Attribute::Identifier, "");
        assert!(!predicate.evaluate(&USERNAME));
        assert!(predicate.negate().evaluate(&USERNAME));
    }

    #[test]
    fn compound_predicates() {
        let enabled_user =
            Predicate::begins_with(Attribute::Label, "user").and(Predicate::Enabled(true));
        assert!(enabled_user.evaluate(&USERNAME));

        let disabled = Field {
            enabled: false,
            ..USERNAME
        };
        assert!(!enabled_user.evaluate(&disabled));
        assert!(enabled_user.or(Predicate::Enabled(false)).evaluate(&disabled));
    }

    #[test]
    fn renders_like_a_format_string() {
        assert_eq!(
            Predicate::contains(Attribute::Label, "Login").format(),
            "label CONTAINS[c] 'Login'"
        );
        assert_eq!(
            Predicate::equals(Attribute::Identifier, "o'clock").to_string(),
            "identifier == 'o\\'clock'"
        );
        assert_eq!(
            Predicate::Enabled(true).and(Predicate::contains(Attribute::Title, "x")).to_string(),
            "(isEnabled == true) AND (title CONTAINS[c] 'x')"
        );
    }

    #[test]
    fn count_conditions() {
        let between =
            CountCondition::All(vec![CountCondition::AtLeast(2), CountCondition::AtMost(4)]);
        assert!(!between.holds(1));
        assert!(between.holds(3));
        assert!(!between.holds(5));
        assert_eq!(between.to_string(), "(count >= 2) AND (count <= 4)");

        let none_or_many =
            CountCondition::Any(vec![CountCondition::Exactly(0), CountCondition::AtLeast(10)]);
        assert!(none_or_many.holds(0));
        assert!(!none_or_many.holds(3));
    }
}
