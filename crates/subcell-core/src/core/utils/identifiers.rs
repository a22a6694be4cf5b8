use itertools::Itertools;
use once_cell::sync::Lazy;
use phf::{Set, phf_set};
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9_]*").expect("identifier pattern is valid"));

static BUILTIN_FUNCTIONS: Set<&'static str> = phf_set! {
    "exp", "ln", "log10", "log2", "sqrt", "abs", "sign", "rint",
    "sin", "cos", "tan", "asin", "acos", "atan",
    "sinh", "cosh", "tanh", "asinh", "acosh", "atanh",
    "if", "min", "max", "sum", "avg", "time", "mratio", "TFUN",
};

pub fn is_builtin_function(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(name)
}

/// True for a bare DSL identifier such as `k_on` or `cyt2`.
pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER
        .find(text)
        .is_some_and(|m| m.start() == 0 && m.end() == text.len())
}

struct Token<'a> {
    name: &'a str,
    prev: Option<char>,
    next: Option<char>,
}

impl Token<'_> {
    /// Part of a longer word or numeric literal: `1e-3`, `_x`, `2.5e4`.
    fn is_embedded(&self) -> bool {
        self.prev
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    }

    fn is_call(&self) -> bool {
        self.next == Some('(')
    }
}

fn tokens(expr: &str) -> impl Iterator<Item = Token<'_>> {
    IDENTIFIER.find_iter(expr).map(move |m| Token {
        name: m.as_str(),
        prev: expr[..m.start()].chars().next_back(),
        next: expr[m.end()..].chars().next(),
    })
}

/// Identifiers that must resolve to parameters: not called, not a structure reference,
/// not the exponent of a numeric literal.
pub fn parameter_names(expr: &str) -> Vec<&str> {
    tokens(expr)
        .filter(|t| !t.is_embedded() && !t.is_call() && t.prev != Some('@'))
        .map(|t| t.name)
        .unique()
        .collect()
}

/// Called identifiers that must resolve to user-defined functions. Built-ins are skipped.
pub fn function_names(expr: &str) -> Vec<&str> {
    tokens(expr)
        .filter(|t| !t.is_embedded() && t.is_call() && !is_builtin_function(t.name))
        .map(|t| t.name)
        .unique()
        .collect()
}

/// Molecule names in a pattern: every identifier directly followed by `(`.
pub fn molecule_names(pattern: &str) -> Vec<&str> {
    tokens(pattern)
        .filter(|t| t.is_call())
        .map(|t| t.name)
        .unique()
        .collect()
}

/// Structure names in a pattern: every identifier directly preceded by `@`.
pub fn structure_names(pattern: &str) -> Vec<&str> {
    tokens(pattern)
        .filter(|t| t.prev == Some('@'))
        .map(|t| t.name)
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_names_skip_calls_and_numeric_exponents() {
        assert_eq!(parameter_names("kon * 1e-3 + f(x) / Na"), vec!["kon", "x", "Na"]);
        assert_eq!(parameter_names("2.5E4*vol"), vec!["vol"]);
        assert!(parameter_names("1.0").is_empty());
    }

    #[test]
    fn parameter_names_skip_structure_references() {
        assert_eq!(parameter_names("A()@cyt * k"), vec!["k"]);
    }

    #[test]
    fn parameter_names_are_unique_in_first_appearance_order() {
        assert_eq!(parameter_names("b + a + b*a + c"), vec!["b", "a", "c"]);
    }

    #[test]
    fn function_names_exclude_builtins() {
        assert_eq!(
            function_names("exp(-k*time()) + rate(A) + min(x, g())"),
            vec!["rate", "g"]
        );
        assert!(function_names("k1").is_empty());
    }

    #[test]
    fn molecule_names_include_every_called_identifier() {
        assert_eq!(
            molecule_names("A(x!1).B(y!1)@cyt + A(x)"),
            vec!["A", "B"]
        );
        assert!(molecule_names("A").is_empty());
    }

    #[test]
    fn structure_names_follow_at_sign() {
        assert_eq!(structure_names("@pm:R(l!1).L(r!1)@ec"), vec!["pm", "ec"]);
        assert!(structure_names("A(x)").is_empty());
    }

    #[test]
    fn is_identifier_requires_whole_match() {
        assert!(is_identifier("k_on2"));
        assert!(!is_identifier("2k"));
        assert!(!is_identifier("k on"));
        assert!(!is_identifier(""));
    }
}
