use lazy_static::lazy_static;
use regex::Regex;

/// Longest name a mutator may have
pub const MAX_NAME_LENGTH: usize = 63;

/// Split a line into whitespace-delimited tokens. Tabs count as spaces; runs of
/// separators never produce empty tokens.
pub fn tokenize_line(line: &str) -> Vec<&str> {
    line.split(|c| c == ' ' || c == '\t')
        .filter(|token| !token.is_empty())
        .collect()
}

/// A token that starts a trailing comment ends any directive argument list.
pub(crate) fn token_is_comment(token: &str) -> bool {
    token.starts_with("//") || token.starts_with("/*")
}

/// Directive arguments up to the first comment token
pub(crate) fn strip_comment<'t, 's>(args: &'s [&'t str]) -> &'s [&'t str] {
    let end = args
        .iter()
        .position(|t| token_is_comment(t))
        .unwrap_or(args.len());
    &args[..end]
}

/// Whether `name` can be used verbatim as a preprocessor macro name.
pub(crate) fn is_identifier(name: &str) -> bool {
    lazy_static! {
        static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    }

    IDENTIFIER_RE.is_match(name)
}
