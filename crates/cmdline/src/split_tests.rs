use super::*;

#[test]
fn splits_on_whitespace() {
    assert_eq!(split_argv("foo bar  baz").unwrap(), vec!["foo", "bar", "baz"]);
}

#[test]
fn single_quotes_are_literal() {
    assert_eq!(split_argv(r#"echo 'a b\c'"#).unwrap(), vec!["echo", "a b\\c"]);
}

#[test]
fn double_quotes_process_escapes() {
    assert_eq!(split_argv(r#"echo "a\nb""#).unwrap(), vec!["echo", "a\nb"]);
}

#[test]
fn adjacent_quoted_and_bare_runs_concatenate() {
    assert_eq!(split_argv(r#"a"b c"d"#).unwrap(), vec!["ab cd"]);
}

#[test]
fn empty_input_yields_no_args() {
    assert_eq!(split_argv("   ").unwrap(), Vec::<String>::new());
}

#[test]
fn unterminated_single_quote_errors() {
    assert_eq!(split_argv("echo 'unterminated"), Err(SplitError::UnterminatedSingleQuote(5)));
}

#[test]
fn unterminated_double_quote_errors() {
    assert_eq!(split_argv(r#"echo "unterminated"#), Err(SplitError::UnterminatedDoubleQuote(5)));
}

#[test]
fn invalid_escape_errors() {
    assert_eq!(split_argv(r#""\q""#), Err(SplitError::InvalidEscape('q', 2)));
}

#[test]
fn trailing_backslash_errors() {
    assert_eq!(split_argv(r#""\"#), Err(SplitError::TrailingBackslash(1)));
}

#[test]
fn quote_if_needed_wraps_whitespace_only() {
    assert_eq!(quote_if_needed("plain"), "plain");
    assert_eq!(quote_if_needed("has space"), "\"has space\"");
    assert_eq!(quote_if_needed(r#"has"quote"#), "\"has\\\"quote\"");
}
