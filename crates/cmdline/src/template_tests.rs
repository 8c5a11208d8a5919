use super::*;

fn macros(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn expands_macro_and_port() {
    let m = macros(&[("llamaBin", "/usr/local/bin/llama-server")]);
    let out = expand("${llamaBin} --port ${PORT} --foo", &m, 11434);
    assert_eq!(out, "/usr/local/bin/llama-server --port 11434 --foo");
}

#[test]
fn unknown_placeholder_passes_through() {
    let m = macros(&[]);
    let out = expand("echo ${nope}", &m, 8080);
    assert_eq!(out, "echo ${nope}");
}

#[test]
fn macro_value_containing_port_placeholder_is_expanded_by_second_pass() {
    let m = macros(&[("weird", "${PORT}")]);
    let out = expand("${weird}", &m, 9999);
    assert_eq!(out, "9999");
}

#[test]
fn no_placeholders_is_passthrough() {
    let m = macros(&[]);
    assert_eq!(expand("plain command --flag", &m, 1), "plain command --flag");
}

#[test]
fn unterminated_placeholder_left_as_is() {
    let m = macros(&[]);
    assert_eq!(expand("echo ${PORT", &m, 80), "echo ${PORT");
}
