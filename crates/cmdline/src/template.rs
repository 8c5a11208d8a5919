// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `${name}` macro substitution and `${PORT}` expansion over a `cmd`/
//! `proxyUrl` template string, ahead of argv splitting.

use indexmap::IndexMap;

/// Expands every `${name}` occurrence using `macros`, then `${PORT}`
/// using `port`, as two separate left-to-right passes. A macro whose
/// value itself contains the literal text `${PORT}` is expanded by the
/// second pass, since it runs over the whole string produced by the
/// first — macros and `${PORT}` are not mutually escaping.
pub fn expand(template: &str, macros: &IndexMap<String, String>, port: u16) -> String {
    let with_macros = expand_placeholders(template, |name| macros.get(name).cloned());
    expand_placeholders(&with_macros, |name| {
        (name == "PORT").then(|| port.to_string())
    })
}

fn expand_placeholders(input: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            if let Some(end) = input[i + 2..].find('}') {
                let name = &input[i + 2..i + 2 + end];
                match lookup(name) {
                    Some(value) => {
                        out.push_str(&value);
                        i += 2 + end + 1;
                        continue;
                    }
                    None => {
                        // Unknown placeholder: passed through verbatim so a
                        // typo'd macro name is visible in the spawned argv
                        // rather than silently vanishing.
                        out.push_str(&input[i..i + 2 + end + 1]);
                        i += 2 + end + 1;
                        continue;
                    }
                }
            }
        }
        let ch_len = input[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&input[i..i + ch_len]);
        i += ch_len;
    }
    out
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
