// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! mg-cmdline: `${}` template expansion and POSIX-style argv splitting
//! for the `cmd` field of a model config entry.

pub mod split;
pub mod template;

pub use split::{quote_if_needed, split_argv, SplitError};
pub use template::expand;

use indexmap::IndexMap;

/// Expands a `cmd` template's macros and `${PORT}`, then splits it into
/// an argv ready for [`tokio::process::Command`]. The full pipeline
/// `mg-engine::Process::start` invokes on every spawn.
pub fn build_argv(template: &str, macros: &IndexMap<String, String>, port: u16) -> Result<Vec<String>, SplitError> {
    let expanded = expand(template, macros, port);
    split_argv(&expanded)
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn end_to_end_expansion_and_split() {
        let macros: IndexMap<String, String> =
            [("bin".to_string(), "/usr/local/bin/llama-server".to_string())].into();
        let argv = build_argv("${bin} --port ${PORT} --alias \"local model\"", &macros, 8080).unwrap();
        assert_eq!(
            argv,
            vec!["/usr/local/bin/llama-server", "--port", "8080", "--alias", "local model"]
        );
    }
}
