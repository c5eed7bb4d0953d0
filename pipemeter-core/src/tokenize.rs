//! Splitting raw command-line arguments into option/value pairs
//!
//! The grammar is deliberately small: every option is `-name` or `--name`,
//! followed by `=value` or ` value`. There are no positional arguments and no
//! repeated options. Whatever text sits between one option and the next,
//! trimmed, is that option's value, so a bare flag gets the empty string.

use regex::Regex;
use std::sync::OnceLock;

const PROGRAM_PLACEHOLDER: &str = "pipemeter";

static OPTION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn option_pattern() -> &'static Regex {
    OPTION_PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|\s)--?([^\s=]+)=?").expect("option pattern is valid")
    })
}

/// Pair every option name in `raw_args` with the text that follows it
///
/// An option followed directly by another option, or by nothing, receives
/// the empty string.
pub fn tokenize<S: AsRef<str>>(raw_args: &[S]) -> Vec<(String, String)> {
    let line = std::iter::once(PROGRAM_PLACEHOLDER)
        .chain(raw_args.iter().map(AsRef::as_ref))
        .collect::<Vec<_>>()
        .join(" ");

    let mut pairs = Vec::new();
    let mut open: Option<(String, usize)> = None;

    for caps in option_pattern().captures_iter(&line) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let Some((prev, value_start)) = open.take() {
            pairs.push((prev, line[value_start..whole.start()].trim().to_string()));
        }
        open = Some((name.as_str().to_string(), whole.end()));
    }

    if let Some((prev, value_start)) = open {
        pairs.push((prev, line[value_start..].trim().to_string()));
    }

    log::trace!("tokenized {} argument(s) into {:?}", raw_args.len(), pairs);
    pairs
}
