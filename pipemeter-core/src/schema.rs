//! Declared command-line options and the schema resolved from them

use crate::cast::TypeTag;
use crate::error::{ArgError, Result};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Names that cannot be supplied as scalar command-line values: the iterable
/// itself, the GUI toggle and output file handles
pub const EXCLUDED_OPTIONS: &[&str] = &["iterable", "gui", "out", "file"];

/// Segmentation delimiter option
pub const DELIM: &str = "delim";

/// Read chunk size option
pub const BUF_SIZE: &str = "buf_size";

/// One declared option
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub type_tag: TypeTag,
    /// Raw default as it would be written on the command line
    pub default: Option<&'static str>,
    pub help: &'static str,
    /// Declared for completeness but never reachable from the command line
    pub excluded: bool,
}

impl OptionSpec {
    const fn new(
        name: &'static str,
        type_tag: TypeTag,
        default: Option<&'static str>,
        help: &'static str,
    ) -> Self {
        Self {
            name,
            type_tag,
            default,
            help,
            excluded: false,
        }
    }

    const fn excluded(name: &'static str, type_tag: TypeTag, help: &'static str) -> Self {
        Self {
            name,
            type_tag,
            default: None,
            help,
            excluded: true,
        }
    }
}

/// Parameters accepted by the progress meter
pub const METER_OPTIONS: &[OptionSpec] = &[
    OptionSpec::excluded(
        "iterable",
        TypeTag::Str,
        "Iterable to decorate with a progressbar.",
    ),
    OptionSpec::new("desc", TypeTag::Str, None, "Prefix for the progressbar."),
    OptionSpec::new(
        "total",
        TypeTag::Int,
        None,
        "The number of expected iterations. If unspecified, only basic \
         progress statistics are displayed (no ETA, no progressbar).",
    ),
    OptionSpec::new(
        "leave",
        TypeTag::Bool,
        Some("True"),
        "If True, keeps all traces of the progressbar upon termination of \
         iteration.",
    ),
    OptionSpec::excluded(
        "file",
        TypeTag::Str,
        "Specifies where to output the progress messages.",
    ),
    OptionSpec::new(
        "ncols",
        TypeTag::Int,
        None,
        "The width of the entire output message. If unspecified, a fixed \
         default bar width is used.",
    ),
    OptionSpec::new(
        "mininterval",
        TypeTag::Float,
        Some("0.1"),
        "Minimum progress display update interval, in seconds.",
    ),
    OptionSpec::new(
        "maxinterval",
        TypeTag::Float,
        Some("10.0"),
        "Maximum progress display update interval, in seconds.",
    ),
    OptionSpec::new(
        "miniters",
        TypeTag::Int,
        Some("1"),
        "Minimum progress display update interval, in iterations.",
    ),
    OptionSpec::new(
        "ascii",
        TypeTag::Bool,
        Some("False"),
        "If True, use ASCII characters to fill the progressbar instead of \
         unicode blocks.",
    ),
    OptionSpec::new(
        "disable",
        TypeTag::Bool,
        Some("False"),
        "Whether to disable the entire progressbar wrapper.",
    ),
    OptionSpec::new(
        "unit",
        TypeTag::Str,
        Some("it"),
        "String that will be used to define the unit of each iteration.",
    ),
    OptionSpec::new(
        "unit_scale",
        TypeTag::Bool,
        Some("False"),
        "If True, the number of iterations will be reduced/scaled \
         automatically and a metric prefix following the International \
         System of Units standard will be added (kilo, mega, etc.).",
    ),
    OptionSpec::new(
        "dynamic_ncols",
        TypeTag::Bool,
        Some("False"),
        "If True, the progressbar stretches to the terminal width.",
    ),
    OptionSpec::new(
        "smoothing",
        TypeTag::Float,
        Some("0.3"),
        "Exponential moving average smoothing factor for speed estimates \
         (ranges from 0 to 1).",
    ),
    OptionSpec::new(
        "bar_format",
        TypeTag::Str,
        None,
        "Specify a custom progress template. May impact performance.",
    ),
    OptionSpec::new(
        "initial",
        TypeTag::Int,
        Some("0"),
        "The initial counter value. Useful when restarting a progress bar.",
    ),
    OptionSpec::new(
        "position",
        TypeTag::Int,
        None,
        "Specify the line offset to print this bar (starting from 0).",
    ),
    OptionSpec::excluded("gui", TypeTag::Bool, "Use a graphical progressbar."),
];

/// Relay options that are always present regardless of the meter
pub const EXTRA_OPTIONS: &[OptionSpec] = &[
    OptionSpec::new(
        DELIM,
        TypeTag::Chr,
        Some("\\n"),
        "Delimiting character. Use '\\0' for null.",
    ),
    OptionSpec::new(
        BUF_SIZE,
        TypeTag::Int,
        Some("256"),
        "String buffer size in bytes, used when `delim` is specified.",
    ),
];

/// Resolved mapping from option name to type tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    types: HashMap<&'static str, TypeTag>,
}

impl Schema {
    /// Meter options plus the relay extras, minus [`EXCLUDED_OPTIONS`]
    pub fn standard() -> Self {
        let mut schema = extract_schema(METER_OPTIONS, EXCLUDED_OPTIONS);
        schema
            .types
            .extend(extract_schema(EXTRA_OPTIONS, EXCLUDED_OPTIONS).types);
        schema
    }

    /// Type tag of `name`, or [`ArgError::UnknownOption`]
    pub fn type_of(&self, name: &str) -> Result<TypeTag> {
        self.types
            .get(name)
            .copied()
            .ok_or_else(|| ArgError::UnknownOption(name.to_string()))
    }
}

#[cfg(test)]
impl Schema {
    fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    fn len(&self) -> usize {
        self.types.len()
    }

    fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Option names in sorted order
    fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Build the schema for `options`, dropping every name listed in `excluded`
/// and every option declared as excluded
pub fn extract_schema(options: &[OptionSpec], excluded: &[&str]) -> Schema {
    let mut types: HashMap<&'static str, TypeTag> = options
        .iter()
        .filter(|spec| !spec.excluded)
        .map(|spec| (spec.name, spec.type_tag))
        .collect();

    for name in excluded {
        types.remove(*name);
    }

    Schema { types }
}

/// Human-readable option list for help output
pub fn render_option_list(options: &[OptionSpec], excluded: &[&str]) -> String {
    let mut out = String::new();

    for spec in options
        .iter()
        .filter(|spec| !spec.excluded && !excluded.contains(&spec.name))
    {
        let _ = writeln!(
            out,
            "  --{0}=<{0}>  : {1}, optional",
            spec.name, spec.type_tag
        );
        let _ = writeln!(out, "            {}", spec.help);
        if let Some(default) = spec.default {
            let _ = writeln!(out, "            [default: {default}]");
        }
    }

    out
}
