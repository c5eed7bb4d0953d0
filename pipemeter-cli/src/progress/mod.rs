//! Progress reporting module

use crate::error::CliError;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use pipemeter_core::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

/// Characters of the bar text that are not the bar itself
const BAR_OVERHEAD: usize = 45;
const MIN_BAR_WIDTH: usize = 10;
const DEFAULT_BAR_WIDTH: usize = 40;

/// Meter settings taken from the typed command-line arguments
#[derive(Debug, Clone, PartialEq)]
pub struct MeterOptions {
    pub desc: Option<String>,
    pub total: Option<u64>,
    pub leave: bool,
    pub ncols: Option<usize>,
    pub mininterval: f64,
    pub maxinterval: f64,
    pub miniters: u64,
    pub ascii: bool,
    pub disable: bool,
    pub unit: String,
    pub unit_scale: bool,
    pub dynamic_ncols: bool,
    pub smoothing: f64,
    pub bar_format: Option<String>,
    pub initial: u64,
    pub position: Option<i64>,
}

impl Default for MeterOptions {
    fn default() -> Self {
        Self {
            desc: None,
            total: None,
            leave: true,
            ncols: None,
            mininterval: 0.1,
            maxinterval: 10.0,
            miniters: 1,
            ascii: false,
            disable: false,
            unit: "it".to_string(),
            unit_scale: false,
            dynamic_ncols: false,
            smoothing: 0.3,
            bar_format: None,
            initial: 0,
            position: None,
        }
    }
}

impl MeterOptions {
    /// Build options from typed arguments; absent names keep their defaults
    pub fn from_args(args: &BTreeMap<String, Value>) -> Self {
        let defaults = Self::default();
        let get = |name: &str| args.get(name);
        let count = |name: &str| {
            get(name)
                .and_then(Value::as_int)
                .and_then(|n| u64::try_from(n).ok())
        };

        Self {
            desc: get("desc").and_then(Value::as_str).map(str::to_string),
            total: count("total"),
            leave: get("leave").and_then(Value::as_bool).unwrap_or(defaults.leave),
            ncols: count("ncols").map(|n| n as usize),
            mininterval: get("mininterval")
                .and_then(Value::as_float)
                .unwrap_or(defaults.mininterval),
            maxinterval: get("maxinterval")
                .and_then(Value::as_float)
                .unwrap_or(defaults.maxinterval),
            miniters: count("miniters").unwrap_or(defaults.miniters).max(1),
            ascii: get("ascii").and_then(Value::as_bool).unwrap_or(defaults.ascii),
            disable: get("disable")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.disable),
            unit: get("unit")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(defaults.unit),
            unit_scale: get("unit_scale")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.unit_scale),
            dynamic_ncols: get("dynamic_ncols")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.dynamic_ncols),
            smoothing: get("smoothing")
                .and_then(Value::as_float)
                .unwrap_or(defaults.smoothing),
            bar_format: get("bar_format").and_then(Value::as_str).map(str::to_string),
            initial: count("initial").unwrap_or(defaults.initial),
            position: get("position").and_then(Value::as_int),
        }
    }

    fn template(&self) -> String {
        if let Some(format) = &self.bar_format {
            return format.clone();
        }
        if self.total.is_none() {
            return "{prefix}{n_fmt}{unit} [{elapsed_precise}, {rate_fmt}]".to_string();
        }
        let bar = if self.dynamic_ncols {
            "{wide_bar}".to_string()
        } else {
            let width = self
                .ncols
                .map(|n| n.saturating_sub(BAR_OVERHEAD).max(MIN_BAR_WIDTH))
                .unwrap_or(DEFAULT_BAR_WIDTH);
            format!("{{bar:{width}}}")
        };
        format!(
            "{{prefix}}{{percent:>3}}%|{bar}| {{n_fmt}}/{{total_fmt}} \
             [{{elapsed_precise}}<{{eta_precise}}, {{rate_fmt}}]"
        )
    }

    fn refresh_hz(&self) -> u8 {
        if self.mininterval.is_finite() && self.mininterval > 0.0 {
            (1.0 / self.mininterval).round().clamp(1.0, 255.0) as u8
        } else {
            u8::MAX
        }
    }

    /// Forced redraw interval; `None` when `maxinterval` is not a positive,
    /// representable duration
    fn steady_tick(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.maxinterval)
            .ok()
            .filter(|interval| !interval.is_zero())
    }

    fn style(&self) -> Result<ProgressStyle, CliError> {
        let scale = self.unit_scale;
        let unit = self.unit.clone();
        let rate_unit = self.unit.clone();

        let style = ProgressStyle::with_template(&self.template())
            .map_err(|e| CliError::Template(e.to_string()))?
            .with_key("n_fmt", move |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = w.write_str(&format_count(state.pos() as f64, scale));
            })
            .with_key(
                "total_fmt",
                move |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let total = state.len().map(|n| format_count(n as f64, scale));
                    let _ = w.write_str(total.as_deref().unwrap_or("?"));
                },
            )
            .with_key("unit", move |_: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = w.write_str(&unit);
            })
            .with_key(
                "rate_fmt",
                move |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let rate = state.per_sec();
                    let _ = if scale {
                        write!(w, "{}{rate_unit}/s", format_sizeof(rate))
                    } else {
                        write!(w, "{rate:.2}{rate_unit}/s")
                    };
                },
            )
            .progress_chars(if self.ascii { "##-" } else { "█▉▊▋▌▍▎▏ " });

        Ok(style)
    }
}

/// Progress meter advanced by the relay
pub struct Meter {
    bar: ProgressBar,
    miniters: u64,
    pending: u64,
    leave: bool,
    closed: bool,
}

impl Meter {
    /// Create a meter drawing to stderr
    pub fn new(options: &MeterOptions) -> Result<Self, CliError> {
        let style = options.style()?;

        let bar = if options.disable {
            ProgressBar::hidden()
        } else {
            ProgressBar::with_draw_target(
                options.total,
                ProgressDrawTarget::stderr_with_hz(options.refresh_hz()),
            )
        };
        let bar = bar.with_style(style).with_position(options.initial);

        if let Some(desc) = &options.desc {
            bar.set_prefix(format!("{desc}: "));
        }
        if !options.disable {
            match options.steady_tick() {
                Some(interval) => bar.enable_steady_tick(interval),
                None => log::debug!(
                    "no steady redraw for maxinterval {}",
                    options.maxinterval
                ),
            }
        }
        if let Some(position) = options.position {
            log::debug!("ignoring position {position}: only one bar is drawn");
        }
        log::debug!(
            "meter created (total: {:?}, miniters: {}, smoothing: {})",
            options.total,
            options.miniters,
            options.smoothing
        );

        Ok(Self {
            bar,
            miniters: options.miniters.max(1),
            pending: 0,
            leave: options.leave,
            closed: false,
        })
    }

    /// Advance progress by `n` units
    pub fn update(&mut self, n: u64) {
        self.pending += n;
        if self.pending >= self.miniters {
            self.bar.inc(self.pending);
            self.pending = 0;
        }
    }

    /// Position shown by the bar, excluding units still batched
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Flush batched units and finish the bar
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if self.pending > 0 {
            self.bar.inc(self.pending);
            self.pending = 0;
        }
        if self.leave {
            self.bar.finish();
        } else {
            self.bar.finish_and_clear();
        }
        self.closed = true;
    }
}

impl Drop for Meter {
    fn drop(&mut self) {
        self.close();
    }
}

fn format_count(n: f64, scale: bool) -> String {
    if scale {
        format_sizeof(n)
    } else {
        format!("{n:.0}")
    }
}

/// Format a number with an SI prefix, three significant figures
pub fn format_sizeof(num: f64) -> String {
    let mut num = num;
    for prefix in ["", "k", "M", "G", "T", "P", "E", "Z"] {
        if num.abs() < 999.95 {
            if num.abs() < 99.95 {
                if num.abs() < 9.995 {
                    return format!("{num:1.2}{prefix}");
                }
                return format!("{num:2.1}{prefix}");
            }
            return format!("{num:3.0}{prefix}");
        }
        num /= 1000.0;
    }
    format!("{num:3.1}Y")
}
