//! Logging for the tokenguard crates.
//!
//! A small, dependency-light logger whose behaviour is controlled by
//! environment variables, so a host application can turn on guard
//! diagnostics without recompiling.
//!
//! # Usage
//!
//! ```rust
//! use tokenguard_log::{debug, info, warn};
//!
//! info!("guard ready");
//! let kept = 50;
//! debug!(target: "tokenguard::csrf", "token list holds {} entries", kept);
//! warn!("rejected request");
//! ```
//!
//! # Environment Variables
//!
//! - `TOKENGUARD_DEBUG=1` - Enable debug logging
//! - `TOKENGUARD_LOG_LEVEL=trace|debug|info|warn|error|off` - Minimum level
//! - `TOKENGUARD_LOG_FORMAT=json|compact|pretty` - Output format
//! - `TOKENGUARD_LOG_TIMESTAMPS=1|0` - Include timestamps

use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Prefix shared by every environment variable this crate reads.
pub const ENV_PREFIX: &str = "TOKENGUARD";

// ============================================================================
// Levels and formats
// ============================================================================

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Disables all output.
    Off = 5,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level or format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised logging option '{}'", self.0)
    }
}

impl std::error::Error for ParseError {}

impl FromStr for Level {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            other => Err(ParseError(other.to_string())),
        }
    }
}

/// Shape of each emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Format {
    /// One JSON object per line
    Json = 0,
    /// `HH:MM:SS L target: message`
    Compact = 1,
    /// Full timestamp, padded level, bracketed target
    Pretty = 2,
}

impl Format {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Format::Compact,
            2 => Format::Pretty,
            _ => Format::Json,
        }
    }
}

impl FromStr for Format {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "compact" => Ok(Format::Compact),
            "pretty" => Ok(Format::Pretty),
            other => Err(ParseError(other.to_string())),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            timestamps: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `TOKENGUARD_*` variables, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), but resolves each full variable
    /// name (e.g. `TOKENGUARD_LOG_LEVEL`) through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name));
        let flag = |name: &str| var(name).map(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        let debug = flag("DEBUG").unwrap_or(false);
        let level = var("LOG_LEVEL")
            .and_then(|v| v.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });
        let format = var("LOG_FORMAT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(Format::Json);
        let timestamps = flag("LOG_TIMESTAMPS").unwrap_or(true);

        Self {
            debug,
            level,
            format,
            timestamps,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Install this configuration as the process-wide logger state.
    pub fn apply(&self) {
        Lazy::force(&ENV_INIT);
        store(self);
    }
}

// ============================================================================
// Global state
// ============================================================================

static LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);
static FORMAT: AtomicU8 = AtomicU8::new(Format::Json as u8);
static DEBUG: AtomicBool = AtomicBool::new(false);
static TIMESTAMPS: AtomicBool = AtomicBool::new(true);

// Environment is read once; later `apply`/`set_*` calls win over it.
static ENV_INIT: Lazy<()> = Lazy::new(|| store(&LogConfig::from_env()));

fn store(config: &LogConfig) {
    LEVEL.store(config.level as u8, Ordering::SeqCst);
    FORMAT.store(config.format as u8, Ordering::SeqCst);
    DEBUG.store(config.debug, Ordering::SeqCst);
    TIMESTAMPS.store(config.timestamps, Ordering::SeqCst);
}

/// Eagerly read the environment. Logging macros do this lazily otherwise.
pub fn init() {
    Lazy::force(&ENV_INIT);
}

/// Snapshot of the active configuration.
pub fn current_config() -> LogConfig {
    init();
    LogConfig {
        debug: DEBUG.load(Ordering::Relaxed),
        level: Level::from_u8(LEVEL.load(Ordering::Relaxed)),
        format: Format::from_u8(FORMAT.load(Ordering::Relaxed)),
        timestamps: TIMESTAMPS.load(Ordering::Relaxed),
    }
}

pub fn current_level() -> Level {
    init();
    Level::from_u8(LEVEL.load(Ordering::Relaxed))
}

pub fn set_level(level: Level) {
    init();
    LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Toggle debug mode. Enabling it also lowers the level to `Debug` when the
/// current level is less verbose.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

pub fn is_debug_enabled() -> bool {
    init();
    DEBUG.load(Ordering::Relaxed)
}

/// Whether a record at `level` would be written.
///
/// Only the level decides; debug mode acts through the level it lowers.
#[inline]
pub fn is_enabled(level: Level) -> bool {
    if level == Level::Off {
        return false;
    }
    init();
    level as u8 >= LEVEL.load(Ordering::Relaxed)
}

// ============================================================================
// Output
// ============================================================================

#[doc(hidden)]
pub fn emit(level: Level, target: &str, args: fmt::Arguments<'_>) {
    if !is_enabled(level) {
        return;
    }

    let line = render(
        Format::from_u8(FORMAT.load(Ordering::Relaxed)),
        TIMESTAMPS.load(Ordering::Relaxed),
        level,
        target,
        &args.to_string(),
    );

    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", line);
}

fn render(format: Format, timestamps: bool, level: Level, target: &str, message: &str) -> String {
    match format {
        Format::Json => render_json(timestamps, level, target, message),
        Format::Compact => {
            let mut line = String::new();
            if timestamps {
                line.push_str(&chrono::Local::now().format("%H:%M:%S ").to_string());
            }
            line.push_str(&level.as_str()[..1]);
            line.push(' ');
            if !target.is_empty() {
                line.push_str(target);
                line.push_str(": ");
            }
            line.push_str(message);
            line
        }
        Format::Pretty => {
            let mut line = String::new();
            if timestamps {
                line.push_str(
                    &chrono::Local::now()
                        .format("%Y-%m-%d %H:%M:%S%.3f ")
                        .to_string(),
                );
            }
            line.push_str(&format!("{:5} ", level.as_str()));
            if !target.is_empty() {
                line.push_str(&format!("[{}] ", target));
            }
            line.push_str(message);
            line
        }
    }
}

#[cfg(feature = "json")]
fn render_json(timestamps: bool, level: Level, target: &str, message: &str) -> String {
    #[derive(serde::Serialize)]
    struct Record<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let record = Record {
        timestamp: timestamps.then(|| chrono::Utc::now().to_rfc3339()),
        level: level.as_str(),
        target,
        message,
    };

    serde_json::to_string(&record).unwrap_or_else(|_| message.to_string())
}

#[cfg(not(feature = "json"))]
fn render_json(timestamps: bool, level: Level, target: &str, message: &str) -> String {
    let mut line = String::from("{");
    if timestamps {
        line.push_str(&format!(
            "\"timestamp\":\"{}\",",
            chrono::Utc::now().to_rfc3339()
        ));
    }
    line.push_str(&format!(
        "\"level\":\"{}\",\"target\":\"{}\",\"message\":\"{}\"}}",
        level.as_str(),
        escape_json(target),
        escape_json(message)
    ));
    line
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_enabled($level) {
            $crate::emit($level, $target, format_args!($($arg)+));
        }
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::__log!($level, target: module_path!(), $($arg)+)
    };
}

/// Log at trace level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Trace, $($arg)+) };
}

/// Log at debug level. `TOKENGUARD_DEBUG=1` lowers the level so these show.
///
/// ```rust
/// use tokenguard_log::debug;
///
/// debug!("issued token");
/// debug!(target: "tokenguard::csrf", "evicted {} entries", 1);
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Error, $($arg)+) };
}

// ============================================================================
// Tracing bridge
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_bridge {
    //! Builds a `tracing` subscriber filtered at the level configured for
    //! this crate, for hosts that already log through `tracing`.

    use super::*;

    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let directive = match current_level() {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Tests that touch the global logger state run one at a time.
    static GLOBAL_STATE: Mutex<()> = Mutex::new(());

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("debug".parse::<Level>(), Ok(Level::Debug));
        assert_eq!(" WARNING ".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("none".parse::<Level>(), Ok(Level::Off));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
        assert_eq!(Level::from_u8(Level::Warn as u8), Level::Warn);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert_eq!("Compact".parse::<Format>(), Ok(Format::Compact));
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = LogConfig::new()
            .with_level(Level::Warn)
            .with_format(Format::Compact)
            .with_timestamps(false);

        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.format, Format::Compact);
        assert!(!config.timestamps);
        assert!(!config.debug);
    }

    #[test]
    fn test_render_compact_without_timestamp() {
        let line = render(Format::Compact, false, Level::Warn, "guard", "rejected");
        assert_eq!(line, "W guard: rejected");
    }

    #[test]
    fn test_render_pretty_without_timestamp() {
        let line = render(Format::Pretty, false, Level::Info, "guard", "ready");
        assert_eq!(line, "INFO  [guard] ready");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_render_json_is_parseable() {
        let line = render(Format::Json, false, Level::Error, "guard", "say \"hi\"");
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["message"], "say \"hi\"");
        assert!(value.get("timestamp").is_none());
    }

    #[cfg(not(feature = "json"))]
    #[test]
    fn test_render_json_escapes_control_characters() {
        let line = render(Format::Json, false, Level::Warn, "guard", "esc\u{1b}[0m \"q\"\n");
        assert_eq!(
            line,
            r#"{"level":"WARN","target":"guard","message":"esc\u001b[0m \"q\"\n"}"#
        );
    }

    #[test]
    fn test_off_is_never_enabled() {
        assert!(!is_enabled(Level::Off));
    }

    #[test]
    fn test_set_level() {
        let _guard = GLOBAL_STATE.lock().unwrap_or_else(|e| e.into_inner());
        let original = current_config();

        set_level(Level::Error);
        assert_eq!(current_level(), Level::Error);
        assert!(is_enabled(Level::Error));
        assert!(!is_enabled(Level::Warn));

        set_level(Level::Trace);
        assert_eq!(current_level(), Level::Trace);
        assert!(is_enabled(Level::Trace));

        original.apply();
    }

    #[test]
    fn test_debug_flag_lowers_level() {
        let _guard = GLOBAL_STATE.lock().unwrap_or_else(|e| e.into_inner());
        let original = current_config();

        set_level(Level::Warn);
        set_debug(true);
        assert!(is_debug_enabled());
        assert_eq!(current_level(), Level::Debug);
        assert!(is_enabled(Level::Debug));

        // Already more verbose than debug: left alone
        set_level(Level::Trace);
        set_debug(true);
        assert_eq!(current_level(), Level::Trace);

        set_debug(false);
        assert!(!is_debug_enabled());

        original.apply();
    }

    #[test]
    fn test_off_silences_debug_mode() {
        let _guard = GLOBAL_STATE.lock().unwrap_or_else(|e| e.into_inner());
        let original = current_config();

        set_debug(true);
        set_level(Level::Off);
        assert!(is_debug_enabled());
        assert!(!is_enabled(Level::Debug));
        assert!(!is_enabled(Level::Info));
        assert!(!is_enabled(Level::Error));

        original.apply();
    }

    #[test]
    fn test_apply_and_current_config() {
        let _guard = GLOBAL_STATE.lock().unwrap_or_else(|e| e.into_inner());
        let original = current_config();

        let config = LogConfig::new()
            .with_level(Level::Error)
            .with_format(Format::Pretty)
            .with_debug(false)
            .with_timestamps(false);
        config.apply();
        assert_eq!(current_config(), config);

        original.apply();
        assert_eq!(current_config(), original);
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = LogConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_config_from_lookup_reads_prefixed_vars() {
        let config = LogConfig::from_lookup(lookup_from(&[
            ("TOKENGUARD_LOG_LEVEL", "warn"),
            ("TOKENGUARD_LOG_FORMAT", "compact"),
            ("TOKENGUARD_LOG_TIMESTAMPS", "0"),
            ("LOG_LEVEL", "trace"),
        ]));

        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.format, Format::Compact);
        assert!(!config.timestamps);
        assert!(!config.debug);
    }

    #[test]
    fn test_config_from_lookup_debug_flag() {
        let config = LogConfig::from_lookup(lookup_from(&[("TOKENGUARD_DEBUG", "true")]));
        assert!(config.debug);
        assert_eq!(config.level, Level::Debug);

        // An explicit level wins over the debug default
        let config = LogConfig::from_lookup(lookup_from(&[
            ("TOKENGUARD_DEBUG", "1"),
            ("TOKENGUARD_LOG_LEVEL", "off"),
        ]));
        assert!(config.debug);
        assert_eq!(config.level, Level::Off);
    }

    #[test]
    fn test_config_from_lookup_ignores_unparsable_values() {
        let config = LogConfig::from_lookup(lookup_from(&[
            ("TOKENGUARD_LOG_LEVEL", "loud"),
            ("TOKENGUARD_LOG_FORMAT", "xml"),
        ]));
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.format, Format::Json);
    }

    #[test]
    fn test_macros_compile() {
        trace!("trace message");
        debug!("debug message");
        info!("info message");
        warn!("warn message");
        error!("error message");

        let n = 3;
        debug!(target: "test", "with target {}", n);
        warn!(target: "test", "with target");
    }
}
