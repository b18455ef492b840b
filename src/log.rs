//! Minimal logging facade.
//!
//! The teacher kernel writes straight to a global `SerialPort` through a
//! `serial_println!` macro gated by a `debug_verbose` feature; this crate
//! follows the same shape but can't assume a global serial port (it's a
//! library embedded in someone else's host stack). Instead, `CdcHost` takes
//! an optional `LogFn` callback — a plain function pointer, consistent with
//! this crate's no-closures, no-allocator callback style elsewhere — and
//! `debug_println!` below compiles to nothing at all unless `debug_verbose`
//! is enabled, matching the teacher's precedent of keeping step-by-step
//! trace entirely out of the non-verbose build.

/// A log sink: formats and disposes of a line however the embedder wants
/// (UART, RTT, stderr, ...).
pub type LogFn = fn(core::fmt::Arguments);

#[doc(hidden)]
pub fn emit(sink: Option<LogFn>, args: core::fmt::Arguments) {
    if let Some(f) = sink {
        f(args);
    }
}

#[cfg(feature = "debug_verbose")]
#[macro_export]
macro_rules! debug_println {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::emit($sink, format_args!($($arg)*))
    };
}

#[cfg(not(feature = "debug_verbose"))]
#[macro_export]
macro_rules! debug_println {
    ($sink:expr, $($arg:tt)*) => {{
        let _ = $sink;
        let _ = format_args!($($arg)*);
    }};
}
