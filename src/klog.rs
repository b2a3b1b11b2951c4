//! Minimal logging subsystem for the allocator core.
//!
//! All output funnels through a single swappable backend function pointer,
//! defaulting to a no-op sink so the crate has no required I/O dependency.
//! A host embedding this allocator registers its own backend (a serial
//! console, a ring buffer, whatever) to see the output.

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(Level::Warn as u8);

#[inline(always)]
fn is_enabled(level: Level) -> bool {
    level as u8 <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

/// Signature of a klog backend: receives pre-formatted arguments for one
/// log line and is responsible for writing them plus a trailing newline.
pub type Backend = fn(fmt::Arguments<'_>);

fn noop_backend(_args: fmt::Arguments<'_>) {}

static BACKEND: AtomicPtr<()> = AtomicPtr::new(noop_backend as *mut ());

#[inline]
fn dispatch(args: fmt::Arguments<'_>) {
    let ptr = BACKEND.load(Ordering::Acquire);
    // SAFETY: only `set_backend` ever stores into `BACKEND`, and it only
    // ever stores valid `Backend` fn pointers, which are pointer-sized.
    let backend: Backend = unsafe { core::mem::transmute(ptr) };
    backend(args);
}

/// Register a backend that replaces the default no-op sink.
pub fn set_backend(backend: Backend) {
    BACKEND.store(backend as *mut (), Ordering::Release);
}

pub fn set_level(level: Level) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn log_args(level: Level, args: fmt::Arguments<'_>) {
    if !is_enabled(level) {
        return;
    }
    dispatch(args);
}

macro_rules! alloc_error {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::Level::Error, ::core::format_args!($($arg)*))
    };
}

macro_rules! alloc_warn {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::Level::Warn, ::core::format_args!($($arg)*))
    };
}

macro_rules! alloc_debug {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::Level::Debug, ::core::format_args!($($arg)*))
    };
}

macro_rules! alloc_trace {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::Level::Trace, ::core::format_args!($($arg)*))
    };
}

pub(crate) use alloc_debug;
pub(crate) use alloc_error;
pub(crate) use alloc_trace;
pub(crate) use alloc_warn;

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counting_backend(_args: fmt::Arguments<'_>) {
        CALLS.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn level_gate_filters_by_severity() {
        set_backend(counting_backend);
        set_level(Level::Warn);
        CALLS.store(0, Ordering::Relaxed);

        log_args(Level::Error, format_args!("error"));
        log_args(Level::Warn, format_args!("warn"));
        log_args(Level::Debug, format_args!("debug"));

        assert_eq!(CALLS.load(Ordering::Relaxed), 2);
    }
}
