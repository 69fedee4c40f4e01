//! Contract checks.
//!
//! Every precondition in this crate goes through [`check!`]. Checks are active
//! in debug builds and whenever the `checks` feature is enabled; otherwise
//! they compile to nothing and the precondition stays a documented contract.

/// Reports a contract violation if `$cond` does not hold.
macro_rules! check {
    ($cond:expr, $($arg:tt)+) => {
        if cfg!(any(debug_assertions, feature = "checks")) && !$cond {
            $crate::check::violation(format_args!($($arg)+));
        }
    };
}

pub(crate) use check;

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn violation(args: core::fmt::Arguments<'_>) -> ! {
    tracing::error!(target: "light_slots::check", "contract violation: {args}");
    panic!("{args}");
}
