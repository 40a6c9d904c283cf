//! Operator-facing log macros.
//!
//! These forward to `tracing` under the `sshcheck` targets so the terminal
//! formatter can pick a symbol per kind of message.

pub const TARGET_INFO: &str = "sshcheck";
pub const TARGET_SUCCESS: &str = "sshcheck::success";
pub const TARGET_PRINT: &str = "sshcheck::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::__tracing::info!(target: $crate::log::TARGET_INFO, $($arg)+)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::__tracing::info!(target: $crate::log::TARGET_SUCCESS, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::__tracing::warn!(target: $crate::log::TARGET_INFO, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::__tracing::error!(target: $crate::log::TARGET_INFO, $($arg)+)
    };
}
