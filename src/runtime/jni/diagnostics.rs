//! Diagnostics channel for native misuse.
//!
//! Every failure that reaches this module is logged under [`TARGET`].
//! Fatal failures are additionally written to stderr, since a logger may not
//! be installed, and then abort the process.

use std::fmt::Display;

use log::{error, warn};

use crate::runtime::jni::error::RefError;

pub const TARGET: &str = "localref::lrt";

/// Reports an unrecoverable misuse and aborts.
pub fn fatal(err: &RefError, context: impl Display) -> ! {
    error!(target: TARGET, "{err}");
    error!(target: TARGET, "{context}");
    eprintln!("localref: fatal: {err}\n{context}");
    std::process::abort()
}

/// Reports a misuse that the caller is allowed to recover from.
pub fn report(err: RefError) -> RefError {
    warn!(target: TARGET, "{err}");
    err
}
