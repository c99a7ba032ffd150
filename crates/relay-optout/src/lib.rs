// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opt-out detection for inbound message text.
//!
//! [`is_opt_out_text`] checks text against the built-in multilingual
//! dictionary. [`OptOutClassifier`] does the same with configured extra
//! keywords and phrases. Both are pure and safe to call from any task.

pub mod classifier;
pub mod dictionary;
pub mod reply;

pub use classifier::{OptOutClassifier, is_opt_out_text};
pub use reply::{
    DEFAULT_OPT_OUT_REPLY, OPT_OUT_DISABLED, OPT_OUT_MESSAGE_BACK, OPT_OUT_MESSAGE_BACK_I18N,
    opt_out_enabled, opt_out_reply,
};
