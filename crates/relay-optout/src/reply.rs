// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Org-level opt-out settings.

use relay_core::Channel;

/// Org config key holding the reply sent after an opt-out.
pub const OPT_OUT_MESSAGE_BACK: &str = "opt_out_message_back";

/// Org config key holding per-language replies, keyed by language code.
pub const OPT_OUT_MESSAGE_BACK_I18N: &str = "opt_out_message_back_i18n";

/// Org config flag that turns opt-out handling off.
pub const OPT_OUT_DISABLED: &str = "opt_out_disabled";

pub const DEFAULT_OPT_OUT_REPLY: &str =
    "You have been unsubscribed and will receive no further messages. Msg freq. varies. Reply HELP for help.";

/// Reply text for a contact who opted out on `channel`.
///
/// Prefers the org's translation for `language`, then the org's reply,
/// then [`DEFAULT_OPT_OUT_REPLY`].
pub fn opt_out_reply(channel: &Channel, language: Option<&str>) -> String {
    let translated = language.and_then(|lang| {
        channel
            .org_config
            .map(OPT_OUT_MESSAGE_BACK_I18N)?
            .get(lang)?
            .as_str()
    });
    match translated {
        Some(text) => text.to_string(),
        None => channel.org_config_string_or(OPT_OUT_MESSAGE_BACK, DEFAULT_OPT_OUT_REPLY),
    }
}

pub fn opt_out_enabled(channel: &Channel) -> bool {
    !channel.org_config_bool_or(OPT_OUT_DISABLED, false)
}
