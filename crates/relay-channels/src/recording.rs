// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel resolution metrics, recorded through the `metrics` facade.

use metrics::describe_counter;

pub fn describe_metrics() {
    describe_counter!(
        "relay_channel_cache_lookups_total",
        "Channel lookups by key space and outcome"
    );
    describe_counter!(
        "relay_channel_stale_served_total",
        "Expired cache entries served because the store failed"
    );
}

pub(crate) fn record_lookup(index: &'static str, outcome: &'static str) {
    metrics::counter!(
        "relay_channel_cache_lookups_total",
        "index" => index,
        "outcome" => outcome
    )
    .increment(1);
}

pub(crate) fn record_stale_served(index: &'static str) {
    metrics::counter!("relay_channel_stale_served_total", "index" => index).increment(1);
}
