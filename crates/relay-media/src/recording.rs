// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use metrics::describe_counter;

pub fn describe_metrics() {
    describe_counter!(
        "relay_attachments_fetched_total",
        "Attachment fetches by outcome (stored, unavailable, failed)"
    );
}

pub(crate) fn record_fetch(outcome: &'static str) {
    metrics::counter!("relay_attachments_fetched_total", "outcome" => outcome).increment(1);
}
