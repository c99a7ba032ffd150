// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use metrics::describe_counter;

pub fn describe_metrics() {
    describe_counter!(
        "relay_channel_logs_written_total",
        "Interaction logs persisted by the committer"
    );
    describe_counter!(
        "relay_channel_logs_dropped_total",
        "Interaction logs discarded before reaching the sink"
    );
}

pub(crate) fn record_written(count: usize) {
    metrics::counter!("relay_channel_logs_written_total").increment(count as u64);
}

pub(crate) fn record_dropped(reason: &'static str) {
    metrics::counter!("relay_channel_logs_dropped_total", "reason" => reason).increment(1);
}
