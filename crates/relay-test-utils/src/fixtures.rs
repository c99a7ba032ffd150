// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel records for tests.

use std::sync::atomic::{AtomicI64, Ordering};

use relay_core::{
    Channel, ChannelId, ChannelRoles, ChannelType, ChannelUuid, ConfigMap, OrgId,
};

static NEXT_ID: AtomicI64 = AtomicI64::new(1);

/// An active send/receive channel with a fresh UUID and row id.
pub fn channel_fixture(channel_type: &str, address: &str) -> Channel {
    channel_fixture_with(channel_type, address, ConfigMap::new(), ConfigMap::new())
}

/// Like [`channel_fixture`] with explicit channel and org config.
pub fn channel_fixture_with(
    channel_type: &str,
    address: &str,
    config: ConfigMap,
    org_config: ConfigMap,
) -> Channel {
    Channel {
        id: ChannelId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
        uuid: ChannelUuid(uuid::Uuid::new_v4()),
        org_id: OrgId(1),
        channel_type: ChannelType::new(channel_type),
        name: Some(format!("{channel_type} test channel")),
        schemes: vec!["tel".to_string()],
        address: (!address.is_empty()).then(|| address.to_string()),
        country: Some("US".to_string()),
        roles: ChannelRoles::parse("SR"),
        config,
        org_config,
        org_is_anon: false,
    }
}
