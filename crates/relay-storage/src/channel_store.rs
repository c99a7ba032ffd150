// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel lookups against the `channels`, `orgs`, `msgs` and
//! `msg_external_ids` tables.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{Row, params};
use tracing::debug;

use relay_core::traits::store::select_candidate;
use relay_core::{
    Channel, ChannelId, ChannelRoles, ChannelStore, ChannelType, ChannelUuid, ConfigMap,
    ExpectedType, ExternalIdKind, MessageKey, MessageMatch, OrgId, RelayError,
};

use crate::database::{Database, map_tr_err};

const CHANNEL_COLUMNS: &str = "ch.id, ch.uuid, ch.org_id, ch.channel_type, ch.name, ch.schemes, \
     ch.address, ch.country, ch.role, ch.config, org.config, org.is_anon";

/// Active channels owned by an org.
const CHANNEL_FROM: &str = "FROM channels ch JOIN orgs org ON ch.org_id = org.id \
     WHERE ch.is_active = 1 AND ch.org_id IS NOT NULL";

/// Raw column values; decoded into a [`Channel`] outside the database thread.
struct ChannelRow {
    id: i64,
    uuid: String,
    org_id: i64,
    channel_type: String,
    name: Option<String>,
    schemes: Option<String>,
    address: Option<String>,
    country: Option<String>,
    role: String,
    config: Option<String>,
    org_config: Option<String>,
    org_is_anon: bool,
}

impl ChannelRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uuid: row.get(1)?,
            org_id: row.get(2)?,
            channel_type: row.get(3)?,
            name: row.get(4)?,
            schemes: row.get(5)?,
            address: row.get(6)?,
            country: row.get(7)?,
            role: row.get(8)?,
            config: row.get(9)?,
            org_config: row.get(10)?,
            org_is_anon: row.get(11)?,
        })
    }

    fn decode(self) -> Result<Channel, RelayError> {
        let schemes = match self.schemes.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(raw) => serde_json::from_str(raw).map_err(RelayError::store)?,
        };
        Ok(Channel {
            id: ChannelId(self.id),
            uuid: self.uuid.parse()?,
            org_id: OrgId(self.org_id),
            channel_type: ChannelType::new(self.channel_type),
            name: self.name,
            schemes,
            address: self.address.filter(|a| !a.is_empty()),
            country: self.country.filter(|c| !c.is_empty()),
            roles: ChannelRoles::parse(&self.role),
            config: ConfigMap::from_json(self.config.as_deref()).map_err(RelayError::store)?,
            org_config: ConfigMap::from_json(self.org_config.as_deref())
                .map_err(RelayError::store)?,
            org_is_anon: self.org_is_anon,
        })
    }
}

fn decode_all(rows: Vec<ChannelRow>) -> Result<Vec<Channel>, RelayError> {
    rows.into_iter().map(ChannelRow::decode).collect()
}

/// [`ChannelStore`] backed by the relay SQLite database.
pub struct SqliteChannelStore {
    db: Arc<Database>,
}

impl SqliteChannelStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn channels_where(
        &self,
        condition: &'static str,
        value: String,
    ) -> Result<Vec<Channel>, RelayError> {
        let sql = format!("SELECT {CHANNEL_COLUMNS} {CHANNEL_FROM} AND {condition} ORDER BY ch.id");
        let rows = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<ChannelRow>, rusqlite::Error> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![value], ChannelRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)?;
        decode_all(rows)
    }

    async fn channels_for_msg_id(&self, msg_id: i64) -> Result<Vec<Channel>, RelayError> {
        let sql = format!(
            "SELECT {CHANNEL_COLUMNS} FROM msgs msg \
             JOIN channels ch ON ch.id = msg.channel_id \
             JOIN orgs org ON ch.org_id = org.id \
             WHERE msg.id = ?1 AND ch.is_active = 1 AND ch.org_id IS NOT NULL"
        );
        let rows = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<ChannelRow>, rusqlite::Error> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![msg_id], ChannelRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)?;
        decode_all(rows)
    }

    /// Channels of messages carrying `external_id`, each tagged with the
    /// column it matched. Gateway matches sort first.
    async fn channels_for_external_id(
        &self,
        external_id: String,
    ) -> Result<Vec<(Channel, ExternalIdKind)>, RelayError> {
        let sql = format!(
            "SELECT {CHANNEL_COLUMNS}, ext.gateway_id = ?1 AS by_gateway \
             FROM msg_external_ids ext \
             JOIN msgs msg ON msg.id = ext.msg_id \
             JOIN channels ch ON ch.id = msg.channel_id \
             JOIN orgs org ON ch.org_id = org.id \
             WHERE (ext.gateway_id = ?1 OR ext.carrier_id = ?1) \
             AND ch.is_active = 1 AND ch.org_id IS NOT NULL \
             ORDER BY by_gateway DESC, msg.id"
        );
        let rows = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<(ChannelRow, bool)>, rusqlite::Error> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![external_id], |row| {
                        let by_gateway: Option<bool> = row.get(12)?;
                        Ok((ChannelRow::from_row(row)?, by_gateway.unwrap_or(false)))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)?;

        rows.into_iter()
            .map(|(row, by_gateway)| {
                let kind = if by_gateway {
                    ExternalIdKind::Gateway
                } else {
                    ExternalIdKind::Carrier
                };
                Ok((row.decode()?, kind))
            })
            .collect()
    }
}

#[async_trait]
impl ChannelStore for SqliteChannelStore {
    async fn find_by_uuid(
        &self,
        expected: &ExpectedType,
        uuid: ChannelUuid,
    ) -> Result<Channel, RelayError> {
        let candidates = self.channels_where("ch.uuid = ?1", uuid.to_string()).await?;
        select_candidate(expected, candidates, format_args!("uuid: {uuid}"))
    }

    async fn find_by_address(
        &self,
        expected: &ExpectedType,
        address: &str,
    ) -> Result<Channel, RelayError> {
        let candidates = self
            .channels_where("ch.address = ?1", address.to_string())
            .await?;
        select_candidate(expected, candidates, format_args!("address: {address}"))
    }

    async fn find_by_message(
        &self,
        expected: &ExpectedType,
        key: &MessageKey,
    ) -> Result<MessageMatch, RelayError> {
        if let Some(msg_id) = key.msg_id {
            let candidates = self.channels_for_msg_id(msg_id.0).await?;
            if !candidates.is_empty() {
                let channel = select_candidate(expected, candidates, key)?;
                return Ok(MessageMatch {
                    channel,
                    external_id_kind: None,
                });
            }
        }

        let Some(external_id) = key.external_id.clone() else {
            return Err(RelayError::ChannelNotFound {
                channel_type: expected.to_string(),
                key: key.to_string(),
            });
        };

        let tagged = self.channels_for_external_id(external_id).await?;
        debug!(key = %key, candidates = tagged.len(), "external id lookup");
        let kind_of = |channel: &Channel| {
            tagged
                .iter()
                .find(|(c, _)| c.id == channel.id)
                .map(|(_, kind)| *kind)
        };
        let candidates: Vec<Channel> = tagged.iter().map(|(c, _)| c.clone()).collect();
        let channel = select_candidate(expected, candidates, key)?;
        let external_id_kind = kind_of(&channel);
        Ok(MessageMatch {
            channel,
            external_id_kind,
        })
    }
}
