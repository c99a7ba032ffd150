// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite channel store and log sink against a migrated database.

use std::sync::Arc;

use relay_audit::{ChannelError, HttpTrace, InteractionLog, LogSink, LogType};
use relay_core::{
    Channel, ChannelRef, ChannelStore, ChannelType, ConfigMap, ExpectedType, ExternalIdKind,
    MessageKey, MsgId,
};
use relay_storage::{Database, SqliteChannelStore, SqliteLogSink};
use relay_test_utils::{channel_fixture, channel_fixture_with};

async fn seed_channel(db: &Database, channel: &Channel, active: bool) {
    let channel = channel.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR IGNORE INTO orgs (id, name, config, is_anon) VALUES (?1, 'Org', ?2, ?3)",
                rusqlite::params![
                    channel.org_id.0,
                    serde_json::to_string(&channel.org_config).unwrap(),
                    channel.org_is_anon,
                ],
            )?;
            conn.execute(
                "INSERT INTO channels (id, uuid, org_id, channel_type, name, schemes, address, country, role, config, is_active) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    channel.id.0,
                    channel.uuid.to_string(),
                    channel.org_id.0,
                    channel.channel_type.as_str(),
                    channel.name,
                    serde_json::to_string(&channel.schemes).unwrap(),
                    channel.address,
                    channel.country,
                    channel.roles.to_flags(),
                    serde_json::to_string(&channel.config).unwrap(),
                    active,
                ],
            )?;
            Ok(())
        })
        .await
        .unwrap();
}

async fn seed_message(db: &Database, msg_id: i64, channel: &Channel, gateway: Option<&str>, carrier: Option<&str>) {
    let channel_id = channel.id.0;
    let gateway = gateway.map(str::to_string);
    let carrier = carrier.map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO msgs (id, channel_id) VALUES (?1, ?2)",
                rusqlite::params![msg_id, channel_id],
            )?;
            if gateway.is_some() || carrier.is_some() {
                conn.execute(
                    "INSERT INTO msg_external_ids (msg_id, gateway_id, carrier_id) VALUES (?1, ?2, ?3)",
                    rusqlite::params![msg_id, gateway, carrier],
                )?;
            }
            Ok(())
        })
        .await
        .unwrap();
}

async fn setup() -> (Arc<Database>, SqliteChannelStore) {
    let db = Arc::new(Database::open_in_memory().await.unwrap());
    let store = SqliteChannelStore::new(Arc::clone(&db));
    (db, store)
}

#[tokio::test]
async fn uuid_lookup_decodes_every_column() {
    let (db, store) = setup().await;
    let channel = channel_fixture_with(
        "WA",
        "+250788383383",
        ConfigMap::new().with("auth_token", "secret"),
        ConfigMap::new().with("opt_out_message_back", "Bye"),
    );
    seed_channel(&db, &channel, true).await;

    let found = store
        .find_by_uuid(&ExpectedType::from("WA"), channel.uuid)
        .await
        .unwrap();
    assert_eq!(found, channel);
}

#[tokio::test]
async fn inactive_channel_is_not_found() {
    let (db, store) = setup().await;
    let channel = channel_fixture("TW", "+12065551212");
    seed_channel(&db, &channel, false).await;

    let err = store
        .find_by_uuid(&ExpectedType::Any, channel.uuid)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    let err = store
        .find_by_address(&ExpectedType::Any, "+12065551212")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn shared_address_is_disambiguated_by_type() {
    let (db, store) = setup().await;
    let twilio = channel_fixture("TW", "1234");
    let mblox = channel_fixture("MGA", "1234");
    seed_channel(&db, &twilio, true).await;
    seed_channel(&db, &mblox, true).await;

    let found = store
        .find_by_address(&ExpectedType::from("MGA"), "1234")
        .await
        .unwrap();
    assert_eq!(found.uuid, mblox.uuid);

    let found = store.find_by_address(&ExpectedType::Any, "1234").await.unwrap();
    assert_eq!(found.uuid, twilio.uuid);

    let err = store
        .find_by_address(&ExpectedType::from("EX"), "1234")
        .await
        .unwrap_err();
    assert!(err.is_wrong_type());
}

#[tokio::test]
async fn message_lookup_reports_matched_column() {
    let (db, store) = setup().await;
    let channel = channel_fixture("TW", "+12065551212");
    seed_channel(&db, &channel, true).await;
    seed_message(&db, 10, &channel, Some("gw-10"), Some("car-10")).await;
    seed_message(&db, 11, &channel, None, None).await;

    let by_id = store
        .find_by_message(&ExpectedType::Any, &MessageKey::new(Some(MsgId(11)), None))
        .await
        .unwrap();
    assert_eq!(by_id.channel.uuid, channel.uuid);
    assert_eq!(by_id.external_id_kind, None);

    let by_gateway = store
        .find_by_message(&ExpectedType::Any, &MessageKey::new(None, Some("gw-10")))
        .await
        .unwrap();
    assert_eq!(by_gateway.external_id_kind, Some(ExternalIdKind::Gateway));

    let by_carrier = store
        .find_by_message(&ExpectedType::Any, &MessageKey::new(Some(MsgId(99)), Some("car-10")))
        .await
        .unwrap();
    assert_eq!(by_carrier.external_id_kind, Some(ExternalIdKind::Carrier));

    let err = store
        .find_by_message(&ExpectedType::Any, &MessageKey::new(None, Some("nope")))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = store
        .find_by_message(&ExpectedType::from("MGA"), &MessageKey::new(Some(MsgId(10)), None))
        .await
        .unwrap_err();
    assert!(err.is_wrong_type());
}

async fn stored_logs(db: &Database) -> Vec<(String, Option<i64>, String, bool, String)> {
    db.connection()
        .call(|conn| -> Result<_, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT log_type, channel_id, channel_type, is_error, errors FROM channel_logs ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn log_sink_persists_attributed_and_unattributed_logs() {
    let (db, _) = setup().await;
    let channel = channel_fixture("TW", "+12065551212");
    seed_channel(&db, &channel, true).await;
    let sink = SqliteLogSink::new(Arc::clone(&db));

    let mut send = InteractionLog::for_send(Arc::new(channel.clone()), MsgId(5));
    send.http(
        HttpTrace::new("POST", "https://api.example.com/send").with_response(500, "boom"),
    );
    sink.write(&send.close()).await.unwrap();

    let mut status = InteractionLog::new(
        LogType::MsgStatus,
        ChannelRef::Unattributed {
            channel_type: ChannelType::new("TW"),
        },
        None,
    );
    status.error(ChannelError::with_code("unknown channel", "not_found"));
    sink.write_batch(&[status.close()]).await.unwrap();

    let rows = stored_logs(&db).await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, "msg_send");
    assert_eq!(rows[0].1, Some(channel.id.0));
    assert!(rows[0].3);
    assert_eq!(rows[1].0, "msg_status");
    assert_eq!(rows[1].1, None);
    assert_eq!(rows[1].2, "TW");
    assert!(rows[1].4.contains("not_found"));
}

#[tokio::test]
async fn failed_batch_writes_nothing() {
    let (db, _) = setup().await;
    let sink = SqliteLogSink::new(Arc::clone(&db));
    let unattributed = || ChannelRef::Unattributed {
        channel_type: ChannelType::new("TW"),
    };

    let log = InteractionLog::new(LogType::MsgReceive, unattributed(), None).close();
    let other = InteractionLog::new(LogType::MsgReceive, unattributed(), None).close();
    // the duplicate uuid violates the primary key halfway through the batch
    let err = sink
        .write_batch(&[log.clone(), other, log])
        .await
        .unwrap_err();
    assert_eq!(err.written, 0);
    assert!(matches!(err.source, relay_core::RelayError::LogPersist { .. }));
    assert!(stored_logs(&db).await.is_empty());
}

#[tokio::test]
async fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.db");
    let path = path.to_str().unwrap();
    let channel = channel_fixture("TW", "+12065551212");

    let db = Database::open(path, true).await.unwrap();
    seed_channel(&db, &channel, true).await;
    db.close().await.unwrap();
    drop(db);

    let db = Arc::new(Database::open(path, true).await.unwrap());
    let store = SqliteChannelStore::new(db);
    let found = store
        .find_by_address(&ExpectedType::from("TW"), "+12065551212")
        .await
        .unwrap();
    assert_eq!(found.uuid, channel.uuid);
}
