// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory mirror: user upserts and hierarchy lookups.

use std::str::FromStr;

use convoy_core::{ConvoyError, Role, User, UserId};
use rusqlite::{Row, params, params_from_iter};

use crate::database::{Database, map_tr_err};

const USER_COLUMNS: &str = "id, role, parent_id, display_name, avatar_ref";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(1)?;
    let role = Role::from_str(&role).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(User {
        id: UserId(row.get(0)?),
        role,
        parent_id: row.get::<_, Option<String>>(2)?.map(UserId),
        display_name: row.get(3)?,
        avatar_ref: row.get(4)?,
    })
}

/// Insert or update users in one transaction. Returns the number written.
pub async fn upsert_users(db: &Database, users: &[User]) -> Result<usize, ConvoyError> {
    let users = users.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut written = 0;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO users (id, role, parent_id, display_name, avatar_ref)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (id) DO UPDATE SET
                        role = excluded.role,
                        parent_id = excluded.parent_id,
                        display_name = excluded.display_name,
                        avatar_ref = excluded.avatar_ref,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                )?;
                for user in &users {
                    written += stmt.execute(params![
                        user.id.as_str(),
                        user.role.to_string(),
                        user.parent_id.as_ref().map(UserId::as_str),
                        user.display_name,
                        user.avatar_ref,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(written)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch the given users; unknown ids are skipped. Result is ordered by id.
pub async fn get_users(db: &Database, ids: &[UserId]) -> Result<Vec<User>, ConvoyError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = ids.iter().map(|id| id.0.clone()).collect();
    db.connection()
        .call(move |conn| {
            let placeholders = vec!["?"; ids.len()].join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id IN ({placeholders}) ORDER BY id"
            ))?;
            let rows = stmt.query_map(params_from_iter(ids.iter()), row_to_user)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// The user, their parent and grandparent, their children and grandchildren.
pub async fn hierarchy_around(db: &Database, id: &UserId) -> Result<Vec<User>, ConvoyError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "WITH
                    me AS (SELECT id, parent_id FROM users WHERE id = ?1),
                    up1 AS (SELECT u.id, u.parent_id FROM users u JOIN me ON u.id = me.parent_id),
                    up2 AS (SELECT u.id FROM users u JOIN up1 ON u.id = up1.parent_id),
                    down1 AS (SELECT id FROM users WHERE parent_id = ?1),
                    down2 AS (SELECT u.id FROM users u JOIN down1 ON u.parent_id = down1.id),
                    wanted AS (
                        SELECT id FROM me UNION SELECT id FROM up1 UNION SELECT id FROM up2
                        UNION SELECT id FROM down1 UNION SELECT id FROM down2
                    )
                 SELECT {USER_COLUMNS} FROM users WHERE id IN (SELECT id FROM wanted)
                 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![id], row_to_user)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn all_users(db: &Database) -> Result<Vec<User>, ConvoyError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
            let rows = stmt.query_map([], row_to_user)?;
            rows.collect::<rusqlite::Result<Vec<User>>>()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{fleet, open_temp, user};

    #[tokio::test]
    async fn upsert_and_get() {
        let (_dir, db) = open_temp().await;
        assert_eq!(upsert_users(&db, &fleet()).await.unwrap(), 4);

        let found = get_users(&db, &["d1".into(), "ghost".into()]).await.unwrap();
        assert_eq!(found.len(), 1);
        let d1 = &found[0];
        assert_eq!(d1.role, Role::Leaf);
        assert_eq!(d1.parent_id, Some("m1".into()));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_updates_existing_rows() {
        let (_dir, db) = open_temp().await;
        upsert_users(&db, &fleet()).await.unwrap();

        let mut renamed = user("d1", Role::Leaf, Some("m1"));
        renamed.display_name = "Dana".to_string();
        renamed.avatar_ref = Some("avatars/dana.png".to_string());
        upsert_users(&db, &[renamed]).await.unwrap();

        let d1 = get_users(&db, &["d1".into()]).await.unwrap().remove(0);
        assert_eq!(d1.display_name, "Dana");
        assert_eq!(d1.avatar_ref.as_deref(), Some("avatars/dana.png"));
        assert_eq!(all_users(&db).await.unwrap().len(), 4);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_users_skips_unknown() {
        let (_dir, db) = open_temp().await;
        upsert_users(&db, &fleet()).await.unwrap();
        let users = get_users(&db, &["m1".into(), "nobody".into(), "t1".into()])
            .await
            .unwrap();
        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "t1"]);
        assert!(get_users(&db, &[]).await.unwrap().is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn hierarchy_around_leaf_reaches_grandparent() {
        let (_dir, db) = open_temp().await;
        let mut users = fleet();
        users.push(user("t2", Role::Top, None));
        upsert_users(&db, &users).await.unwrap();

        let around = hierarchy_around(&db, &"d1".into()).await.unwrap();
        let ids: Vec<&str> = around.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "m1", "t1"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn hierarchy_around_top_reaches_grandchildren() {
        let (_dir, db) = open_temp().await;
        upsert_users(&db, &fleet()).await.unwrap();

        let around = hierarchy_around(&db, &"t1".into()).await.unwrap();
        let ids: Vec<&str> = around.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "m1", "t1"]);
        db.close().await.unwrap();
    }
}
