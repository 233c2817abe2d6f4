use crate::database::models::SessionRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub(super) struct SqliteSessionRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::SessionRepository for SqliteSessionRepository<'conn> {
    fn create(&self, record: &SessionRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO sessions (id, user_id, issued_at, expires_at, revoked)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.id,
                record.user_id,
                record.issued_at,
                record.expires_at,
                record.revoked
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<SessionRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, user_id, issued_at, expires_at, revoked
                FROM sessions
                WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok(SessionRecord {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        issued_at: row.get(2)?,
                        expires_at: row.get(3)?,
                        revoked: row.get(4)?,
                    })
                },
            )
            .optional()?)
    }

    fn revoke(&self, id: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE sessions SET revoked = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }
}
