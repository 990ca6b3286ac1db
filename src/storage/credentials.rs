use rusqlite::{OptionalExtension, params};

use super::{Database, schema::CREDENTIAL_ID};
use crate::{error::Result, types::Credential};

/// Single-row store for the OAuth credential.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn load(&self) -> Result<Option<Credential>> {
        self.db
            .with_connection(|conn| {
                conn.query_row(
                    "SELECT access_token, refresh_token, token_type, scope, expires_in, issued_at
                     FROM credentials WHERE id = ?1",
                    params![CREDENTIAL_ID],
                    |row| {
                        Ok(Credential {
                            access_token: row.get(0)?,
                            refresh_token: row.get(1)?,
                            token_type: row.get(2)?,
                            scope: row.get(3)?,
                            expires_in: row.get(4)?,
                            issued_at: row.get(5)?,
                        })
                    },
                )
                .optional()
            })
            .await
    }

    /// Overwrites the credential row, creating it on first use.
    pub async fn save(&self, credential: &Credential) -> Result<()> {
        let c = credential.clone();
        self.db
            .with_connection(move |conn| {
                conn.execute(
                    "INSERT INTO credentials
                        (id, access_token, refresh_token, token_type, scope, expires_in, issued_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                        access_token = excluded.access_token,
                        refresh_token = excluded.refresh_token,
                        token_type = excluded.token_type,
                        scope = excluded.scope,
                        expires_in = excluded.expires_in,
                        issued_at = excluded.issued_at",
                    params![
                        CREDENTIAL_ID,
                        c.access_token,
                        c.refresh_token,
                        c.token_type,
                        c.scope,
                        c.expires_in,
                        c.issued_at
                    ],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn count(&self) -> Result<i64> {
        self.db
            .with_connection(|conn| {
                conn.query_row("SELECT COUNT(*) FROM credentials", [], |row| row.get(0))
            })
            .await
    }
}
