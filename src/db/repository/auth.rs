use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::UserRole;

use super::parse_uuid;

/// Authenticated principal resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

pub fn issue_token(
    conn: &Connection,
    token: &str,
    user_id: &Uuid,
    email: &str,
    role: UserRole,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO auth_tokens (token, user_id, email, role) VALUES (?1, ?2, ?3, ?4)",
        params![token, user_id.to_string(), email, role.as_str()],
    )?;
    Ok(())
}

pub fn lookup_token(conn: &Connection, token: &str) -> Result<Option<Principal>, DatabaseError> {
    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT user_id, email, role FROM auth_tokens WHERE token = ?1",
            params![token],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    match row {
        Some((user_id, email, role)) => Ok(Some(Principal {
            user_id: parse_uuid(&user_id)?,
            email,
            role: UserRole::from_str(&role)?,
        })),
        None => Ok(None),
    }
}

pub fn revoke_token(conn: &Connection, token: &str) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM auth_tokens WHERE token = ?1", params![token])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    #[test]
    fn token_round_trip_and_revoke() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();
        issue_token(&conn, "tok-1", &user, "nurse@carehub.test", UserRole::Admin).unwrap();

        let principal = lookup_token(&conn, "tok-1").unwrap().unwrap();
        assert_eq!(principal.user_id, user);
        assert_eq!(principal.role, UserRole::Admin);
        assert_eq!(principal.email, "nurse@carehub.test");

        revoke_token(&conn, "tok-1").unwrap();
        assert!(lookup_token(&conn, "tok-1").unwrap().is_none());
    }

    #[test]
    fn unknown_token_resolves_to_none() {
        let conn = open_memory_database().unwrap();
        assert!(lookup_token(&conn, "nope").unwrap().is_none());
    }
}
