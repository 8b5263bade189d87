//! Repository for the `clients` table.
//!
//! Only the operations webhook ingestion needs: exact-match lookup,
//! conflict-tolerant insert, blank filling and tier recomputation.

use bonusdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::client::{Client, ClientContact};

const COLUMNS: &str = "\
    id, name, surname, email, contact, trusted, tier_id, created_at, updated_at";

const CONTACT_COLUMNS: &str = "id, email, contact, surname";

/// Provides lookup and write operations for clients.
pub struct ClientRepo;

impl ClientRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Exact-match lookup on `email`.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<ClientContact>, sqlx::Error> {
        let query = format!("SELECT {CONTACT_COLUMNS} FROM clients WHERE email = $1 LIMIT 1");
        sqlx::query_as::<_, ClientContact>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Exact-match lookup on `contact` (the phone column).
    pub async fn find_by_contact(
        pool: &PgPool,
        contact: &str,
    ) -> Result<Option<ClientContact>, sqlx::Error> {
        let query = format!("SELECT {CONTACT_COLUMNS} FROM clients WHERE contact = $1 LIMIT 1");
        sqlx::query_as::<_, ClientContact>(&query)
            .bind(contact)
            .fetch_optional(pool)
            .await
    }

    /// Insert a client unless the email or contact is already taken.
    ///
    /// Returns `None` when a partial unique index absorbed the insert.
    pub async fn insert_if_absent(
        pool: &PgPool,
        name: &str,
        surname: Option<&str>,
        email: Option<&str>,
        contact: Option<&str>,
        trusted: bool,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO clients (name, surname, email, contact, trusted) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT DO NOTHING \
             RETURNING id",
        )
        .bind(name)
        .bind(surname)
        .bind(email)
        .bind(contact)
        .bind(trusted)
        .fetch_optional(pool)
        .await
    }

    /// Write each provided value only where the stored column is still null.
    /// An email or contact already held by another client is left null.
    ///
    /// Returns the row as it stands after the update, or `None` if the id
    /// does not exist.
    pub async fn fill_blanks(
        pool: &PgPool,
        id: DbId,
        email: Option<&str>,
        contact: Option<&str>,
        surname: Option<&str>,
    ) -> Result<Option<ClientContact>, sqlx::Error> {
        sqlx::query_as::<_, ClientContact>(
            "UPDATE clients AS c SET \
                email = COALESCE(c.email, CASE WHEN NOT EXISTS \
                    (SELECT 1 FROM clients o WHERE o.email = $2 AND o.id <> c.id) \
                    THEN $2 END), \
                contact = COALESCE(c.contact, CASE WHEN NOT EXISTS \
                    (SELECT 1 FROM clients o WHERE o.contact = $3 AND o.id <> c.id) \
                    THEN $3 END), \
                surname = COALESCE(c.surname, $4) \
             WHERE c.id = $1 \
             RETURNING c.id, c.email, c.contact, c.surname",
        )
        .bind(id)
        .bind(email)
        .bind(contact)
        .bind(surname)
        .fetch_optional(pool)
        .await
    }

    /// Run the `auto_assign_tier` stored procedure. Returns the new tier id.
    pub async fn assign_tier(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<DbId>>("SELECT auto_assign_tier($1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
