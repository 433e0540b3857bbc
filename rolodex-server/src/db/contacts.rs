//! Contact repository.
//!
//! Uniqueness is enforced by the store's constraints: a unique
//! violation surfaces as `DbError::Conflict` instead of a separate
//! check query, which closes the check-then-write race the pre-check
//! would leave open.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Row};

use rolodex_core::{Dialect, NewContact, QueryBuilder, QuerySpec, SqlParam};

/// Placeholder dialect of this deployment's backend.
pub const DIALECT: Dialect = Dialect::Numbered;

/// Base predicate the list query builder extends.
const BASE_QUERY: &str =
    "SELECT id, name, email, phone, created_at, updated_at FROM contacts WHERE 1=1";

/// Contact record from the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{0}")]
    Conflict(&'static str),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(dbe) if dbe.is_unique_violation() => {
                DbError::Conflict("email or phone already exists")
            }
            _ => DbError::Sqlx(err),
        }
    }
}

/// Contact repository.
pub struct ContactRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert one contact. Unique violations map to `Conflict`.
    pub async fn create(&self, contact: &NewContact) -> Result<Contact, DbError> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO contacts (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, phone, created_at, updated_at
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// List with search/sort/pagination plus the total count of the
    /// filtered set. Both queries complete before this returns.
    pub async fn list(&self, spec: &QuerySpec) -> Result<(Vec<Contact>, i64), DbError> {
        let built = QueryBuilder::new(BASE_QUERY, DIALECT).apply(spec).build();

        let mut data = sqlx::query_as::<_, Contact>(&built.data_query);
        for param in &built.data_params {
            data = match param {
                SqlParam::Text(value) => data.bind(value),
                SqlParam::Int(value) => data.bind(value),
            };
        }
        let items = data.fetch_all(self.pool).await?;

        let mut count = sqlx::query_as::<_, (i64,)>(&built.count_query);
        for param in &built.count_params {
            count = match param {
                SqlParam::Text(value) => count.bind(value),
                SqlParam::Int(value) => count.bind(value),
            };
        }
        let (total,) = count.fetch_one(self.pool).await?;

        Ok((items, total))
    }

    /// Update a contact in a single atomic statement.
    ///
    /// Missing id is `NotFound`; an email/phone collision with a
    /// different row is `Conflict` via the unique constraints.
    pub async fn update(&self, id: i64, contact: &NewContact) -> Result<Contact, DbError> {
        let updated: Option<Contact> = sqlx::query_as(
            r#"
            UPDATE contacts
            SET name = $1, email = $2, phone = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, email, phone, created_at, updated_at
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        updated.ok_or_else(|| DbError::NotFound {
            resource: "contact",
            id: id.to_string(),
        })
    }

    /// Delete one contact by id.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "contact",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Delete a set of contacts, returning how many existed.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = ANY($1)")
            .bind(ids)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Insert a screened batch in one statement, skipping rows that
    /// collide with existing data. Returns the number of rows the
    /// store actually inserted, which may be lower than the number
    /// attempted when duplicates were skipped.
    pub async fn insert_ignore_conflicts(&self, contacts: &[NewContact]) -> Result<u64, DbError> {
        if contacts.is_empty() {
            return Ok(0);
        }

        let names: Vec<&str> = contacts.iter().map(|c| c.name.as_str()).collect();
        let emails: Vec<&str> = contacts.iter().map(|c| c.email.as_str()).collect();
        let phones: Vec<&str> = contacts.iter().map(|c| c.phone.as_str()).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO contacts (name, email, phone)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&names)
        .bind(&emails)
        .bind(&phones)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Fetch every record projected to the exportable columns,
    /// unfiltered and unpaginated.
    pub async fn export_rows(&self) -> Result<Vec<NewContact>, DbError> {
        let rows = sqlx::query("SELECT name, email, phone FROM contacts ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| NewContact {
                name: row.get("name"),
                email: row.get("email"),
                phone: row.get("phone"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::SortOrder;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        crate::db::bootstrap(&pool).await.expect("bootstrap failed");
        pool
    }

    fn contact(name: &str, email: &str, phone: &str) -> NewContact {
        NewContact {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_collision_is_conflict_and_writes_nothing() {
        let pool = test_pool().await;
        let repo = ContactRepo::new(&pool);

        let a = repo
            .create(&contact("A", "conflict-a@test.invalid", "9000000001"))
            .await
            .unwrap();
        let b = repo
            .create(&contact("B", "conflict-b@test.invalid", "9000000002"))
            .await
            .unwrap();

        // B takes A's email: rejected by the unique constraint.
        let err = repo
            .update(b.id, &contact("B", "conflict-a@test.invalid", "9000000002"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        // Follow-up read sees B unchanged.
        let spec = QuerySpec {
            keyword: Some("conflict-b".into()),
            sort: None,
            order: SortOrder::Ascending,
            page: 1,
        };
        let (items, _) = repo.list(&spec).await.unwrap();
        assert_eq!(items[0].email, "conflict-b@test.invalid");

        repo.delete_many(&[a.id, b.id]).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn bulk_insert_skips_existing_rows() {
        let pool = test_pool().await;
        let repo = ContactRepo::new(&pool);

        let existing = repo
            .create(&contact("Dup", "bulk-dup@test.invalid", "9000000003"))
            .await
            .unwrap();

        let batch = vec![
            contact("Dup", "bulk-dup@test.invalid", "9000000003"),
            contact("Fresh", "bulk-fresh@test.invalid", "9000000004"),
        ];
        let inserted = repo.insert_ignore_conflicts(&batch).await.unwrap();
        assert_eq!(inserted, 1);

        let spec = QuerySpec {
            keyword: Some("bulk-fresh".into()),
            sort: None,
            order: SortOrder::Ascending,
            page: 1,
        };
        let (items, total) = repo.list(&spec).await.unwrap();
        assert_eq!(total, 1);

        repo.delete_many(&[existing.id, items[0].id]).await.unwrap();
    }
}
