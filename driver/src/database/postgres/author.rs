use error_stack::Report;
use sqlx::PgConnection;

use kernel::interface::query::{AuthorCriteria, Criteria, EntityQuery};
use kernel::interface::update::EntityModifier;
use kernel::prelude::entity::{
    Author, AuthorBiography, AuthorFirstName, AuthorId, AuthorLastName, DestructAuthor, Entity,
    EntityId,
};
use kernel::KernelError;

use crate::database::postgres::{sync_sequence, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresAuthorRepository {
    db: PostgresDatabase,
}

impl PostgresAuthorRepository {
    pub fn new(db: PostgresDatabase) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl EntityQuery<Author> for PostgresAuthorRepository {
    async fn find_by_id(&self, id: &AuthorId) -> error_stack::Result<Option<Author>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgAuthorInternal::find_by_id(&mut con, id).await
    }

    async fn find_all(&self) -> error_stack::Result<Vec<Author>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgAuthorInternal::find_all(&mut con).await
    }

    async fn search(
        &self,
        criteria: &AuthorCriteria,
    ) -> error_stack::Result<Vec<Author>, KernelError> {
        let authors = self.find_all().await?;
        Ok(authors
            .into_iter()
            .filter(|author| criteria.matches(author))
            .collect())
    }
}

#[async_trait::async_trait]
impl EntityModifier<Author> for PostgresAuthorRepository {
    async fn create(&self, author: &Author) -> error_stack::Result<Author, KernelError> {
        author.validate()?;
        let mut con = self.db.acquire().await?;
        PgAuthorInternal::create(&mut con, author).await
    }

    async fn update(
        &self,
        id: &AuthorId,
        author: &Author,
    ) -> error_stack::Result<Author, KernelError> {
        let author = author.clone().with_id(*id);
        author.validate()?;
        let mut con = self.db.acquire().await?;
        PgAuthorInternal::update(&mut con, &author).await
    }

    async fn delete(&self, id: &AuthorId) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.acquire().await?;
        PgAuthorInternal::delete(&mut con, id).await
    }
}

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: i32,
    first_name: String,
    last_name: String,
    bio: String,
}

impl From<AuthorRow> for Author {
    fn from(value: AuthorRow) -> Self {
        Author::new(
            AuthorId::new(value.id),
            AuthorFirstName::new(value.first_name),
            AuthorLastName::new(value.last_name),
            AuthorBiography::new(value.bio),
        )
    }
}

pub(in crate::database) struct PgAuthorInternal;

impl PgAuthorInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &AuthorId,
    ) -> error_stack::Result<Option<Author>, KernelError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            // language=postgresql
            r#"
            SELECT id, first_name, last_name, bio
            FROM authors
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Author::from))
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Author>, KernelError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            // language=postgresql
            r#"
            SELECT id, first_name, last_name, bio
            FROM authors
            ORDER BY id
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Author::from).collect())
    }

    async fn create(
        con: &mut PgConnection,
        author: &Author,
    ) -> error_stack::Result<Author, KernelError> {
        let explicit = author.id().is_assigned();
        let DestructAuthor {
            id,
            first_name,
            last_name,
            bio,
        } = author.clone().into_destruct();
        let row = if explicit {
            sqlx::query_as::<_, AuthorRow>(
                // language=postgresql
                r#"
                INSERT INTO authors (id, first_name, last_name, bio)
                VALUES ($1, $2, $3, $4)
                RETURNING id, first_name, last_name, bio
                "#,
            )
            .bind(id.as_ref())
        } else {
            sqlx::query_as::<_, AuthorRow>(
                // language=postgresql
                r#"
                INSERT INTO authors (first_name, last_name, bio)
                VALUES ($1, $2, $3)
                RETURNING id, first_name, last_name, bio
                "#,
            )
        }
        .bind(first_name.as_ref())
        .bind(last_name.as_ref())
        .bind(bio.as_ref())
        .fetch_one(&mut *con)
        .await
        .convert_error()?;
        if explicit {
            sync_sequence(con, "authors").await?;
        }
        Ok(Author::from(row))
    }

    async fn update(
        con: &mut PgConnection,
        author: &Author,
    ) -> error_stack::Result<Author, KernelError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            // language=postgresql
            r#"
            UPDATE authors
            SET first_name = $2, last_name = $3, bio = $4
            WHERE id = $1
            RETURNING id, first_name, last_name, bio
            "#,
        )
        .bind(author.id().as_ref())
        .bind(author.first_name().as_ref())
        .bind(author.last_name().as_ref())
        .bind(author.bio().as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Author::from).ok_or_else(|| {
            Report::new(KernelError::NotFound)
                .attach_printable(format!("{} does not exist", author.id()))
        })
    }

    async fn delete(con: &mut PgConnection, id: &AuthorId) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            DELETE FROM authors
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("{id} does not exist")));
        }
        Ok(())
    }
}
