//! Record store adapter.
//!
//! Point reads and writes, conditional writes and index range scans against
//! the single `records` table. Every conditional operation is one SQL
//! statement, so concurrent requests race on the database's per-row
//! atomicity instead of a read-then-write.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, Iterable, QueryFilter, QueryOrder, SqlErr,
    prelude::*, sea_query::OnConflict,
};

use crate::{
    EngineError, ResultEngine,
    records::{self, Column},
    window::MonthWindow,
};

#[derive(Clone, Debug)]
pub struct RecordStore {
    database: DatabaseConnection,
}

impl RecordStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub async fn get(&self, pk: &str, sk: &str) -> ResultEngine<Option<records::Model>> {
        let model = records::Entity::find_by_id((pk.to_string(), sk.to_string()))
            .one(&self.database)
            .await?;
        Ok(model)
    }

    /// Unconditional write: inserts the row, replacing any row with the same key.
    pub async fn put(&self, record: records::ActiveModel) -> ResultEngine<()> {
        let on_conflict = OnConflict::columns([Column::Pk, Column::Sk])
            .update_columns(Column::iter().filter(|c| !matches!(c, Column::Pk | Column::Sk)))
            .to_owned();
        records::Entity::insert(record)
            .on_conflict(on_conflict)
            .exec_without_returning(&self.database)
            .await?;
        Ok(())
    }

    /// Inserts the row only if no row with the same key (or the same unique
    /// email) exists. A collision is reported as [`EngineError::ExistingKey`]
    /// carrying `label`.
    pub async fn put_if_absent(
        &self,
        record: records::ActiveModel,
        label: &str,
    ) -> ResultEngine<()> {
        match records::Entity::insert(record)
            .exec_without_returning(&self.database)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(EngineError::ExistingKey(label.to_string()))
                }
                _ => Err(err.into()),
            },
        }
    }

    /// Applies the set columns of `changes` to the row at `(pk, sk)`. Fails
    /// with [`EngineError::KeyNotFound`] carrying `label` if the row does not
    /// exist.
    pub async fn update_if_exists(
        &self,
        pk: &str,
        sk: &str,
        changes: records::ActiveModel,
        label: &str,
    ) -> ResultEngine<()> {
        if !changes.is_changed() {
            return Err(EngineError::Validation("no fields to update".to_string()));
        }
        let result = records::Entity::update_many()
            .set(changes)
            .filter(Column::Pk.eq(pk))
            .filter(Column::Sk.eq(sk))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(label.to_string()));
        }
        Ok(())
    }

    /// Deletes the row at `(pk, sk)`. Deleting a missing key is not an error.
    pub async fn delete(&self, pk: &str, sk: &str) -> ResultEngine<()> {
        records::Entity::delete_many()
            .filter(Column::Pk.eq(pk))
            .filter(Column::Sk.eq(sk))
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Scans the `(user_id, created_at)` index, oldest first.
    ///
    /// Transactions and budgets come back interleaved; callers select by
    /// sort-key prefix. With a window, both bounds are inclusive.
    pub async fn query_by_user(
        &self,
        user_id: &str,
        window: Option<&MonthWindow>,
    ) -> ResultEngine<Vec<records::Model>> {
        let mut query = records::Entity::find().filter(Column::UserId.eq(user_id));
        if let Some(window) = window {
            query = query.filter(
                Column::CreatedAt.between(window.start.clone(), window.end.clone()),
            );
        }
        let rows = query
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Sk)
            .all(&self.database)
            .await?;
        Ok(rows)
    }

    /// Looks a profile up through the email index.
    pub async fn find_by_email(&self, email: &str) -> ResultEngine<Option<records::Model>> {
        let model = records::Entity::find()
            .filter(Column::Email.eq(email))
            .one(&self.database)
            .await?;
        Ok(model)
    }
}
