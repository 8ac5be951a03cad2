use sqlx::{self, FromRow, Row};
use std::marker::PhantomData;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::query_builder::{bind_param_query, bind_param_query_as, QueryBuilder};
use crate::database::resource::Resource;
use crate::filter::{calculate_metadata, Condition, Filters, Metadata};

/// Data access for one resource table. A scoped repository restricts every
/// statement to rows whose scope column matches, e.g. reviews of one item.
pub struct Repository<T> {
    db: DatabaseManager,
    scope: Option<(&'static str, i64)>,
    _phantom: PhantomData<T>,
}

impl<T: Resource> Repository<T> {
    pub fn new(db: DatabaseManager) -> Self {
        Self {
            db,
            scope: None,
            _phantom: PhantomData,
        }
    }

    pub fn scoped(db: DatabaseManager, column: &'static str, value: i64) -> Self {
        Self {
            db,
            scope: Some((column, value)),
            _phantom: PhantomData,
        }
    }

    fn builder(&self) -> QueryBuilder<T> {
        QueryBuilder::new(self.scope)
    }

    fn scope_is_valid(&self) -> bool {
        self.scope.map_or(true, |(_, value)| value >= 1)
    }

    pub async fn insert(&self, record: &T) -> Result<T, DatabaseError> {
        let sql = self.builder().insert(record);
        let mut q = sqlx::query_as::<_, T>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        self.db.run(q.fetch_one(self.db.pool())).await
    }

    pub async fn get(&self, id: i64) -> Result<T, DatabaseError> {
        if id < 1 || !self.scope_is_valid() {
            return Err(DatabaseError::NotFound);
        }
        let sql = self.builder().select_by_id(id);
        let mut q = sqlx::query_as::<_, T>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        self.db
            .run(q.fetch_optional(self.db.pool()))
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    pub async fn exists(&self, id: i64) -> Result<bool, DatabaseError> {
        match self.get(id).await {
            Ok(_) => Ok(true),
            Err(DatabaseError::NotFound) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Replace the writable columns and bump `version`. Returns the stored row.
    pub async fn update(&self, record: &T) -> Result<T, DatabaseError> {
        if record.id() < 1 || !self.scope_is_valid() {
            return Err(DatabaseError::NotFound);
        }
        let sql = self.builder().update(record);
        let mut q = sqlx::query_as::<_, T>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        self.db
            .run(q.fetch_optional(self.db.pool()))
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        if id < 1 || !self.scope_is_valid() {
            return Err(DatabaseError::NotFound);
        }
        let sql = self.builder().delete(id);
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let result = self.db.run(q.execute(self.db.pool())).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    /// One page of records plus metadata derived from the window count.
    pub async fn list(&self, conditions: &[Condition], filters: &Filters) -> Result<(Vec<T>, Metadata), DatabaseError> {
        let sql = self.builder().list(conditions, filters)?;
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = self.db.run(q.fetch_all(self.db.pool())).await?;

        let mut total_records = 0i64;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            total_records = row.try_get("total_records")?;
            records.push(T::from_row(row)?);
        }

        tracing::debug!(table = T::TABLE, total_records, returned = records.len(), "listed records");
        Ok((records, calculate_metadata(total_records, filters.page, filters.page_size)))
    }
}
