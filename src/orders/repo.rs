use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

/// Order aggregate root. Children reference it by `order_id` only; the
/// store cascades deletes so no line or task can outlive its order.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub order_number: i64,
    pub order_date: OffsetDateTime,
    pub status: String,
    pub currency: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderLineRow {
    pub id: i64,
    pub order_id: i64,
    pub amount: f64,
    pub product_name: String,
    pub picked_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub order_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub execution_date: Option<OffsetDateTime>,
}

impl OrderRow {
    /// Owner-scoped lookup: a nonexistent id and a foreign-owned id are
    /// indistinguishable to the caller.
    pub async fn find_owned(db: &PgPool, id: i64, user_id: Uuid) -> sqlx::Result<Option<OrderRow>> {
        sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, name, order_number, order_date, status, currency
            FROM orders
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<OrderRow>> {
        sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, name, order_number, order_date, status, currency
            FROM orders
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        name: &str,
        order_number: i64,
        order_date: OffsetDateTime,
        status: &str,
        currency: &str,
    ) -> sqlx::Result<OrderRow> {
        sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (user_id, name, order_number, order_date, status, currency)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, order_number, order_date, status, currency
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(order_number)
        .bind(order_date)
        .bind(status)
        .bind(currency)
        .fetch_one(&mut **tx)
        .await
    }

    /// Writes back every mutable column. Currency is fixed at creation.
    pub async fn save(&self, tx: &mut Transaction<'_, Postgres>) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET name = $1, order_number = $2, order_date = $3, status = $4
            WHERE id = $5
            "#,
        )
        .bind(&self.name)
        .bind(self.order_number)
        .bind(self.order_date)
        .bind(&self.status)
        .bind(self.id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<()> {
        sqlx::query(r#"DELETE FROM orders WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

impl OrderLineRow {
    pub async fn list_by_order(db: &PgPool, order_id: i64) -> sqlx::Result<Vec<OrderLineRow>> {
        sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT id, order_id, amount, product_name, picked_date
            FROM order_lines
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(db)
        .await
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        order_id: i64,
        amount: f64,
        product_name: &str,
        picked_date: Option<OffsetDateTime>,
    ) -> sqlx::Result<OrderLineRow> {
        sqlx::query_as::<_, OrderLineRow>(
            r#"
            INSERT INTO order_lines (order_id, amount, product_name, picked_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, amount, product_name, picked_date
            "#,
        )
        .bind(order_id)
        .bind(amount)
        .bind(product_name)
        .bind(picked_date)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn delete_by_order(
        tx: &mut Transaction<'_, Postgres>,
        order_id: i64,
    ) -> sqlx::Result<()> {
        sqlx::query(r#"DELETE FROM order_lines WHERE order_id = $1"#)
            .bind(order_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

impl TaskRow {
    pub async fn list_by_order(db: &PgPool, order_id: i64) -> sqlx::Result<Vec<TaskRow>> {
        sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, order_id, name, description, execution_date
            FROM tasks
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(db)
        .await
    }

    /// Task lookup is always scoped to one order; equal task ids under
    /// other orders never match.
    pub async fn find_in_order(
        db: &PgPool,
        order_id: i64,
        task_id: i64,
    ) -> sqlx::Result<Option<TaskRow>> {
        sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, order_id, name, description, execution_date
            FROM tasks
            WHERE id = $1 AND order_id = $2
            "#,
        )
        .bind(task_id)
        .bind(order_id)
        .fetch_optional(db)
        .await
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        order_id: i64,
        name: &str,
        description: Option<&str>,
        execution_date: Option<OffsetDateTime>,
    ) -> sqlx::Result<TaskRow> {
        sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (order_id, name, description, execution_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, name, description, execution_date
            "#,
        )
        .bind(order_id)
        .bind(name)
        .bind(description)
        .bind(execution_date)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn save(&self, db: &PgPool) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET name = $1, description = $2, execution_date = $3
            WHERE id = $4
            "#,
        )
        .bind(&self.name)
        .bind(&self.description)
        .bind(self.execution_date)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete_in_order(db: &PgPool, order_id: i64, task_id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM tasks WHERE id = $1 AND order_id = $2"#)
            .bind(task_id)
            .bind(order_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
