//! Order repository backed by `PostgreSQL`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use taco_cloud_core::{
    DeliveryAddress, NewOrder, OrderId, Page, PageRequest, PaymentDetails, PlacedOrder, Taco,
    UserId,
};

use super::tacos::{TacoRow, insert_taco, with_ingredients};
use super::{OrderRepository, RepositoryError, limit_offset};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    placed_at: DateTime<Utc>,
    delivery_name: String,
    delivery_street: String,
    delivery_city: String,
    delivery_state: String,
    delivery_zip: String,
    cc_number: String,
    cc_expiration: String,
    cc_cvv: String,
}

impl OrderRow {
    fn into_order(self, tacos: Vec<Taco>) -> PlacedOrder {
        PlacedOrder {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            placed_at: self.placed_at,
            delivery: DeliveryAddress {
                name: self.delivery_name,
                street: self.delivery_street,
                city: self.delivery_city,
                state: self.delivery_state,
                zip: self.delivery_zip,
            },
            payment: PaymentDetails {
                cc_number: self.cc_number,
                cc_expiration: self.cc_expiration,
                cc_cvv: self.cc_cvv,
            },
            tacos,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderTacoRow {
    order_id: i64,
    #[sqlx(flatten)]
    taco: TacoRow,
}

/// Repository for the `taco_order` table.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the tacos of the given orders, keyed by order id.
    async fn tacos_for(&self, order_ids: &[i64]) -> Result<HashMap<i64, Vec<Taco>>, RepositoryError> {
        let rows: Vec<OrderTacoRow> = sqlx::query_as(
            r"
            SELECT ot.order_id, t.id, t.name, t.created_at
            FROM taco_order_taco ot
            JOIN taco t ON t.id = ot.taco_id
            WHERE ot.order_id = ANY($1)
            ORDER BY ot.order_id, ot.position
            ",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let owners: Vec<i64> = rows.iter().map(|r| r.order_id).collect();
        let tacos = with_ingredients(&self.pool, rows.into_iter().map(|r| r.taco).collect()).await?;

        let mut by_order: HashMap<i64, Vec<Taco>> = HashMap::new();
        for (order_id, taco) in owners.into_iter().zip(tacos) {
            by_order.entry(order_id).or_default().push(taco);
        }
        Ok(by_order)
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn save(&self, order: NewOrder) -> Result<PlacedOrder, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (id, placed_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO taco_order (
                user_id, delivery_name, delivery_street, delivery_city,
                delivery_state, delivery_zip, cc_number, cc_expiration, cc_cvv
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, placed_at
            ",
        )
        .bind(order.user_id)
        .bind(&order.delivery.name)
        .bind(&order.delivery.street)
        .bind(&order.delivery.city)
        .bind(&order.delivery.state)
        .bind(&order.delivery.zip)
        .bind(&order.payment.cc_number)
        .bind(&order.payment.cc_expiration)
        .bind(&order.payment.cc_cvv)
        .fetch_one(&mut *tx)
        .await?;

        let mut tacos = Vec::with_capacity(order.tacos.len());
        for (position, design) in (0_i32..).zip(order.tacos) {
            let taco = insert_taco(&mut *tx, design).await?;
            sqlx::query(
                r"
                INSERT INTO taco_order_taco (order_id, position, taco_id)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(id)
            .bind(position)
            .bind(taco.id)
            .execute(&mut *tx)
            .await?;
            tacos.push(taco);
        }

        tx.commit().await?;

        Ok(PlacedOrder {
            id: OrderId::new(id),
            user_id: order.user_id,
            placed_at,
            delivery: order.delivery,
            payment: order.payment,
            tacos,
        })
    }

    async fn find_by_user_order_by_placed_at_desc(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<PlacedOrder>, RepositoryError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM taco_order WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let (limit, offset) = limit_offset(page);
        let rows: Vec<OrderRow> = sqlx::query_as(
            r"
            SELECT id, user_id, placed_at,
                   delivery_name, delivery_street, delivery_city, delivery_state, delivery_zip,
                   cc_number, cc_expiration, cc_cvv
            FROM taco_order
            WHERE user_id = $1
            ORDER BY placed_at DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut tacos = if ids.is_empty() {
            HashMap::new()
        } else {
            self.tacos_for(&ids).await?
        };

        let orders = rows
            .into_iter()
            .map(|row| {
                let order_tacos = tacos.remove(&row.id).unwrap_or_default();
                row.into_order(order_tacos)
            })
            .collect();

        let total = u64::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative order count {total}")))?;

        Ok(Page::new(orders, page, total))
    }
}
