use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};
use tracing::debug;

use crate::domain::{
    Customer, CustomerRepository, DomainError, DomainResult, NewCustomer, UsageRepository,
    UsageSnapshot,
};
use crate::infrastructure::database::entities::customer;

/// Customers table. Usage mutations are single conditional UPDATE statements.
pub struct SeaOrmCustomerRepository {
    db: DatabaseConnection,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn exists(&self, id: &str) -> DomainResult<bool> {
        let count = customer::Entity::find()
            .filter(customer::Column::Id.eq(id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn customer_model_to_domain(model: customer::Model) -> Customer {
    Customer {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        shop_name: model.shop_name,
        access_key: model.access_key,
        data_consent: model.data_consent,
        consent_updated_at: model.consent_updated_at,
        signup_date: model.signup_date,
        last_login: model.last_login,
        usage_count: usage_count_to_domain(model.usage_count),
        usage_reset_date: model.usage_reset_date,
        is_premium: model.is_premium,
        is_email_verified: model.is_email_verified,
    }
}

/// The column is a signed integer; a negative value can only come from
/// outside this service and is read as zero.
fn usage_count_to_domain(raw: i32) -> u32 {
    u32::try_from(raw).unwrap_or(0)
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    async fn create(&self, new: NewCustomer) -> DomainResult<Customer> {
        let now = Utc::now();
        let model = customer::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            email: Set(new.email.to_lowercase()),
            password_hash: Set(new.password_hash),
            shop_name: Set(new.shop_name),
            access_key: Set(new.access_key),
            data_consent: Set(true),
            consent_updated_at: Set(Some(now)),
            signup_date: Set(now),
            last_login: Set(None),
            usage_count: Set(0),
            usage_reset_date: Set(now),
            is_premium: Set(false),
            is_email_verified: Set(false),
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") || msg.contains("duplicate") {
                DomainError::Conflict("Email already registered".to_string())
            } else {
                db_err(e)
            }
        })?;

        Ok(customer_model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Customer>> {
        let model = customer::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(customer_model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Customer>> {
        let model = customer::Entity::find()
            .filter(customer::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(customer_model_to_domain))
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let result = customer::Entity::update_many()
            .col_expr(customer::Column::LastLogin, Expr::value(Some(at)))
            .filter(customer::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::CustomerNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UsageRepository for SeaOrmCustomerRepository {
    async fn load_usage(&self, customer_id: &str) -> DomainResult<UsageSnapshot> {
        let row: Option<(i32, DateTime<Utc>)> = customer::Entity::find_by_id(customer_id.to_string())
            .select_only()
            .column(customer::Column::UsageCount)
            .column(customer::Column::UsageResetDate)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let (count, reset) =
            row.ok_or_else(|| DomainError::CustomerNotFound(customer_id.to_string()))?;
        Ok(UsageSnapshot {
            usage_count: usage_count_to_domain(count),
            usage_reset_date: reset,
        })
    }

    async fn reset_usage_if_unchanged(
        &self,
        customer_id: &str,
        observed: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if observed >= now {
            return Err(DomainError::ConcurrencyConflict(customer_id.to_string()));
        }

        // UPDATE customers SET usage_count = 0, usage_reset_date = $now
        //  WHERE id = $id AND usage_reset_date = $observed
        let result = customer::Entity::update_many()
            .col_expr(customer::Column::UsageCount, Expr::value(0))
            .col_expr(customer::Column::UsageResetDate, Expr::value(now))
            .filter(customer::Column::Id.eq(customer_id))
            .filter(customer::Column::UsageResetDate.eq(observed))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 1 {
            return Ok(());
        }

        if self.exists(customer_id).await? {
            debug!(customer_id, "Usage reset lost to a concurrent writer");
            Err(DomainError::ConcurrencyConflict(customer_id.to_string()))
        } else {
            Err(DomainError::CustomerNotFound(customer_id.to_string()))
        }
    }

    async fn increment_usage(&self, customer_id: &str) -> DomainResult<()> {
        // UPDATE customers SET usage_count = usage_count + 1 WHERE id = $id
        let result = customer::Entity::update_many()
            .col_expr(
                customer::Column::UsageCount,
                Expr::col(customer::Column::UsageCount).add(1),
            )
            .filter(customer::Column::Id.eq(customer_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::CustomerNotFound(customer_id.to_string()));
        }
        Ok(())
    }

    async fn increment_usage_below(&self, customer_id: &str, limit: u32) -> DomainResult<bool> {
        // UPDATE customers SET usage_count = usage_count + 1
        //  WHERE id = $id AND usage_count < $limit
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let result = customer::Entity::update_many()
            .col_expr(
                customer::Column::UsageCount,
                Expr::col(customer::Column::UsageCount).add(1),
            )
            .filter(customer::Column::Id.eq(customer_id))
            .filter(customer::Column::UsageCount.lt(limit))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 1 {
            return Ok(true);
        }

        if self.exists(customer_id).await? {
            Ok(false)
        } else {
            Err(DomainError::CustomerNotFound(customer_id.to_string()))
        }
    }
}
