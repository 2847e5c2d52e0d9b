use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use crate::domain::{DomainError, DomainResult, EntitlementRepository};
use crate::infrastructure::database::entities::customer_product;

/// Read-only view over `customer_products`
pub struct SeaOrmEntitlementRepository {
    db: DatabaseConnection,
}

impl SeaOrmEntitlementRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntitlementRepository for SeaOrmEntitlementRepository {
    async fn has_product(&self, customer_id: &str, product_id: &str) -> DomainResult<bool> {
        let count = customer_product::Entity::find()
            .filter(customer_product::Column::CustomerId.eq(customer_id))
            .filter(customer_product::Column::ProductId.eq(product_id))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::ResolutionFailure(format!("Database error: {}", e)))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerRepository, NewCustomer};
    use crate::infrastructure::database::repositories::SeaOrmCustomerRepository;
    use crate::infrastructure::database::test_connection;
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn reads_customer_products() {
        let db = test_connection().await;
        let customers = SeaOrmCustomerRepository::new(db.clone());
        let c = customers
            .create(NewCustomer {
                email: "a@example.com".into(),
                password_hash: "hash".into(),
                shop_name: None,
                access_key: "k".into(),
            })
            .await
            .unwrap();

        let repo = SeaOrmEntitlementRepository::new(db.clone());
        assert!(!repo.has_product(&c.id, "insights").await.unwrap());

        customer_product::ActiveModel {
            customer_id: Set(c.id.clone()),
            product_id: Set("insights".into()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        assert!(repo.has_product(&c.id, "insights").await.unwrap());
        assert!(!repo.has_product(&c.id, "seo-audit").await.unwrap());
        assert!(!repo.has_product("someone-else", "insights").await.unwrap());
    }

    #[tokio::test]
    async fn closed_connection_is_a_resolution_failure() {
        let db = test_connection().await;
        let repo = SeaOrmEntitlementRepository::new(db.clone());
        db.close().await.unwrap();

        assert!(matches!(
            repo.has_product("c1", "insights").await,
            Err(DomainError::ResolutionFailure(_))
        ));
    }
}
