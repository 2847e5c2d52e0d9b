//! Customer entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub shop_name: Option<String>,
    pub access_key: String,
    pub data_consent: bool,
    pub consent_updated_at: Option<DateTime<Utc>>,
    pub signup_date: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    /// Only ever changed by a single-statement increment or reset
    pub usage_count: i32,
    pub usage_reset_date: DateTime<Utc>,
    pub is_premium: bool,
    pub is_email_verified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::customer_product::Entity")]
    CustomerProducts,
}

impl Related<super::customer_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerProducts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
