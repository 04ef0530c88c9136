use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::infra::db::postgres::schema::profiles;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = profiles)]
#[diesel(primary_key(email))]
pub struct ProfileEntity {
    pub email: String,
    pub char_count: i64,
    pub image_count: i64,
    pub voice_premium_expiry: Option<DateTime<Utc>>,
    pub image_premium_expiry: Option<DateTime<Utc>>,
    pub payment_status: String,
    pub last_payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub struct InsertProfileEntity {
    pub email: String,
    pub char_count: i64,
    pub image_count: i64,
    pub payment_status: String,
}

impl InsertProfileEntity {
    /// A freshly registered profile: zeroed counters, no payment activity.
    pub fn fresh(email: String) -> Self {
        Self {
            email,
            char_count: 0,
            image_count: 0,
            payment_status: PaymentStatus::None.to_string(),
        }
    }
}
