use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::profiles::ProfileEntity;
use crate::domain::value_objects::enums::features::Feature;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

/// Cumulative speech characters granted before a subscription is required.
pub const FREE_CHAR_LIMIT: i64 = 1000;

/// Cumulative image requests granted before a subscription is required.
pub const FREE_IMAGE_LIMIT: i64 = 5;

/// Length of the premium window an admin approval grants.
pub const SUBSCRIPTION_DAYS: i64 = 30;

/// Manual-transfer prices, in minor currency units.
pub const PRICE_VOICE_MINOR: i64 = 15_000;
pub const PRICE_IMAGE_MINOR: i64 = 50_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileDto {
    pub email: String,
    pub char_count: i64,
    pub image_count: i64,
    pub voice_subscribed_until: Option<DateTime<Utc>>,
    pub image_subscribed_until: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
    pub last_payment_ref: Option<String>,
    pub remaining_free_chars: i64,
    pub remaining_free_images: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileEntity> for ProfileDto {
    fn from(entity: ProfileEntity) -> Self {
        let payment_status =
            PaymentStatus::from_str(&entity.payment_status).unwrap_or(PaymentStatus::None);

        Self {
            remaining_free_chars: (FREE_CHAR_LIMIT - entity.char_count).max(0),
            remaining_free_images: (FREE_IMAGE_LIMIT - entity.image_count).max(0),
            email: entity.email,
            char_count: entity.char_count,
            image_count: entity.image_count,
            voice_subscribed_until: entity.voice_premium_expiry,
            image_subscribed_until: entity.image_premium_expiry,
            payment_status,
            last_payment_ref: entity.last_payment_ref,
            created_at: entity.created_at,
        }
    }
}

/// Manual-transfer details shown to a user whose quota ran out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentInstructionsDto {
    pub feature: Feature,
    pub price_minor: i64,
    pub wallet_number: String,
    pub wallet_name: String,
}
