use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::entities::profiles::{InsertProfileEntity, ProfileEntity};
use crate::domain::value_objects::enums::features::Feature;

#[automock]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<ProfileEntity>>;

    async fn create(&self, insert_profile_entity: InsertProfileEntity) -> Result<ProfileEntity>;

    /// All profiles, newest first, for the admin listing.
    async fn list_all(&self) -> Result<Vec<ProfileEntity>>;

    /// Atomic `char_count = char_count + by` in a single statement.
    async fn increment_char_count(&self, email: &str, by: i64) -> Result<()>;

    async fn increment_image_count(&self, email: &str, by: i64) -> Result<()>;

    async fn set_payment_pending(&self, email: &str, reference: &str) -> Result<()>;

    /// Marks the payment approved and stamps only the given feature's
    /// premium expiry; the other feature's expiry is untouched.
    async fn approve_feature(
        &self,
        email: &str,
        feature: Feature,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;
}
