use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::profiles},
};
use domain::{
    entities::profiles::{InsertProfileEntity, ProfileEntity},
    repositories::profiles::ProfileRepository,
    value_objects::enums::{features::Feature, payment_statuses::PaymentStatus},
};

pub struct ProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProfileRepository for ProfilePostgres {
    async fn find_by_email(&self, email: &str) -> Result<Option<ProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = profiles::table
            .filter(profiles::email.eq(email))
            .select(ProfileEntity::as_select())
            .first::<ProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create(&self, insert_profile_entity: InsertProfileEntity) -> Result<ProfileEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(profiles::table)
            .values(&insert_profile_entity)
            .returning(ProfileEntity::as_returning())
            .get_result::<ProfileEntity>(&mut conn)?;

        Ok(result)
    }

    async fn list_all(&self) -> Result<Vec<ProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = profiles::table
            .order(profiles::created_at.desc())
            .select(ProfileEntity::as_select())
            .load::<ProfileEntity>(&mut conn)?;

        Ok(results)
    }

    async fn increment_char_count(&self, email: &str, by: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(profiles::table)
            .filter(profiles::email.eq(email))
            .set(profiles::char_count.eq(profiles::char_count + by))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn increment_image_count(&self, email: &str, by: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(profiles::table)
            .filter(profiles::email.eq(email))
            .set(profiles::image_count.eq(profiles::image_count + by))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_payment_pending(&self, email: &str, reference: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(profiles::table)
            .filter(profiles::email.eq(email))
            .set((
                profiles::payment_status.eq(PaymentStatus::Pending.to_string()),
                profiles::last_payment_ref.eq(Some(reference)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn approve_feature(
        &self,
        email: &str,
        feature: Feature,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let status = PaymentStatus::Approved.to_string();
        match feature {
            Feature::Voice | Feature::Video => {
                update(profiles::table)
                    .filter(profiles::email.eq(email))
                    .set((
                        profiles::payment_status.eq(status),
                        profiles::voice_premium_expiry.eq(Some(expires_at)),
                    ))
                    .execute(&mut conn)?;
            }
            Feature::Image => {
                update(profiles::table)
                    .filter(profiles::email.eq(email))
                    .set((
                        profiles::payment_status.eq(status),
                        profiles::image_premium_expiry.eq(Some(expires_at)),
                    ))
                    .execute(&mut conn)?;
            }
        }

        Ok(())
    }
}
