use chrono::{DateTime, Utc};
use crates::domain::{
    entities::profiles::ProfileEntity,
    value_objects::{
        enums::features::Feature,
        profiles::{FREE_CHAR_LIMIT, FREE_IMAGE_LIMIT},
    },
};
use tracing::debug;

/// Decides whether a profile may perform a generation right now.
///
/// The administrator identity bypasses everything. A live subscription for
/// the feature bypasses the counters. Otherwise the cumulative counter plus
/// the requested amount must stay within the free limit. Video is the odd
/// one out: it has no free tier and no expiry column of its own — it is
/// unlocked by the *voice* subscription.
#[derive(Debug, Clone)]
pub struct EntitlementEvaluator {
    admin_email: String,
}

impl EntitlementEvaluator {
    pub fn new(admin_email: String) -> Self {
        Self { admin_email }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        email == self.admin_email
    }

    pub fn is_allowed(
        &self,
        profile: &ProfileEntity,
        feature: Feature,
        incremental_usage: i64,
        now: DateTime<Utc>,
    ) -> bool {
        if self.is_admin(&profile.email) {
            return true;
        }

        let allowed = match feature {
            Feature::Voice => {
                subscription_active(profile.voice_premium_expiry, now)
                    || profile.char_count + incremental_usage <= FREE_CHAR_LIMIT
            }
            Feature::Image => {
                subscription_active(profile.image_premium_expiry, now)
                    || profile.image_count + incremental_usage <= FREE_IMAGE_LIMIT
            }
            // No free tier; rides the voice subscription flag.
            Feature::Video => subscription_active(profile.voice_premium_expiry, now),
        };

        debug!(
            email = %profile.email,
            feature = %feature,
            incremental_usage,
            allowed,
            "entitlement: evaluated"
        );

        allowed
    }
}

fn subscription_active(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expiry.is_some_and(|until| until > now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const ADMIN: &str = "admin@voxgen.dev";

    fn evaluator() -> EntitlementEvaluator {
        EntitlementEvaluator::new(ADMIN.to_string())
    }

    fn profile(email: &str) -> ProfileEntity {
        ProfileEntity {
            email: email.to_string(),
            char_count: 0,
            image_count: 0,
            voice_premium_expiry: None,
            image_premium_expiry: None,
            payment_status: "none".to_string(),
            last_payment_ref: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_is_allowed_everything_at_any_amount() {
        let now = Utc::now();
        let mut admin = profile(ADMIN);
        admin.char_count = 1_000_000;
        admin.image_count = 1_000_000;

        for feature in [Feature::Voice, Feature::Image, Feature::Video] {
            assert!(evaluator().is_allowed(&admin, feature, 1_000_000, now));
        }
    }

    #[test]
    fn active_subscription_ignores_counters() {
        let now = Utc::now();
        let mut user = profile("user@example.com");
        user.char_count = 99_999;
        user.voice_premium_expiry = Some(now + Duration::days(3));

        assert!(evaluator().is_allowed(&user, Feature::Voice, 50_000, now));
    }

    #[test]
    fn lapsed_subscription_falls_back_to_the_free_quota() {
        let now = Utc::now();
        let mut user = profile("user@example.com");
        user.char_count = 999;
        user.voice_premium_expiry = Some(now - Duration::seconds(1));

        assert!(evaluator().is_allowed(&user, Feature::Voice, 1, now));
        assert!(!evaluator().is_allowed(&user, Feature::Voice, 2, now));
    }

    #[test]
    fn voice_quota_boundary_is_inclusive() {
        let now = Utc::now();
        let mut user = profile("user@example.com");
        user.char_count = 500;

        assert!(evaluator().is_allowed(&user, Feature::Voice, 500, now));
        assert!(!evaluator().is_allowed(&user, Feature::Voice, 501, now));
    }

    #[test]
    fn image_quota_allows_exactly_five_requests() {
        let now = Utc::now();
        let mut user = profile("user@example.com");

        for used in 0..FREE_IMAGE_LIMIT {
            user.image_count = used;
            assert!(evaluator().is_allowed(&user, Feature::Image, 1, now));
        }

        user.image_count = FREE_IMAGE_LIMIT;
        assert!(!evaluator().is_allowed(&user, Feature::Image, 1, now));
    }

    #[test]
    fn video_has_no_free_tier() {
        let now = Utc::now();
        let user = profile("user@example.com");

        assert!(!evaluator().is_allowed(&user, Feature::Video, 1, now));
    }

    #[test]
    fn video_unlocks_via_the_voice_subscription() {
        let now = Utc::now();
        let mut user = profile("user@example.com");
        user.voice_premium_expiry = Some(now + Duration::days(10));

        assert!(evaluator().is_allowed(&user, Feature::Video, 1, now));
    }

    #[test]
    fn image_subscription_alone_never_grants_video() {
        let now = Utc::now();
        let mut user = profile("user@example.com");
        user.image_premium_expiry = Some(now + Duration::days(10));

        assert!(!evaluator().is_allowed(&user, Feature::Video, 1, now));
        // and the image feature itself is of course unlocked
        assert!(evaluator().is_allowed(&user, Feature::Image, 100, now));
    }

    #[test]
    fn expiry_exactly_at_now_counts_as_lapsed() {
        let now = Utc::now();
        let mut user = profile("user@example.com");
        user.voice_premium_expiry = Some(now);
        user.char_count = FREE_CHAR_LIMIT;

        assert!(!evaluator().is_allowed(&user, Feature::Voice, 1, now));
    }
}
