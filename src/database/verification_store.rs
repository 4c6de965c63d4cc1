use crate::entities::phone_verification_entity as pv;
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Persistence for phone verification records, keyed by normalized phone.
///
/// Every mutating call is a single conditional statement so concurrent
/// requests for the same phone cannot interleave between read and write.
#[async_trait]
pub trait VerificationStore: Send + Sync {
    async fn find(&self, phone: &str) -> AppResult<Option<pv::Model>>;

    /// Insert or overwrite the record for `record.phone`.
    ///
    /// An existing row is only replaced when its `created_at` is at or before
    /// `not_after`. Returns false when a newer row won.
    async fn issue(&self, record: pv::Model, not_after: DateTime<Utc>) -> AppResult<bool>;

    /// Decrement remaining attempts of the unverified record issued at
    /// `issued_at`. Returns false when no attempts were left to consume or
    /// the record was replaced by a newer code.
    async fn consume_attempt(&self, phone: &str, issued_at: DateTime<Utc>) -> AppResult<bool>;

    /// Remove the record issued at `issued_at`, leaving newer records alone.
    async fn discard(&self, phone: &str, issued_at: DateTime<Utc>) -> AppResult<()>;

    /// Flag the record verified if `code` still matches, is unexpired and
    /// has attempts remaining.
    async fn mark_verified(&self, phone: &str, code: &str, now: DateTime<Utc>)
    -> AppResult<bool>;
}

#[derive(Clone)]
pub struct SeaOrmVerificationStore {
    pool: DatabaseConnection,
}

impl SeaOrmVerificationStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationStore for SeaOrmVerificationStore {
    async fn find(&self, phone: &str) -> AppResult<Option<pv::Model>> {
        let record = pv::Entity::find_by_id(phone.to_string())
            .one(&self.pool)
            .await?;
        Ok(record)
    }

    async fn issue(&self, record: pv::Model, not_after: DateTime<Utc>) -> AppResult<bool> {
        let model = pv::ActiveModel {
            phone: Set(record.phone),
            otp_code: Set(record.otp_code),
            expires_at: Set(record.expires_at),
            attempts: Set(record.attempts),
            verified: Set(record.verified),
            created_at: Set(record.created_at),
        };

        // ON CONFLICT (phone) DO UPDATE ... WHERE phone_verifications.created_at <= $not_after
        let on_conflict = OnConflict::column(pv::Column::Phone)
            .update_columns([
                pv::Column::OtpCode,
                pv::Column::ExpiresAt,
                pv::Column::Attempts,
                pv::Column::Verified,
                pv::Column::CreatedAt,
            ])
            .action_and_where(Expr::col((pv::Entity, pv::Column::CreatedAt)).lte(not_after))
            .to_owned();

        let rows = pv::Entity::insert(model)
            .on_conflict(on_conflict)
            .exec_without_returning(&self.pool)
            .await?;
        Ok(rows > 0)
    }

    async fn consume_attempt(&self, phone: &str, issued_at: DateTime<Utc>) -> AppResult<bool> {
        let result = pv::Entity::update_many()
            .col_expr(
                pv::Column::Attempts,
                Expr::col(pv::Column::Attempts).sub(1),
            )
            .filter(pv::Column::Phone.eq(phone))
            .filter(pv::Column::CreatedAt.eq(issued_at))
            .filter(pv::Column::Verified.eq(false))
            .filter(pv::Column::Attempts.gt(0))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn discard(&self, phone: &str, issued_at: DateTime<Utc>) -> AppResult<()> {
        pv::Entity::delete_many()
            .filter(pv::Column::Phone.eq(phone))
            .filter(pv::Column::CreatedAt.eq(issued_at))
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_verified(
        &self,
        phone: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = pv::Entity::update_many()
            .col_expr(pv::Column::Verified, Expr::value(true))
            .filter(pv::Column::Phone.eq(phone))
            .filter(pv::Column::OtpCode.eq(code))
            .filter(pv::Column::Verified.eq(false))
            .filter(pv::Column::Attempts.gt(0))
            .filter(pv::Column::ExpiresAt.gt(now))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
