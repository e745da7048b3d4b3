use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    booking::{
        event::{CreateBooking, FinalizeBooking, ReturnKind},
        BookedInterval, Booking, BookingReceipt, Settlement,
    },
    id::{BookingId, ProductId, UserId},
    product::{Product, ProductStatus},
};
use kernel::pricing::{self, PricingPolicy};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::{
        booking::{BookedIntervalRow, BookingRow},
        product::ProductRow,
    },
    ConnectionPool,
};

// 予約一覧系のクエリで共通の SELECT 句。商品と借り手を INNER JOIN する
const SELECT_BOOKINGS: &str = r#"
    SELECT
        b.booking_id,
        b.product_id,
        p.name AS product_name,
        p.daily_rate,
        b.user_id,
        u.user_name,
        b.start_date,
        b.planned_return_date,
        b.actual_return_date,
        b.total_price,
        b.final_price,
        b.manual_surcharge,
        b.finalized_by,
        b.booked_at
    FROM bookings AS b
    INNER JOIN products AS p ON b.product_id = p.product_id
    INNER JOIN users AS u ON b.user_id = u.user_id
"#;

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
    policy: PricingPolicy,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn create(&self, event: CreateBooking) -> AppResult<BookingReceipt> {
        let mut tx = self.db.begin().await?;

        // 事前のチェックとして、以下を調べる。
        // - 指定の商品 ID をもつ商品が存在するか
        // - 存在した場合、希望期間が貸出中の予約と重なっていないか
        //
        // 商品の行ロックにより、同じ商品への「貸出中予約の読み出し → 判定 → 登録」は
        // トランザクション単位で直列化される
        let quote = {
            let product = self.lock_product(&mut tx, event.product_id).await?;
            let open_bookings: Vec<BookedInterval> = sqlx::query_as::<_, BookedIntervalRow>(
                r#"
                    SELECT start_date, planned_return_date
                    FROM bookings
                    WHERE product_id = $1 AND actual_return_date IS NULL
                "#,
            )
            .bind(event.product_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?
            .into_iter()
            .map(BookedInterval::from)
            .collect();

            pricing::evaluate_booking_request(
                &self.policy,
                &product,
                &event.request,
                &open_bookings,
                event.today,
            )?
        };

        let booking_id = BookingId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO bookings
                (booking_id, product_id, user_id, start_date, planned_return_date, total_price)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(booking_id)
        .bind(event.product_id)
        .bind(event.requested_by.user_id)
        .bind(quote.start_date)
        .bind(quote.end_date)
        .bind(quote.total_price)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        sqlx::query("UPDATE products SET status = $2 WHERE product_id = $1 AND status = $3")
            .bind(event.product_id)
            .bind(ProductStatus::Rented.as_ref())
            .bind(ProductStatus::Available.as_ref())
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            %booking_id,
            product_id = %event.product_id,
            renter = %event.requested_by.user_id,
            total_price = %quote.total_price,
            "booking created"
        );
        Ok(BookingReceipt { booking_id, quote })
    }

    async fn finalize(&self, event: FinalizeBooking) -> AppResult<Settlement> {
        let mut tx = self.db.begin().await?;

        // 予約を行ロックする。同時に返却操作が来た場合、後続は確定済みの状態を読む
        let booking: Booking = sqlx::query_as::<_, BookingRow>(&format!(
            "{SELECT_BOOKINGS} WHERE b.booking_id = $1 FOR UPDATE OF b"
        ))
        .bind(event.booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Booking::from)
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("booking ({}) not found", event.booking_id))
        })?;

        let permitted = match event.kind {
            ReturnKind::SelfReturn => booking.renter.user_id == event.requested_by.user_id,
            ReturnKind::AgentFinalization => event.requested_by.can_manage_catalog(),
        };
        if !permitted {
            return Err(AppError::ForbiddenOperation);
        }

        let product = self
            .lock_product(&mut tx, booking.product.product_id)
            .await?;
        let settlement = pricing::finalize_booking(
            &self.policy,
            &booking,
            &product,
            event.actual_return_date,
            event.manual_surcharge,
        )?;

        let res = sqlx::query(
            r#"
                UPDATE bookings
                SET
                    actual_return_date = $2,
                    final_price = $3,
                    manual_surcharge = $4,
                    finalized_by = $5
                WHERE booking_id = $1
                  AND actual_return_date IS NULL
            "#,
        )
        .bind(event.booking_id)
        .bind(event.actual_return_date)
        .bind(settlement.final_price)
        .bind(event.manual_surcharge)
        .bind(event.requested_by.user_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been finalized".into(),
            ));
        }

        // 他に貸出中の予約が残っていなければ商品を貸出可能に戻す
        sqlx::query(
            r#"
                UPDATE products
                SET status = $2
                WHERE product_id = $1
                  AND status = $3
                  AND NOT EXISTS (
                    SELECT 1 FROM bookings
                    WHERE product_id = $1 AND actual_return_date IS NULL
                  )
            "#,
        )
        .bind(product.product_id)
        .bind(ProductStatus::Available.as_ref())
        .bind(ProductStatus::Rented.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            booking_id = %event.booking_id,
            finalized_by = %event.requested_by.user_id,
            final_price = %settlement.final_price,
            late = settlement.late,
            "booking finalized"
        );
        Ok(settlement)
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, BookingRow>(&format!("{SELECT_BOOKINGS} WHERE b.booking_id = $1"))
            .bind(booking_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map(|row| row.map(Booking::from))
            .map_err(AppError::SpecificOperationError)
    }

    async fn find_open_all(&self) -> AppResult<Vec<Booking>> {
        // 出力するレコードは、開始日の早い順に並べる
        sqlx::query_as::<_, BookingRow>(&format!(
            "{SELECT_BOOKINGS} WHERE b.actual_return_date IS NULL ORDER BY b.start_date ASC, b.booked_at ASC"
        ))
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Booking::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_open_by_product_id(&self, product_id: ProductId) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, BookingRow>(&format!(
            "{SELECT_BOOKINGS} WHERE b.product_id = $1 AND b.actual_return_date IS NULL ORDER BY b.start_date ASC"
        ))
        .bind(product_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Booking::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, BookingRow>(&format!(
            "{SELECT_BOOKINGS} WHERE b.user_id = $1 ORDER BY b.booked_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Booking::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_history_by_product_id(&self, product_id: ProductId) -> AppResult<Vec<Booking>> {
        // 貸出中の予約を先頭に、その後に返却済みを新しい順に並べる
        sqlx::query_as::<_, BookingRow>(&format!(
            r#"{SELECT_BOOKINGS}
            WHERE b.product_id = $1
            ORDER BY (b.actual_return_date IS NOT NULL) ASC, b.booked_at DESC"#
        ))
        .bind(product_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Booking::from).collect())
        .map_err(AppError::SpecificOperationError)
    }
}

impl BookingRepositoryImpl {
    // create, finalize で商品を行ロックして取得するために内部的に使うメソッド
    async fn lock_product(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: ProductId,
    ) -> AppResult<Product> {
        sqlx::query_as::<_, ProductRow>(
            r#"
                SELECT
                    product_id,
                    name,
                    description,
                    daily_rate,
                    status,
                    created_by,
                    created_at
                FROM products
                WHERE product_id = $1
                FOR UPDATE
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| AppError::EntityNotFound(format!("product ({product_id}) not found")))?
        .try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{product::ProductRepositoryImpl, user::UserRepositoryImpl};
    use chrono::{Days, Local};
    use kernel::model::{
        auth::Principal,
        booking::BookingRequest,
        product::event::CreateProduct,
        role::Role,
        user::event::CreateUser,
    };
    use kernel::repository::{product::ProductRepository, user::UserRepository};
    use rust_decimal::Decimal;

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_booking_lifecycle(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let users = UserRepositoryImpl::new(db.clone());
        let agent = users
            .create(CreateUser {
                user_name: "Agent".into(),
                email: "agent@example.com".into(),
            })
            .await?;
        let renter = users
            .create(CreateUser {
                user_name: "Renter".into(),
                email: "renter@example.com".into(),
            })
            .await?;
        let agent = Principal::new(agent.user_id, Role::Agent);
        let renter = Principal::new(renter.user_id, Role::Client);

        let products = ProductRepositoryImpl::new(db.clone());
        let product_id = products
            .create(CreateProduct {
                name: "Projector".into(),
                description: "Full HD projector".into(),
                daily_rate: Decimal::from(20),
                requested_by: agent,
            })
            .await?;

        let repo = BookingRepositoryImpl::new(db, PricingPolicy::default());
        let today = Local::now().date_naive();
        let day = |n: u64| today.checked_add_days(Days::new(n)).unwrap();
        let request = |start: u64, end: u64| BookingRequest {
            start_date: Some(day(start)),
            end_date: Some(day(end)),
        };

        let first = repo
            .create(CreateBooking::new(product_id, renter, request(1, 11), today))
            .await?;
        assert_eq!(first.quote.total_price, Decimal::new(17640, 2));
        assert_eq!(
            products.find_by_id(product_id).await?.unwrap().status,
            ProductStatus::Rented
        );

        // 境界日で接する予約は登録できる
        repo.create(CreateBooking::new(product_id, renter, request(11, 13), today))
            .await?;

        let overlap = repo
            .create(CreateBooking::new(product_id, renter, request(10, 12), today))
            .await;
        assert!(matches!(overlap, Err(AppError::ProductUnavailable(_))));

        assert_eq!(repo.find_open_by_product_id(product_id).await?.len(), 2);

        let settlement = repo
            .finalize(FinalizeBooking::new(
                first.booking_id,
                agent,
                ReturnKind::AgentFinalization,
                day(12),
                None,
            ))
            .await?;
        assert!(settlement.late);
        assert_eq!(settlement.final_price, Decimal::new(21168, 2));

        let again = repo
            .finalize(FinalizeBooking::new(
                first.booking_id,
                renter,
                ReturnKind::SelfReturn,
                day(12),
                None,
            ))
            .await;
        assert!(matches!(again, Err(AppError::AlreadyFinalized(_))));

        let history = repo.find_history_by_product_id(product_id).await?;
        assert_eq!(history.len(), 2);
        assert!(history[0].is_open());
        assert_eq!(repo.find_by_user_id(renter.user_id).await?.len(), 2);
        Ok(())
    }
}
