use crate::model::{
    booking::{
        event::{CreateBooking, FinalizeBooking},
        Booking, BookingReceipt, Settlement,
    },
    id::{BookingId, ProductId, UserId},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[mockall::automock]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 商品を行ロックし、貸出中予約との重複判定と料金計算を経て予約を登録する
    async fn create(&self, event: CreateBooking) -> AppResult<BookingReceipt>;
    // 返却を確定する。確定済みの予約は AlreadyFinalized になる
    async fn finalize(&self, event: FinalizeBooking) -> AppResult<Settlement>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    // すべての貸出中の予約
    async fn find_open_all(&self) -> AppResult<Vec<Booking>>;
    // 商品に紐づく貸出中の予約
    async fn find_open_by_product_id(&self, product_id: ProductId) -> AppResult<Vec<Booking>>;
    // ユーザーの予約（返却済みを含む）
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>>;
    // 商品の予約履歴（返却済みを含む）
    async fn find_history_by_product_id(&self, product_id: ProductId) -> AppResult<Vec<Booking>>;
}
