use crate::{
    extractor::{AuthorizedUser, JsonBody, PathParam},
    model::booking::{
        BookingCreatedResponse, BookingResponse, BookingsResponse, CreateBookingRequest,
        FinalizeBookingRequest, QuoteResponse, SettlementResponse,
    },
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{Local, NaiveDate};
use garde::Validate;
use kernel::{
    model::{
        booking::{
            event::{CreateBooking, FinalizeBooking, ReturnKind},
            BookedInterval, Booking,
        },
        id::{BookingId, ProductId},
    },
    pricing,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

// 過去日判定・返却日の基準はサーバーのローカル日付
fn today() -> NaiveDate {
    Local::now().date_naive()
}

// 料金の見積もり。予約は登録しない
pub async fn quote_booking(
    _user: AuthorizedUser,
    PathParam(product_id): PathParam<ProductId>,
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<CreateBookingRequest>,
) -> AppResult<Json<QuoteResponse>> {
    req.validate(&())?;

    let product = registry
        .product_repository()
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("product ({product_id}) not found")))?;
    let open_bookings: Vec<BookedInterval> = registry
        .booking_repository()
        .find_open_by_product_id(product_id)
        .await?
        .iter()
        .map(Booking::interval)
        .collect();

    let decision = pricing::evaluate_booking_request(
        &registry.pricing_policy(),
        &product,
        &req.into(),
        &open_bookings,
        today(),
    );
    Ok(Json(decision.into()))
}

#[tracing::instrument(skip(user, registry, req), fields(principal = %user.id()))]
pub async fn create_booking(
    user: AuthorizedUser,
    PathParam(product_id): PathParam<ProductId>,
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingCreatedResponse>)> {
    req.validate(&())?;

    let create_booking = CreateBooking::new(product_id, user.principal(), req.into(), today());
    let receipt = registry
        .booking_repository()
        .create(create_booking)
        .await?;

    Ok((StatusCode::CREATED, Json(receipt.into())))
}

pub async fn show_product_booking_history(
    user: AuthorizedUser,
    PathParam(product_id): PathParam<ProductId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    user.require_catalog_manager()?;

    registry
        .booking_repository()
        .find_history_by_product_id(product_id)
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn show_open_bookings(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    user.require_catalog_manager()?;

    registry
        .booking_repository()
        .find_open_all()
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn show_booking(
    user: AuthorizedUser,
    PathParam(booking_id): PathParam<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    let booking = registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("booking ({booking_id}) not found")))?;

    // 借り手本人か agent 以上のみ参照できる
    if booking.renter.user_id != user.id() {
        user.require_catalog_manager()?;
    }

    Ok(Json(booking.into()))
}

#[tracing::instrument(skip(user, registry), fields(principal = %user.id()))]
pub async fn return_booking(
    user: AuthorizedUser,
    PathParam(booking_id): PathParam<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<SettlementResponse>> {
    let actual_return_date = today();
    let settlement = registry
        .booking_repository()
        .finalize(FinalizeBooking::new(
            booking_id,
            user.principal(),
            ReturnKind::SelfReturn,
            actual_return_date,
            None,
        ))
        .await?;

    Ok(Json(SettlementResponse::new(
        booking_id,
        actual_return_date,
        settlement,
    )))
}

#[tracing::instrument(skip(user, registry, req), fields(principal = %user.id()))]
pub async fn finalize_booking(
    user: AuthorizedUser,
    PathParam(booking_id): PathParam<BookingId>,
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<FinalizeBookingRequest>,
) -> AppResult<Json<SettlementResponse>> {
    user.require_catalog_manager()?;
    req.validate(&())?;

    let actual_return_date = req.actual_return_date.unwrap_or_else(today);
    let settlement = registry
        .booking_repository()
        .finalize(FinalizeBooking::new(
            booking_id,
            user.principal(),
            ReturnKind::AgentFinalization,
            actual_return_date,
            req.manual_surcharge,
        ))
        .await?;

    Ok(Json(SettlementResponse::new(
        booking_id,
        actual_return_date,
        settlement,
    )))
}
