use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::repository::{
    booking::BookingRepositoryImpl, health::HealthCheckRepositoryImpl,
    product::ProductRepositoryImpl, user::UserRepositoryImpl,
};
use kernel::pricing::PricingPolicy;
use kernel::repository::{
    booking::BookingRepository, health::HealthCheckRepository, product::ProductRepository,
    user::UserRepository,
};
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    product_repository: Arc<dyn ProductRepository>,
    user_repository: Arc<dyn UserRepository>,
    booking_repository: Arc<dyn BookingRepository>,
    pricing_policy: PricingPolicy,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, app_config: &AppConfig) -> Self {
        let pricing_policy = PricingPolicy::from(app_config.pricing);
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let product_repository = Arc::new(ProductRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let booking_repository = Arc::new(BookingRepositoryImpl::new(pool, pricing_policy));
        Self {
            health_check_repository,
            product_repository,
            user_repository,
            booking_repository,
            pricing_policy,
        }
    }

    // 任意の実装（テスト用のモックなど）を差し込んで組み立てる
    pub fn with_repositories(
        health_check_repository: Arc<dyn HealthCheckRepository>,
        product_repository: Arc<dyn ProductRepository>,
        user_repository: Arc<dyn UserRepository>,
        booking_repository: Arc<dyn BookingRepository>,
        pricing_policy: PricingPolicy,
    ) -> Self {
        Self {
            health_check_repository,
            product_repository,
            user_repository,
            booking_repository,
            pricing_policy,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn product_repository(&self) -> Arc<dyn ProductRepository> {
        self.product_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn booking_repository(&self) -> Arc<dyn BookingRepository> {
        self.booking_repository.clone()
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        self.pricing_policy
    }
}
