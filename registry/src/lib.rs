use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::repository::{
    catalog::CatalogRepositoryImpl, health::HealthCheckRepositoryImpl,
    inventory::InventoryRepositoryImpl, ledger::LedgerRepositoryImpl,
    payment::PaymentRepositoryImpl, referral::ReferralRepositoryImpl, seed::SeedRepositoryImpl,
    session::SessionRepositoryImpl, user::UserRepositoryImpl,
};
use kernel::model::{payment::PaymentPolicy, referral::ReferralPolicy};
use kernel::repository::{
    catalog::CatalogRepository, health::HealthCheckRepository, inventory::InventoryRepository,
    ledger::LedgerRepository, payment::PaymentRepository, referral::ReferralRepository,
    seed::SeedRepository, session::SessionRepository, user::UserRepository,
};
use shared::config::AppConfig;

// すべてのリポジトリは同じコネクションプールを共有する
#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    catalog_repository: Arc<dyn CatalogRepository>,
    inventory_repository: Arc<dyn InventoryRepository>,
    ledger_repository: Arc<dyn LedgerRepository>,
    payment_repository: Arc<dyn PaymentRepository>,
    referral_repository: Arc<dyn ReferralRepository>,
    user_repository: Arc<dyn UserRepository>,
    session_repository: Arc<dyn SessionRepository>,
    seed_repository: Arc<dyn SeedRepository>,
    payment_policy: PaymentPolicy,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, app_config: &AppConfig) -> Self {
        let payment_policy = PaymentPolicy::from(app_config.payment);
        let referral_policy = ReferralPolicy::from(app_config.referral);

        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let catalog_repository = Arc::new(CatalogRepositoryImpl::new(pool.clone()));
        let inventory_repository = Arc::new(InventoryRepositoryImpl::new(pool.clone()));
        let ledger_repository = Arc::new(LedgerRepositoryImpl::new(pool.clone()));
        let payment_repository = Arc::new(PaymentRepositoryImpl::new(
            pool.clone(),
            payment_policy,
        ));
        let referral_repository = Arc::new(ReferralRepositoryImpl::new(
            pool.clone(),
            referral_policy,
        ));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let session_repository = Arc::new(SessionRepositoryImpl::new(pool.clone()));
        let seed_repository = Arc::new(SeedRepositoryImpl::new(pool));
        Self {
            health_check_repository,
            catalog_repository,
            inventory_repository,
            ledger_repository,
            payment_repository,
            referral_repository,
            user_repository,
            session_repository,
            seed_repository,
            payment_policy,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn catalog_repository(&self) -> Arc<dyn CatalogRepository> {
        self.catalog_repository.clone()
    }

    pub fn inventory_repository(&self) -> Arc<dyn InventoryRepository> {
        self.inventory_repository.clone()
    }

    pub fn ledger_repository(&self) -> Arc<dyn LedgerRepository> {
        self.ledger_repository.clone()
    }

    pub fn payment_repository(&self) -> Arc<dyn PaymentRepository> {
        self.payment_repository.clone()
    }

    pub fn referral_repository(&self) -> Arc<dyn ReferralRepository> {
        self.referral_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn session_repository(&self) -> Arc<dyn SessionRepository> {
        self.session_repository.clone()
    }

    pub fn seed_repository(&self) -> Arc<dyn SeedRepository> {
        self.seed_repository.clone()
    }

    pub fn payment_policy(&self) -> PaymentPolicy {
        self.payment_policy
    }
}
