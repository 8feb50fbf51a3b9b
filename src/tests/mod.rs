mod admin_tests;
mod expense_tests;
mod group_tests;

use crate::auth::guard::Session;
use crate::auth::jwt::SessionCodec;
use crate::auth::password::PasswordHasher;
use crate::core::services::FreewiseService;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use std::time::Duration;

pub const TEST_SECRET: &[u8] = b"freewise-test-secret";

pub fn create_test_service() -> FreewiseService<InMemoryStorage> {
    let storage = InMemoryStorage::new();
    let codec = SessionCodec::new(TEST_SECRET, Duration::from_secs(7200));
    // Lowest cost bcrypt accepts keeps the suite fast.
    FreewiseService::new(storage, codec, PasswordHasher::new(4), "EUR".to_string())
}

/// Registers `username` and returns the session its login would carry.
pub async fn signed_in(service: &FreewiseService<InMemoryStorage>, username: &str) -> Session {
    service.register(username, "password123").await.unwrap();
    let outcome = service.login(username, "password123").await.unwrap();
    Session::resolve(service.codec(), Some(&outcome.session.token))
}

pub async fn signed_in_admin(service: &FreewiseService<InMemoryStorage>, username: &str) -> Session {
    service.ensure_admin(username, "admin-pass").await.unwrap();
    let outcome = service.login(username, "admin-pass").await.unwrap();
    Session::resolve(service.codec(), Some(&outcome.session.token))
}
