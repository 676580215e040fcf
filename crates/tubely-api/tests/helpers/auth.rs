use chrono::Duration;
use uuid::Uuid;

use super::TestApp;

/// Authenticated test user.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

/// Issue a one hour access token for a fresh user id.
pub fn test_user(app: &TestApp) -> TestUser {
    let user_id = Uuid::new_v4();
    let token = app
        .jwt
        .issue_token(user_id, Duration::hours(1))
        .expect("Failed to issue token");
    TestUser { user_id, token }
}
