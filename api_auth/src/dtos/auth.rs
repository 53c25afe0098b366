use db::models::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
    pub state: Option<String>,
}

#[derive(Debug)]
pub struct OAuthUserData {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub provider_user_id: String,
}
