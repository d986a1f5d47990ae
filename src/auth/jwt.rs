use crate::entity::user::Role;
use crate::model::auth::{AuthUser, Claims};
use actix_web::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, errors::Error as JwtError, DecodingKey, EncodingKey, Header, Validation};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
const REFRESH_ROLE: &str = "refresh";

#[derive(Clone)]
pub struct JwtUtils {
    secret: String,
}

pub enum TokenVerifyResult {
    Valid(Claims),
    Expired,
    Invalid,
}

impl JwtUtils {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn generate_token(&self, user_id: i32, role: Role) -> Result<String, JwtError> {
        self.sign(user_id, role.as_str(), Duration::hours(1))
    }

    pub fn generate_refresh_token(&self, user_id: i32) -> Result<String, JwtError> {
        self.sign(user_id, REFRESH_ROLE, Duration::days(30))
    }

    fn sign(&self, user_id: i32, role: &str, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify_token(&self, token: &str) -> TokenVerifyResult {
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(data) => TokenVerifyResult::Valid(data.claims),
            Err(err) => match *err.kind() {
                ErrorKind::ExpiredSignature => TokenVerifyResult::Expired,
                _ => TokenVerifyResult::Invalid,
            },
        }
    }
}

impl Claims {
    pub fn is_refresh(&self) -> bool {
        self.role == REFRESH_ROLE
    }

    /// Access-token identity; refresh tokens and malformed subjects yield `None`.
    pub fn auth_user(&self) -> Option<AuthUser> {
        let user_id = self.sub.parse::<i32>().ok()?;
        let role = Role::parse(&self.role)?;
        Some(AuthUser { user_id, role })
    }
}

pub fn build_access_token_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(3))
        .finish()
}

pub fn build_refresh_token_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(REFRESH_TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(60))
        .finish()
}
