//! Authentication service: password hashing, JWT, login, and user management.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::user::{CreateUser, User, UserRole};
use crate::repositories::{organization as org_repo, user as user_repo};

/// Maximum failed login attempts before account lockout.
const MAX_FAILED_ATTEMPTS: i32 = 3;

/// Lockout duration in minutes after exceeding max failed attempts.
const LOCKOUT_DURATION_MINUTES: i64 = 30;

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<Uuid>,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned on successful login.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Token lifetimes, taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct TokenTtl {
    pub access_secs: i64,
    pub refresh_secs: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn role_name(role: UserRole) -> String {
    serde_json::to_string(&role)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

/// Parse the role name stored in a token.
pub fn parse_role(name: &str) -> Result<UserRole, AppError> {
    serde_json::from_str(&format!("\"{name}\""))
        .map_err(|_| AppError::Internal(format!("Invalid role in token: {name}")))
}

/// Failure count and lock expiry to store after a wrong password.
///
/// An expired lock starts a fresh run of consecutive failures.
pub fn next_failed_login(user: &User, now: DateTime<Utc>) -> (i32, Option<DateTime<Utc>>) {
    let previous = match user.locked_until {
        Some(until) if until <= now => 0,
        _ => user.failed_login_attempts,
    };
    let attempts = previous.saturating_add(1);
    let lock_until =
        (attempts >= MAX_FAILED_ATTEMPTS).then(|| now + Duration::minutes(LOCKOUT_DURATION_MINUTES));
    (attempts, lock_until)
}

/// Generate a JWT token pair (access + refresh).
pub fn generate_tokens(user: &User, jwt_secret: &str, ttl: TokenTtl) -> Result<TokenPair, AppError> {
    let now = Utc::now();
    let encoding_key = EncodingKey::from_secret(jwt_secret.as_bytes());

    let claims_for = |token_type: &str, expiry_secs: i64| Claims {
        sub: user.username.clone(),
        user_id: user.id.to_string(),
        role: role_name(user.role),
        org_id: user.organization_id,
        token_type: token_type.to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    let access_token = jsonwebtoken::encode(
        &Header::default(),
        &claims_for(ACCESS_TOKEN, ttl.access_secs),
        &encoding_key,
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    let refresh_token = jsonwebtoken::encode(
        &Header::default(),
        &claims_for(REFRESH_TOKEN, ttl.refresh_secs),
        &encoding_key,
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: ttl.access_secs,
    })
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::default();

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

/// Check whether `actor` may create the requested account.
///
/// Platform admins create anyone. Org admins create non-admin users in their
/// own organization only. Platform admins never belong to an organization and
/// everyone else must.
pub fn check_user_creation(actor: &CurrentUser, input: &CreateUser) -> Result<(), AppError> {
    match (input.role, input.organization_id) {
        (UserRole::PlatformAdmin, Some(_)) => {
            return Err(AppError::Validation(
                "Platform admins cannot belong to an organization".to_string(),
            ))
        }
        (UserRole::PlatformAdmin, None) => {}
        (_, None) => {
            return Err(AppError::Validation(
                "organization_id is required for this role".to_string(),
            ))
        }
        (_, Some(_)) => {}
    }

    if actor.is_platform_admin() {
        return Ok(());
    }
    if actor.role != UserRole::OrgAdmin {
        return Err(AppError::Forbidden("Organization admin access required".to_string()));
    }
    if input.role == UserRole::PlatformAdmin {
        return Err(AppError::Forbidden(
            "Only platform admins can create platform admins".to_string(),
        ));
    }
    match input.organization_id {
        Some(org_id) => actor.ensure_tenant(org_id),
        None => Ok(()),
    }
}

/// Create a new user with hashed password.
pub async fn create_user(
    pool: &PgPool,
    actor: &CurrentUser,
    input: &CreateUser,
) -> Result<User, AppError> {
    input.validate()?;
    check_user_creation(actor, input)?;

    if let Some(org_id) = input.organization_id {
        if org_repo::find_by_id(pool, org_id).await?.is_none() {
            return Err(AppError::NotFound("Organization not found".to_string()));
        }
    }

    let password_hash = hash_password(&input.password)?;
    let user = user_repo::insert(pool, input, &password_hash)
        .await
        .map_err(|e| AppError::from_write(e, "Username or email already exists"))?;

    tracing::info!(user_id = %user.id, username = %user.username, role = ?user.role, "User created");
    Ok(user)
}

/// Authenticate a user by username and password, returning a token pair.
pub async fn login(
    pool: &PgPool,
    username: &str,
    password: &str,
    jwt_secret: &str,
    ttl: TokenTtl,
) -> Result<TokenPair, AppError> {
    let user = user_repo::find_by_username(pool, username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Check account lockout
    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            tracing::warn!(username = %username, "Login attempt on locked account");
            return Err(AppError::Unauthorized);
        }
    }

    if !user.is_active {
        return Err(AppError::Unauthorized);
    }

    if !verify_password(password, &user.password_hash)? {
        let (new_attempts, lock_until) = next_failed_login(&user, Utc::now());
        user_repo::record_failed_login(pool, user.id, new_attempts, lock_until).await?;
        if lock_until.is_some() {
            tracing::warn!(username = %username, attempts = new_attempts, "Account locked");
        }
        return Err(AppError::Unauthorized);
    }

    user_repo::record_successful_login(pool, user.id).await?;
    generate_tokens(&user, jwt_secret, ttl)
}

/// Refresh an access token using a valid refresh token.
pub async fn refresh_token(
    pool: &PgPool,
    refresh_token_str: &str,
    jwt_secret: &str,
    ttl: TokenTtl,
) -> Result<TokenPair, AppError> {
    let claims = validate_token(refresh_token_str, jwt_secret)?;

    if claims.token_type != REFRESH_TOKEN {
        return Err(AppError::Unauthorized);
    }

    let user_id: Uuid = claims
        .user_id
        .parse()
        .map_err(|_| AppError::Unauthorized)?;

    let user = user_repo::find_active_by_id(pool, user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    generate_tokens(&user, jwt_secret, ttl)
}

/// Find a user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    user_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: TokenTtl = TokenTtl {
        access_secs: 900,
        refresh_secs: 604800,
    };

    fn sample_user(role: UserRole, org: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            organization_id: org,
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            display_name: "Test".to_string(),
            role,
            is_active: true,
            failed_login_attempts: 0,
            locked_until: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn actor(role: UserRole, org: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "actor".to_string(),
            role,
            organization_id: org,
        }
    }

    fn new_user(role: UserRole, org: Option<Uuid>) -> CreateUser {
        CreateUser {
            username: "newbie".to_string(),
            email: "newbie@example.com".to_string(),
            password: "password123".to_string(),
            display_name: "New User".to_string(),
            role,
            organization_id: org,
        }
    }

    #[test]
    fn password_hash_and_verify() {
        let password = "SecurePassword123!";
        let hash = hash_password(password).unwrap();
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn token_generation_and_validation() {
        let org = Uuid::new_v4();
        let user = sample_user(UserRole::OrgAdmin, Some(org));

        let secret = "test-secret-key-for-jwt";
        let tokens = generate_tokens(&user, secret, TTL).unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 900);

        let claims = validate_token(&tokens.access_token, secret).unwrap();
        assert_eq!(claims.sub, "testuser");
        assert_eq!(claims.token_type, ACCESS_TOKEN);
        assert_eq!(claims.role, "OrgAdmin");
        assert_eq!(claims.org_id, Some(org));
        assert_eq!(parse_role(&claims.role).unwrap(), UserRole::OrgAdmin);

        let refresh_claims = validate_token(&tokens.refresh_token, secret).unwrap();
        assert_eq!(refresh_claims.token_type, REFRESH_TOKEN);
    }

    #[test]
    fn platform_admin_token_has_no_org() {
        let user = sample_user(UserRole::PlatformAdmin, None);
        let tokens = generate_tokens(&user, "s3cret", TTL).unwrap();
        let claims = validate_token(&tokens.access_token, "s3cret").unwrap();
        assert_eq!(claims.org_id, None);
    }

    #[test]
    fn invalid_token_rejected() {
        assert!(validate_token("garbage.token.here", "secret").is_err());
    }

    #[test]
    fn token_signed_with_other_secret_rejected() {
        let user = sample_user(UserRole::Member, Some(Uuid::new_v4()));
        let tokens = generate_tokens(&user, "secret-a", TTL).unwrap();
        assert!(validate_token(&tokens.access_token, "secret-b").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let user = sample_user(UserRole::Member, Some(Uuid::new_v4()));
        // Expired well beyond the 60s leeway window
        let expired = TokenTtl {
            access_secs: -3600,
            refresh_secs: -3600,
        };
        let tokens = generate_tokens(&user, "test-secret", expired).unwrap();
        assert!(validate_token(&tokens.access_token, "test-secret").is_err());
    }

    #[test]
    fn third_consecutive_failure_locks_account() {
        let now = Utc::now();
        let mut user = sample_user(UserRole::Member, Some(Uuid::new_v4()));
        assert_eq!(next_failed_login(&user, now), (1, None));

        user.failed_login_attempts = 2;
        let (attempts, lock_until) = next_failed_login(&user, now);
        assert_eq!(attempts, 3);
        assert_eq!(lock_until, Some(now + Duration::minutes(LOCKOUT_DURATION_MINUTES)));
    }

    #[test]
    fn expired_lock_restarts_failure_count() {
        let now = Utc::now();
        let mut user = sample_user(UserRole::Member, Some(Uuid::new_v4()));
        user.failed_login_attempts = 3;
        user.locked_until = Some(now - Duration::minutes(1));

        assert_eq!(next_failed_login(&user, now), (1, None));
    }

    #[test]
    fn unknown_role_name_rejected() {
        assert!(parse_role("Superuser").is_err());
    }

    #[test]
    fn org_admin_creates_members_in_own_org_only() {
        let org = Uuid::new_v4();
        let org_admin = actor(UserRole::OrgAdmin, Some(org));
        assert!(check_user_creation(&org_admin, &new_user(UserRole::Member, Some(org))).is_ok());
        assert!(matches!(
            check_user_creation(&org_admin, &new_user(UserRole::Member, Some(Uuid::new_v4()))),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_user_creation(&org_admin, &new_user(UserRole::PlatformAdmin, None)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn members_cannot_create_users() {
        let org = Uuid::new_v4();
        let member = actor(UserRole::Member, Some(org));
        assert!(check_user_creation(&member, &new_user(UserRole::Viewer, Some(org))).is_err());
    }

    #[test]
    fn tenant_membership_must_match_role() {
        let admin = actor(UserRole::PlatformAdmin, None);
        assert!(matches!(
            check_user_creation(&admin, &new_user(UserRole::Member, None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            check_user_creation(&admin, &new_user(UserRole::PlatformAdmin, Some(Uuid::new_v4()))),
            Err(AppError::Validation(_))
        ));
        assert!(check_user_creation(&admin, &new_user(UserRole::PlatformAdmin, None)).is_ok());
    }
}
