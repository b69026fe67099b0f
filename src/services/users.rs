//! Authentication and account management service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use super::{
    accounts::sign_in,
    email::{Mailer, OutgoingEmail},
    redis::RedisService,
};
use crate::{
    config::{AuthConfig, LibraryConfig},
    directory::Directory,
    error::{AppError, AppResult},
    forms::{
        EditPasswordForm, EditProfileForm, ForgotPass, FormRules, LoginForm, RegistrationForm,
        ResetPasswordForm,
    },
    models::user::{NewUser, RoleEnum, User, UserClaims},
    repository::Repository,
};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against the stored hash; accounts without one never match
pub fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let Some(ref hash) = user.password_hash else {
        return Ok(false);
    };
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    library: LibraryConfig,
    directory: Arc<dyn Directory>,
    office_location: String,
    redis: RedisService,
    mailer: Arc<dyn Mailer>,
}

impl UsersService {
    pub fn new(
        repository: Repository,
        config: AuthConfig,
        library: LibraryConfig,
        directory: Arc<dyn Directory>,
        office_location: String,
        redis: RedisService,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            repository,
            config,
            library,
            directory,
            office_location,
            redis,
            mailer,
        }
    }

    fn rules(&self) -> FormRules {
        FormRules::from_config(&self.library)
    }

    pub async fn login(&self, form: LoginForm) -> AppResult<(String, User)> {
        form.validate_fields()?;
        self.authenticate(&form.email, &form.password).await
    }

    /// Authenticate by email and return a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = sign_in(
            &self.repository.users,
            self.directory.as_ref(),
            &self.office_location,
            email,
            password,
        )
        .await?;

        let token = self.create_token(&user)?;
        tracing::info!("User {} signed in", user.id);
        Ok((token, user))
    }

    /// Create JWT token for a user
    pub fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            roles: user.roles.clone(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create an active account with the `user` role
    pub async fn register(&self, form: RegistrationForm) -> AppResult<User> {
        form.validate_with(&self.repository, &self.rules()).await?;
        let new_user = NewUser {
            email: form.email.trim().to_string(),
            first_name: form.first_name.trim().to_string(),
            surname: form.surname.trim().to_string(),
            employee_id: None,
            password_hash: Some(hash_password(&form.password)?),
            active: true,
        };

        let user = self.repository.users.create(&new_user, RoleEnum::User).await?;
        tracing::info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Email a one-time reset token. Unknown addresses are ignored silently.
    pub async fn forgot_password(&self, form: ForgotPass) -> AppResult<()> {
        form.validate_fields()?;
        let Some(user) = self.repository.users.get_by_email(form.email.trim()).await? else {
            tracing::debug!("Password reset requested for unknown address");
            return Ok(());
        };

        let token = uuid::Uuid::new_v4().simple().to_string();
        let ttl_minutes = self.config.reset_token_ttl_minutes;
        self.redis
            .store_reset_token(&token, user.id, ttl_minutes * 60)
            .await?;

        self.mailer
            .send(OutgoingEmail {
                subject: "Password reset".to_string(),
                recipients: vec![user.email.clone()],
                text: Some(format!(
                    "Hello {},\n\nUse this token to set a new password: {}\n\nIt expires in {} minutes.",
                    user.first_name, token, ttl_minutes
                )),
                html: None,
            })
            .await
    }

    pub async fn reset_password(&self, form: ResetPasswordForm) -> AppResult<()> {
        form.validate_fields()?;
        let user_id = self
            .redis
            .consume_reset_token(form.token.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid or expired reset token".to_string()))?;

        let hash = hash_password(&form.new_password)?;
        self.repository.users.update_password(user_id, &hash).await?;
        tracing::info!("Password reset for user {}", user_id);
        Ok(())
    }

    pub async fn change_password(&self, user_id: i32, form: EditPasswordForm) -> AppResult<()> {
        form.validate_fields()?;
        let user = self.repository.users.get_by_id(user_id).await?;
        if !verify_password(&user, &form.password)? {
            return Err(AppError::Authentication("Current password is incorrect".to_string()));
        }

        let hash = hash_password(&form.new_password)?;
        self.repository.users.update_password(user_id, &hash).await
    }

    pub async fn update_profile(&self, user_id: i32, form: EditProfileForm) -> AppResult<User> {
        form.validate_with(&self.repository, &self.rules(), user_id).await?;
        self.repository
            .users
            .update_profile(
                user_id,
                form.first_name.trim(),
                form.surname.trim(),
                form.email.trim(),
            )
            .await
    }
}
