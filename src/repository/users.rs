//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{DirectoryIdentity, NewUser, RoleEnum, User, UserRow},
};

const USER_SELECT: &str = r#"
    SELECT u.id, u.email, u.first_name, u.surname, u.employee_id, u.password_hash,
           u.active, u.created_at,
           ARRAY_REMOVE(ARRAY_AGG(r.name::text), NULL) AS roles
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        let query = format!("{} WHERE u.id = $1 GROUP BY u.id", USER_SELECT);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let query = format!("{} WHERE LOWER(u.email) = LOWER($1) GROUP BY u.id", USER_SELECT);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// Get user by directory employee ID
    pub async fn get_by_employee_id(&self, employee_id: &str) -> AppResult<Option<User>> {
        let query = format!("{} WHERE u.employee_id = $1 GROUP BY u.id", USER_SELECT);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// Whether an account other than `exclude` uses this email
    pub async fn email_exists(&self, email: &str, exclude: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND ($2::int IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a user holding `role`
    pub async fn create(&self, user: &NewUser, role: RoleEnum) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, first_name, surname, employee_id, password_hash, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.surname)
        .bind(&user.employee_id)
        .bind(&user.password_hash)
        .bind(user.active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("User {} already exists", user.email))
            }
            other => AppError::Database(other),
        })?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) SELECT $1, id FROM roles WHERE name = $2",
        )
        .bind(id)
        .bind(role.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Copy directory identity fields onto an existing user
    pub async fn update_identity(&self, id: i32, identity: &DirectoryIdentity) -> AppResult<User> {
        sqlx::query(
            "UPDATE users SET email = $1, first_name = $2, surname = $3, employee_id = $4 WHERE id = $5",
        )
        .bind(&identity.email)
        .bind(&identity.first_name)
        .bind(&identity.surname)
        .bind(&identity.employee_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update user's own profile
    pub async fn update_profile(
        &self,
        id: i32,
        first_name: &str,
        surname: &str,
        email: &str,
    ) -> AppResult<User> {
        let result = sqlx::query("UPDATE users SET first_name = $1, surname = $2, email = $3 WHERE id = $4")
            .bind(first_name)
            .bind(surname)
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    pub async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Replace the `user` role with `admin`, in one transaction
    pub async fn grant_admin(&self, id: i32) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM user_roles WHERE user_id = $1 AND role_id = (SELECT id FROM roles WHERE name = $2)",
        )
        .bind(id)
        .bind(RoleEnum::User.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(RoleEnum::Admin.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }
}
