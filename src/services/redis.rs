//! Redis service for one-time password reset tokens

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

fn reset_key(token: &str) -> String {
    format!("password_reset:{}", token)
}

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }

    /// Store a reset token for a user with expiration (in seconds)
    pub async fn store_reset_token(&self, token: &str, user_id: i32, expiration_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(reset_key(token), user_id, expiration_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store reset token in Redis: {}", e)))?;

        Ok(())
    }

    /// Take a reset token: the user it was issued for, once.
    ///
    /// The read and the delete run as one MULTI transaction, so concurrent
    /// callers cannot both receive the user.
    pub async fn consume_reset_token(&self, token: &str) -> AppResult<Option<i32>> {
        let mut conn = self.connection().await?;
        let key = reset_key(token);

        let (user_id,): (Option<i32>,) = redis::pipe()
            .atomic()
            .get(&key)
            .del(&key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to take reset token from Redis: {}", e)))?;

        Ok(user_id)
    }
}
