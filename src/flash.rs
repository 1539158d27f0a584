//! One-shot messages that survive a redirect.
//!
//! Messages are kept in the visitor's session until the next page that
//! displays them drains the queue.

use tower_sessions::Session;

use crate::errors::AppError;

const FLASH_KEY: &str = "flash_messages";

pub async fn push(session: &Session, message: impl Into<String>) -> Result<(), AppError> {
    let mut messages: Vec<String> = session.get(FLASH_KEY).await?.unwrap_or_default();
    messages.push(message.into());
    session.insert(FLASH_KEY, messages).await?;
    Ok(())
}

pub async fn drain(session: &Session) -> Result<Vec<String>, AppError> {
    Ok(session
        .remove::<Vec<String>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}
