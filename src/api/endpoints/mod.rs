//! API endpoint handlers. Handlers stay thin and delegate to `chat`.

pub mod conversations;
pub mod health;
