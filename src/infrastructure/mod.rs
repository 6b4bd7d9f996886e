pub mod config;
pub mod password;
pub mod postgres_metering_repo;
pub mod postgres_subscription_repo;
pub mod repository;
pub mod session;

pub use config::*;
pub use password::*;
pub use postgres_metering_repo::*;
pub use postgres_subscription_repo::*;
pub use repository::*;
pub use session::*;
