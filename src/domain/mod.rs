pub mod access;
pub mod plan;
pub mod plan_tool;
pub mod subscription;
pub mod usage;
pub mod user;

pub use access::*;
pub use plan::*;
pub use plan_tool::*;
pub use subscription::*;
pub use usage::*;
pub use user::*;
