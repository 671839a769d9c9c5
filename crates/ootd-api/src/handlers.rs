//! Request handlers.

pub mod admin;
pub mod generate;
pub mod health;
pub mod images;
pub mod schema;
pub mod videos;

pub use admin::*;
pub use generate::*;
pub use health::*;
pub use images::*;
pub use schema::*;
pub use videos::*;
