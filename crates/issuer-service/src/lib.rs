//! 徽章颁发服务
//!
//! 托管 Open Badges 颁发者、徽章类和徽章断言，并在获得者领取徽章时发送通知邮件。
//!
//! ## 模块结构
//!
//! - `models`: 领域模型（颁发者、徽章类、断言、Open Badge、获得者通知）
//! - `repository`: PostgreSQL 数据访问
//! - `service`: 业务逻辑（`@id` 修正、权限判断、通知发送）
//! - `notification`: 邮件模板与发送后端
//! - `handlers` / `routes`: HTTP 接口

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notification;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod utils;

pub use error::{IssuerError, Result};
pub use state::AppState;
