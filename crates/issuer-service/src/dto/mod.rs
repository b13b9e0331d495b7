//! 数据传输对象
//!
//! - `request`: 请求体与查询参数（validator 校验）
//! - `response`: 统一响应包装与响应 DTO

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
