//! 请求 DTO 定义
//!
//! 暂无认证层，操作人以 `userId` 随请求传入，由服务层做成员权限校验

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// 操作人查询参数（DELETE 等无请求体的接口）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActingUserQuery {
    pub user_id: i64,
}

/// 创建颁发者请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssuerRequest {
    /// 操作人，记为创建人
    pub user_id: i64,
    #[validate(length(min = 1, max = 1024, message = "颁发者名称长度必须在1-1024个字符之间"))]
    pub name: String,
    /// 不传时由名称生成
    #[validate(length(min = 1, max = 255, message = "slug 长度必须在1-255个字符之间"))]
    pub slug: Option<String>,
    /// 不传时为操作人
    pub owner_id: Option<i64>,
    #[validate(length(max = 255, message = "图片路径不能超过255个字符"))]
    pub image: Option<String>,
    pub badge_object: Option<Value>,
}

/// 更新颁发者请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssuerRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 1024, message = "颁发者名称长度必须在1-1024个字符之间"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "slug 长度必须在1-255个字符之间"))]
    pub slug: Option<String>,
    #[validate(length(max = 255, message = "图片路径不能超过255个字符"))]
    pub image: Option<String>,
    pub badge_object: Option<Value>,
}

/// 添加成员请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: i64,
    pub member_id: i64,
}

/// 创建徽章类请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBadgeClassRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 255, message = "徽章类名称长度必须在1-255个字符之间"))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "slug 长度必须在1-255个字符之间"))]
    pub slug: Option<String>,
    /// URL 或文本，按内容写入 criteria_url 或 criteria_text
    #[validate(length(max = 65535, message = "获得条件过长"))]
    pub criteria: Option<String>,
    #[validate(length(max = 255, message = "图片路径不能超过255个字符"))]
    pub image: Option<String>,
    pub badge_object: Option<Value>,
}

/// 更新徽章类请求
///
/// `criteria` 传空串表示清空获得条件
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBadgeClassRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 255, message = "徽章类名称长度必须在1-255个字符之间"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "slug 长度必须在1-255个字符之间"))]
    pub slug: Option<String>,
    #[validate(length(max = 65535, message = "获得条件过长"))]
    pub criteria: Option<String>,
    #[validate(length(max = 255, message = "图片路径不能超过255个字符"))]
    pub image: Option<String>,
    pub badge_object: Option<Value>,
}

/// 颁发断言请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueAssertionRequest {
    pub user_id: i64,
    pub badge_object: Option<Value>,
}

/// 导入 Open Badge 请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportOpenBadgeRequest {
    #[validate(length(max = 254, message = "获得者标识不能超过254个字符"))]
    pub recipient_input: Option<String>,
    #[validate(length(max = 255, message = "图片路径不能超过255个字符"))]
    pub image: Option<String>,
    /// `{"assertion": {...}, "badgeclass": {...}, "issuer": {...}}`
    pub full_ld: Value,
}

/// 提交获得者通知请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    /// 断言 URL
    #[validate(
        url(message = "断言地址必须是合法 URL"),
        length(max = 2048, message = "断言地址不能超过2048个字符")
    )]
    pub url: String,
    #[validate(
        email(message = "邮箱格式不正确"),
        length(max = 254, message = "邮箱不能超过254个字符")
    )]
    pub email: String,
    /// 已导入的 Open Badge
    pub badge_id: i64,
}
