//! 登录认证 - 业务能力层
//!
//! 只负责"登录"和"退出登录"能力。登录提交后显式校验认证状态：
//! 轮询等待销售表单的第一个输入框出现，超过等待上限视为登录失败。

use std::time::Duration;

use tracing::info;

use crate::config::Credentials;
use crate::error::AuthError;
use crate::infrastructure::Session;

/// 登录表单选择器
const USERNAME_INPUT: &str = "#username";
const PASSWORD_INPUT: &str = "#password";
const LOGIN_BUTTON: &str = "button[type='submit']";
/// 登录成功标志：销售表单的第一个输入框
const POST_LOGIN_MARKER: &str = "#firstname";
/// 退出登录按钮
const LOGOUT_BUTTON: &str = "#logout";

/// 认证服务
pub struct AuthService {
    credentials: Credentials,
    login_wait: Duration,
}

impl AuthService {
    pub fn new(credentials: Credentials, login_wait: Duration) -> Self {
        Self {
            credentials,
            login_wait,
        }
    }

    /// 登录并显式校验认证状态
    pub async fn login(&self, session: &Session) -> Result<(), AuthError> {
        info!("🔐 正在登录: {}", self.credentials.username);

        session
            .fill(USERNAME_INPUT, &self.credentials.username)
            .await
            .map_err(|source| AuthError::Form { source })?;
        session
            .fill(PASSWORD_INPUT, &self.credentials.password)
            .await
            .map_err(|source| AuthError::Form { source })?;
        session
            .click(LOGIN_BUTTON)
            .await
            .map_err(|source| AuthError::Form { source })?;

        // 提交本身不报错不代表登录成功，等待销售表单出现才算数
        let authenticated = session
            .wait_for_element(POST_LOGIN_MARKER, self.login_wait)
            .await
            .map_err(|source| AuthError::Form { source })?;

        if !authenticated {
            return Err(AuthError::NotAuthenticated {
                marker: POST_LOGIN_MARKER.to_string(),
                waited: self.login_wait,
            });
        }

        info!("✓ 登录成功");
        Ok(())
    }

    /// 退出登录
    pub async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        info!("🚪 正在退出登录...");
        session
            .click(LOGOUT_BUTTON)
            .await
            .map_err(|source| AuthError::LogoutFailed { source })?;
        info!("✓ 已退出登录");
        Ok(())
    }
}
