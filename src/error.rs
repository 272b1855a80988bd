//! 错误类型定义
//!
//! 错误分为两个传播层级：
//!
//! - [`FatalError`]：致命错误，中止所在阶段，直接进入收尾（导出 + 退出登录）
//! - [`RecordError`]：单条记录错误，记录日志后跳过，批次继续
//!
//! 各组件的具体错误（配置 / 会话 / 认证 / 下载 / 数据格式 / 表单 / 导出）
//! 按领域拆分为独立枚举，由上层按层级包装。

use std::time::Duration;

use chromiumoxide::error::CdpError;
use thiserror::Error;

/// 配置错误
///
/// 在任何网络或页面操作之前检测，一旦出现整个运行立即中止。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 凭据环境变量缺失或为空
    #[error("凭据 {name} 缺失或为空")]
    MissingCredential { name: &'static str },

    /// 读取配置文件失败
    #[error("读取配置文件 {path} 失败: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 解析配置文件失败
    #[error("解析配置文件 {path} 失败: {source}")]
    FileParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 创建输出目录失败
    #[error("创建输出目录 {path} 失败: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 会话错误
///
/// 浏览器的启动、连接以及页面操作失败。
#[derive(Debug, Error)]
pub enum SessionError {
    /// 浏览器配置失败
    #[error("浏览器配置失败: {detail}")]
    Configuration { detail: String },

    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: CdpError,
    },

    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: CdpError,
    },

    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: CdpError,
    },

    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: CdpError,
    },

    /// 元素未找到
    #[error("元素未找到: {selector}")]
    ElementNotFound {
        selector: String,
        #[source]
        source: CdpError,
    },

    /// 元素交互失败
    #[error("元素 {selector} 交互失败: {source}")]
    InputFailed {
        selector: String,
        #[source]
        source: CdpError,
    },

    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptFailed {
        #[source]
        source: CdpError,
    },

    /// 脚本结果反序列化失败
    #[error("脚本结果解析失败: {source}")]
    ScriptResult {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 写入页面内容失败
    #[error("写入页面内容失败: {source}")]
    ContentFailed {
        #[source]
        source: CdpError,
    },

    /// 截图失败
    #[error("截图失败: {source}")]
    ScreenshotFailed {
        #[source]
        source: CdpError,
    },

    /// PDF 导出失败
    #[error("PDF 导出失败: {source}")]
    PdfFailed {
        #[source]
        source: CdpError,
    },

    /// 页面操作超时
    #[error("页面操作超时 ({op}, 限时 {timeout:?})")]
    Timeout { op: &'static str, timeout: Duration },
}

/// 认证错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 登录表单操作失败
    #[error("登录表单操作失败: {source}")]
    Form {
        #[source]
        source: SessionError,
    },

    /// 登录后未检测到已认证状态
    #[error("登录后未检测到已认证状态 (等待 {waited:?} 后仍未出现 {marker})")]
    NotAuthenticated { marker: String, waited: Duration },

    /// 退出登录失败
    #[error("退出登录失败: {source}")]
    LogoutFailed {
        #[source]
        source: SessionError,
    },
}

/// 下载错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 重试预算耗尽
    #[error("下载 {url} 失败 (已尝试 {attempts} 次): {detail}")]
    Exhausted {
        url: String,
        attempts: u32,
        detail: String,
    },

    /// 写入目标文件失败
    #[error("写入下载文件 {path} 失败: {source}")]
    Destination {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 数据格式错误
#[derive(Debug, Error)]
pub enum SourceFormatError {
    /// 打开工作簿失败
    #[error("无法打开数据文件 {path}: {source}")]
    WorkbookOpen {
        path: String,
        #[source]
        source: calamine::XlsxError,
    },

    /// 工作簿中没有可用的工作表
    #[error("数据文件 {path} 中没有可用的工作表")]
    MissingWorksheet { path: String },

    /// 表头缺少必需字段
    #[error("表头缺少必需字段: {field}")]
    MissingHeader { field: &'static str },

    /// 数据文件没有表头行
    #[error("数据文件没有表头行")]
    EmptyTable,
}

/// 表单错误（单条记录层级）
#[derive(Debug, Error)]
pub enum FormError {
    /// 表单字段不存在
    #[error("表单字段 {field} 不存在")]
    FieldMissing { field: &'static str },

    /// 表单字段定位或填写失败
    #[error("表单字段 {field} 操作失败: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: SessionError,
    },

    /// 下拉框中找不到指定选项
    #[error("下拉框 {field} 中找不到选项: {value}")]
    OptionNotFound { field: &'static str, value: String },

    /// 表单提交失败
    #[error("表单提交失败: {source}")]
    Submit {
        #[source]
        source: SessionError,
    },
}

/// 导出错误
///
/// 在导出器内部记录日志后吞掉，不会向外传播。
#[derive(Debug, Error)]
pub enum ExportError {
    /// 截图失败
    #[error("截图失败: {source}")]
    Screenshot {
        #[source]
        source: SessionError,
    },

    /// 读取结果区域失败
    #[error("读取结果区域失败: {source}")]
    Region {
        #[source]
        source: SessionError,
    },

    /// 结果区域不存在
    #[error("结果区域未找到: {selector}")]
    RegionNotFound { selector: String },

    /// PDF 渲染失败
    #[error("PDF 渲染失败: {source}")]
    PdfRender {
        #[source]
        source: SessionError,
    },
}

/// 致命错误层级
///
/// 中止所在阶段；若初始化已成功，则直接进入收尾阶段。
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("会话错误: {0}")]
    Session(#[from] SessionError),

    #[error("认证错误: {0}")]
    Auth(#[from] AuthError),

    #[error("下载错误: {0}")]
    Fetch(#[from] FetchError),

    #[error("数据格式错误: {0}")]
    SourceFormat(#[from] SourceFormatError),
}

/// 单条记录错误层级
///
/// 由批处理器捕获：记录日志后跳过该条记录，批次继续。
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("表单提交错误: {0}")]
    Form(#[from] FormError),
}

/// 应用程序结果类型
pub type Result<T, E = FatalError> = std::result::Result<T, E>;
