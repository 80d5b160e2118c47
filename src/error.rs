use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 平台 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 配置错误（账号表、配置文件）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 内容错误（无封面、无文本、无图片）
    #[error("内容错误: {0}")]
    Content(#[from] ContentError),
    /// 本地文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 平台 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（含超时、非 2xx）
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 平台返回错误码
    #[error("API返回错误响应 ({endpoint}): errcode={code:?}, errmsg={message:?}")]
    BadResponse {
        endpoint: String,
        code: Option<i64>,
        message: Option<String>,
    },
    /// 响应缺少必需字段
    #[error("API响应缺少字段 {field} ({endpoint})")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 构建 HTTP 客户端失败（代理地址非法等）
    #[error("HTTP客户端初始化失败: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 账号表缺少必需列
    #[error("账号表缺少以下列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    /// 账号表格式不受支持
    #[error("不支持的账号表格式: {0} (仅支持 .csv / .xlsx / .xls)")]
    UnsupportedSheet(String),
    /// 读取账号表失败
    #[error("读取账号表失败 ({path}): {message}")]
    SheetReadFailed { path: String, message: String },
    /// 存稿数量无法解析
    #[error("账号 '{account}' 的存稿数量 '{value}' 不是有效数字")]
    InvalidQuota { account: String, value: String },
    /// 内容类型无法识别
    #[error("账号 '{account}' 的内容类型 '{value}' 无法识别")]
    InvalidContentType { account: String, value: String },
    /// 存稿路径无效
    #[error("存稿路径无效: {0}")]
    InvalidPath(String),
    /// 代理地址无法组成合法 URL
    #[error("代理配置无效: {0}")]
    InvalidProxy(String),
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 内容错误
#[derive(Debug, Error)]
pub enum ContentError {
    /// 所有候选封面都无法上传
    #[error("没有可用的封面图 (尝试了 {attempted} 个候选)")]
    NoCover { attempted: usize },
    /// 图片文件夹中没有文本文件
    #[error("文件夹中没有 .txt 文本文件: {0}")]
    NoTextFile(String),
    /// 图片文件夹中没有图片
    #[error("文件夹中没有图片: {0}")]
    NoImages(String),
    /// 所有图片都上传失败
    #[error("全部 {attempted} 张图片上传失败")]
    AllUploadsFailed { attempted: usize },
    /// 图片引用无法解析为可下载的来源
    #[error("无法识别的图片引用: {0}")]
    UnresolvableImage(String),
}

/// 本地文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 移动（归档）失败
    #[error("移动文件失败 ({from} -> {to}): {source}")]
    MoveFailed {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },
    /// 文件已存在，拒绝覆盖
    #[error("文件已存在: {0}")]
    AlreadyExists(String),
    /// 统计文件格式错误
    #[error("统计文件格式错误 ({path}): {source}")]
    StatsCorrupted {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// CSV 写入失败
    #[error("CSV写入失败 ({path}): {source}")]
    CsvFailed {
        path: String,
        #[source]
        source: csv::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
