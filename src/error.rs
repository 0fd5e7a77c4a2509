use thiserror::Error;

/// 表格导入错误
///
/// 全部发生在任何写入之前，用户修正文件后重试即可
#[derive(Debug, Error)]
pub enum ImportError {
    /// 不支持的文件格式
    #[error("不支持的文件格式: {path}")]
    UnsupportedFormat { path: String },
    /// 工作簿无法打开或读取
    #[error("无法读取表格 ({path}): {message}")]
    Workbook { path: String, message: String },
    /// 工作簿中没有工作表
    #[error("表格中没有工作表: {path}")]
    NoSheets { path: String },
    /// 文件没有数据行
    #[error("文件 {file} 中没有数据行")]
    EmptyFile { file: String },
    /// 缺少题目标识列
    #[error(
        "文件 {file} 缺少必需的列 (question_id 或 reference_id)。检测到的列: [{}]",
        .headers.join(", ")
    )]
    MissingIdentifierHeader { file: String, headers: Vec<String> },
    /// 所有行都因缺少标识而被跳过
    #[error(
        "文件 {file} 中没有有效的题目 (跳过 {skipped} 行，缺少 question_id)。检测到的列: [{}]",
        .headers.join(", ")
    )]
    NoValidRows {
        file: String,
        headers: Vec<String>,
        skipped: usize,
    },
}

/// 存储调用错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 网络请求失败
    #[error("请求失败 ({collection}): {source}")]
    RequestFailed {
        collection: String,
        #[source]
        source: reqwest::Error,
    },
    /// 存储返回错误响应
    #[error("存储返回错误响应 ({collection}): status={status}, body={body}")]
    BadResponse {
        collection: String,
        status: u16,
        body: String,
    },
    /// 插入成功但响应中没有 id
    #[error("存储没有返回记录 id ({collection})")]
    MissingId { collection: String },
    /// 存储拒绝了记录
    #[error("存储拒绝了记录 ({collection}): {message}")]
    Rejected { collection: String, message: String },
    /// 记录序列化失败
    #[error("记录序列化失败 ({collection}): {source}")]
    Serialize {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 上传流程错误
///
/// 写入阶段的错误都带有从 1 开始的位置，方便用户定位
#[derive(Debug, Error)]
pub enum UploadError {
    /// 标题为空
    #[error("试卷标题不能为空")]
    EmptyTitle,
    /// 没有模块
    #[error("至少需要一个模块")]
    NoModules,
    /// 模块编号不在 1..=4
    #[error("模块编号 {number} 超出范围 [1, 4]")]
    InvalidModuleNumber { number: u8 },
    /// 模块编号重复
    #[error("模块编号 {number} 重复")]
    DuplicateModuleNumber { number: u8 },
    /// 题目插入失败
    #[error("第 {position}/{total} 道题目插入失败: {source}")]
    QuestionInsertFailed {
        position: usize,
        total: usize,
        #[source]
        source: StoreError,
    },
    /// 试卷记录插入失败，已写入的题目成为孤立记录
    #[error("试卷记录插入失败 (已写入 {} 道孤立题目): {source}", .orphaned_question_ids.len())]
    TestInsertFailed {
        orphaned_question_ids: Vec<String>,
        #[source]
        source: StoreError,
    },
    /// 关联记录插入失败
    #[error("第 {position}/{total} 条试卷题目关联插入失败 (试卷 {test_id}): {source}")]
    LinkInsertFailed {
        position: usize,
        total: usize,
        test_id: String,
        orphaned_question_ids: Vec<String>,
        #[source]
        source: StoreError,
    },
}

impl UploadError {
    /// 出错的阶段名称
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            UploadError::QuestionInsertFailed { .. } => Some("questions"),
            UploadError::TestInsertFailed { .. } => Some("test"),
            UploadError::LinkInsertFailed { .. } => Some("test_questions"),
            _ => None,
        }
    }

    /// 出错的位置（从 1 开始）
    pub fn position(&self) -> Option<usize> {
        match self {
            UploadError::QuestionInsertFailed { position, .. }
            | UploadError::LinkInsertFailed { position, .. } => Some(*position),
            UploadError::TestInsertFailed { .. } => Some(1),
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
}

// ========== 便捷构造函数 ==========

impl StoreError {
    /// 创建存储拒绝错误
    pub fn rejected(collection: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Rejected {
            collection: collection.into(),
            message: message.into(),
        }
    }
}

impl ImportError {
    /// 创建工作簿读取错误
    pub fn workbook(path: impl Into<String>, source: impl std::fmt::Display) -> Self {
        ImportError::Workbook {
            path: path.into(),
            message: source.to_string(),
        }
    }
}
