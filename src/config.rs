use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 上传清单（TOML）路径
    pub upload_manifest: String,
    /// 是否只在内存中演练，不写入远端存储
    pub dry_run: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 存储配置 ---
    pub store_base_url: String,
    pub store_api_key: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_manifest: "upload.toml".to_string(),
            dry_run: false,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            store_base_url: String::new(),
            store_api_key: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            upload_manifest: std::env::var("UPLOAD_MANIFEST").unwrap_or(default.upload_manifest),
            dry_run: std::env::var("DRY_RUN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dry_run),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            store_base_url: std::env::var("SUPABASE_URL").unwrap_or(default.store_base_url),
            store_api_key: std::env::var("SUPABASE_KEY").unwrap_or(default.store_api_key),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
        }
    }

    /// 检查远端存储所需的配置
    ///
    /// 演练模式下不需要存储凭据
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dry_run {
            return Ok(());
        }
        if self.store_base_url.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "SUPABASE_URL".to_string(),
            });
        }
        if self.store_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "SUPABASE_KEY".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::EnvVarParseFailed {
                var_name: "REQUEST_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
                expected_type: "正整数".to_string(),
            });
        }
        Ok(())
    }
}
