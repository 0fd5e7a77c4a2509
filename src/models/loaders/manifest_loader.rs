use crate::models::test::FULL_TEST_MODULES;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 上传清单：一次上传对应的试卷信息和模块文件
///
/// ```toml
/// title = "Practice Test 1"
/// description = "October set"
///
/// [[modules]]
/// file = "module1.xlsx"
///
/// [[modules]]
/// file = "module2.csv"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct UploadManifest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub modules: Vec<ManifestModule>,
    #[serde(skip)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestModule {
    pub file: PathBuf,
}

impl UploadManifest {
    /// 按清单顺序返回 (模块编号, 文件路径)，编号从 1 开始
    pub fn numbered_modules(&self) -> impl Iterator<Item = (u8, &Path)> + '_ {
        self.modules
            .iter()
            .enumerate()
            .map(|(idx, module)| ((idx + 1) as u8, module.file.as_path()))
    }
}

/// 从 TOML 文件加载上传清单
///
/// 相对路径以清单所在目录为基准
pub async fn load_manifest(manifest_path: &Path) -> Result<UploadManifest> {
    let content = fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("无法读取上传清单: {}", manifest_path.display()))?;

    let mut manifest: UploadManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析上传清单: {}", manifest_path.display()))?;

    if manifest.modules.is_empty() {
        anyhow::bail!("上传清单中没有模块: {}", manifest_path.display());
    }
    if manifest.modules.len() > FULL_TEST_MODULES {
        anyhow::bail!(
            "上传清单中有 {} 个模块，最多 {} 个: {}",
            manifest.modules.len(),
            FULL_TEST_MODULES,
            manifest_path.display()
        );
    }

    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));
    for module in manifest.modules.iter_mut() {
        if module.file.is_relative() {
            module.file = base_dir.join(&module.file);
        }
    }

    manifest.file_path = Some(manifest_path.to_string_lossy().to_string());

    tracing::info!(
        "成功加载上传清单 {}，共 {} 个模块",
        manifest_path.display(),
        manifest.modules.len()
    );

    Ok(manifest)
}
