//! 目录文件位置

use std::path::PathBuf;

/// 目录文件名
pub const CATALOG_FILENAME: &str = "lora_catalog.json";

/// 环境变量, 直接指定目录文件路径
pub const CATALOG_PATH_ENV: &str = "COMFYUI_LORA_CATALOG";

/// 托管环境中优先使用的目录文件 (Colab + Google Drive)
pub const PREFERRED_CATALOG_PATH: &str = "/content/drive/MyDrive/ComfyUI_MyLoRAs/lora_catalog.json";

/// 目录位置配置
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// 放在 loras 目录下的文件名
    pub catalog_filename: String,
    /// 存在时优先使用的路径, 按顺序检查
    pub preferred_paths: Vec<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_filename: CATALOG_FILENAME.to_string(),
            preferred_paths: vec![PathBuf::from(PREFERRED_CATALOG_PATH)],
        }
    }
}

impl CatalogConfig {
    /// 解析目录文件路径
    ///
    /// `lora_dirs` 为宿主注册的 loras 目录列表.
    pub fn resolve(&self, lora_dirs: &[PathBuf]) -> PathBuf {
        self.resolve_with(std::env::var(CATALOG_PATH_ENV).ok(), lora_dirs)
    }

    fn resolve_with(&self, env_path: Option<String>, lora_dirs: &[PathBuf]) -> PathBuf {
        if let Some(path) = env_path.filter(|v| !v.trim().is_empty()) {
            return PathBuf::from(path.trim());
        }

        if let Some(path) = self.preferred_paths.iter().find(|p| p.is_file()) {
            return path.clone();
        }

        match lora_dirs.first() {
            Some(dir) => dir.join(&self.catalog_filename),
            None => std::env::current_dir()
                .unwrap_or_default()
                .join("models")
                .join("loras")
                .join(&self.catalog_filename),
        }
    }
}
