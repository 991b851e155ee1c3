//! LoRA 触发词目录
//!
//! 目录文件格式:
//! ```json
//! {
//!     "my_style.safetensors": {
//!         "base": "mystyle",
//!         "variations": { "night": "night city, neon", "day": "sunny" }
//!     }
//! }
//! ```

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use indexmap::{IndexMap, IndexSet};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    lora::trigger::{BASE_ONLY, NOT_IN_CATALOG, RANDOM},
};

/// 目录条目
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 基础触发词
    #[serde(default)]
    pub base: String,
    /// 变体名称 -> 触发词
    #[serde(default)]
    pub variations: IndexMap<String, String>,
}

/// LoRA 目录
#[derive(Debug, Default, Clone)]
pub struct LoraCatalog {
    path: PathBuf,
    data: IndexMap<String, CatalogEntry>,
}

impl LoraCatalog {
    /// 创建目录, 尚未读取文件
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: IndexMap::new(),
        }
    }

    /// 创建目录并立即读取文件
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut catalog = Self::new(path);
        catalog.load();
        catalog
    }

    /// 目录文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取目录文件
    ///
    /// 任何失败都只记录日志, 目录置空.
    pub fn load(&mut self) {
        self.data = match Self::read_entries(&self.path) {
            Ok(data) => {
                info!(
                    "LoRA catalog loaded from {} ({} entries)",
                    self.path.display(),
                    data.len()
                );
                data
            }
            Err(Error::FileNotFound(path)) => {
                warn!("catalog file not found at '{path}', create it to enable trigger words");
                IndexMap::new()
            }
            Err(Error::SerdeJsonError(e)) => {
                error!("'{}' is not a valid catalog JSON file, {e}", self.path.display());
                IndexMap::new()
            }
            Err(e) => {
                error!("could not load LoRA catalog, {e}");
                IndexMap::new()
            }
        };
    }

    fn read_entries(path: &Path) -> Result<IndexMap<String, CatalogEntry>, Error> {
        let content = match fs::read_to_string(path) {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::FileNotFound(path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let data = serde_json::from_str(&content)?;
        Ok(data)
    }

    /// 按文件名查询条目
    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.data.get(name)
    }

    /// 目录中的 LoRA 文件名
    pub fn names(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 前端变体下拉选项
    pub fn variation_options(&self, name: &str) -> Vec<String> {
        let Some(entry) = self.lookup(name) else {
            return vec![NOT_IN_CATALOG.to_string()];
        };

        let mut options = vec![BASE_ONLY.to_string()];
        if !entry.variations.is_empty() {
            options.push(RANDOM.to_string());
            options.extend(entry.variations.keys().cloned());
        }
        options
    }

    /// 所有可能的变体选项
    ///
    /// 作为节点 variation 输入的候选列表, 保证前端切换后的值能通过输入校验.
    pub fn all_variation_options(&self) -> Vec<String> {
        let mut options: IndexSet<String> = IndexSet::new();
        options.insert(BASE_ONLY.to_string());
        options.insert(RANDOM.to_string());
        for entry in self.data.values() {
            options.extend(entry.variations.keys().cloned());
        }
        options.insert(NOT_IN_CATALOG.to_string());
        options.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const CATALOG: &str = r#"{
        "style_a.safetensors": {
            "base": "style a",
            "variations": { "night": "night city", "day": "sunny day" }
        },
        "char_b.safetensors": { "base": "char b" },
        "empty_base.safetensors": { "variations": { "pose": "standing" } }
    }"#;

    fn catalog_file(content: &str) -> anyhow::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_catalog() -> anyhow::Result<()> {
        let file = catalog_file(CATALOG)?;
        let catalog = LoraCatalog::open(file.path());

        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.names(),
            vec![
                "style_a.safetensors",
                "char_b.safetensors",
                "empty_base.safetensors"
            ]
        );

        let entry = catalog.lookup("char_b.safetensors").expect("entry");
        assert_eq!(entry.base, "char b");
        assert!(entry.variations.is_empty());

        let entry = catalog.lookup("empty_base.safetensors").expect("entry");
        assert_eq!(entry.base, "");
        Ok(())
    }

    #[test]
    fn test_lookup_is_exact() -> anyhow::Result<()> {
        let file = catalog_file(CATALOG)?;
        let catalog = LoraCatalog::open(file.path());

        assert!(catalog.lookup("style_a").is_none());
        assert!(catalog.lookup("STYLE_A.safetensors").is_none());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_empty() {
        let catalog = LoraCatalog::open("/nonexistent/dir/lora_catalog.json");
        assert!(catalog.is_empty());
        assert!(catalog.names().is_empty());
    }

    #[test]
    fn test_invalid_json_is_empty() -> anyhow::Result<()> {
        let file = catalog_file("{ \"a.safetensors\": { \"base\": ")?;
        let catalog = LoraCatalog::open(file.path());
        assert!(catalog.is_empty());

        // 结构不匹配同样视为解析失败
        let file = catalog_file(r#"{ "a.safetensors": { "base": 1 } }"#)?;
        let catalog = LoraCatalog::open(file.path());
        assert!(catalog.is_empty());
        Ok(())
    }

    #[test]
    fn test_reload_replaces_data() -> anyhow::Result<()> {
        let file = catalog_file(CATALOG)?;
        let mut catalog = LoraCatalog::open(file.path());
        assert_eq!(catalog.len(), 3);

        std::fs::write(file.path(), r#"{ "new.safetensors": { "base": "new" } }"#)?;
        catalog.load();

        assert_eq!(catalog.names(), vec!["new.safetensors"]);
        assert!(catalog.lookup("style_a.safetensors").is_none());
        Ok(())
    }

    #[test]
    fn test_variation_options() -> anyhow::Result<()> {
        let file = catalog_file(CATALOG)?;
        let catalog = LoraCatalog::open(file.path());

        assert_eq!(
            catalog.variation_options("style_a.safetensors"),
            vec!["Base Only", "Random", "night", "day"]
        );
        assert_eq!(
            catalog.variation_options("char_b.safetensors"),
            vec!["Base Only"]
        );
        assert_eq!(
            catalog.variation_options("unknown.safetensors"),
            vec!["Not in Catalog"]
        );
        Ok(())
    }

    #[test]
    fn test_all_variation_options() -> anyhow::Result<()> {
        let file = catalog_file(CATALOG)?;
        let catalog = LoraCatalog::open(file.path());

        assert_eq!(
            catalog.all_variation_options(),
            vec!["Base Only", "Random", "night", "day", "pose", "Not in Catalog"]
        );

        let empty = LoraCatalog::default();
        assert_eq!(
            empty.all_variation_options(),
            vec!["Base Only", "Random", "Not in Catalog"]
        );
        Ok(())
    }
}
