//! 目录上下文
//!
//! 扩展初始化时创建一次, 克隆后交给节点与前端接口使用.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock, RwLock, RwLockReadGuard},
};

use log::warn;

use crate::{catalog::LoraCatalog, error::Error};

// 扩展初始化时安装的上下文, 节点由宿主无参构造时从这里取得
static INSTALLED_CONTEXT: OnceLock<CatalogContext> = OnceLock::new();

/// 目录上下文
#[derive(Debug, Clone)]
pub struct CatalogContext {
    path: PathBuf,
    catalog: Arc<RwLock<LoraCatalog>>,
}

impl CatalogContext {
    /// 读取目录文件并创建上下文
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let catalog = LoraCatalog::open(&path);
        Self {
            path,
            catalog: Arc::new(RwLock::new(catalog)),
        }
    }

    /// 目录文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 只读访问
    pub fn read(&self) -> Result<RwLockReadGuard<'_, LoraCatalog>, Error> {
        self.catalog
            .read()
            .map_err(|e| Error::LockError(e.to_string()))
    }

    /// 整体重新加载
    ///
    /// 新目录在锁外读取完成后再替换.
    pub fn reload(&self) -> Result<(), Error> {
        let catalog = LoraCatalog::open(&self.path);
        let mut guard = self
            .catalog
            .write()
            .map_err(|e| Error::LockError(e.to_string()))?;
        *guard = catalog;
        Ok(())
    }

    /// 安装为扩展的上下文, 只有第一次调用生效
    pub fn install(self) -> Self {
        INSTALLED_CONTEXT.get_or_init(|| self).clone()
    }

    /// 已安装的上下文
    ///
    /// 扩展未初始化时 (例如单独导入节点类), 使用默认 loras 目录下的目录文件.
    pub fn installed() -> Self {
        INSTALLED_CONTEXT
            .get_or_init(|| {
                let path = super::CatalogConfig::default().resolve(&[]);
                warn!(
                    "catalog context not installed, falling back to {}",
                    path.display()
                );
                Self::open(path)
            })
            .clone()
    }
}
