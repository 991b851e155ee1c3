//! 已加载 LoRA 的单槽缓存

use std::path::{Path, PathBuf};

/// 单槽缓存, 只保存最近一次加载的 LoRA 权重
#[derive(Debug)]
pub struct LoraSlot<W> {
    entry: Option<(PathBuf, W)>,
}

impl<W> Default for LoraSlot<W> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<W> LoraSlot<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 缓存的文件路径
    pub fn path(&self) -> Option<&Path> {
        self.entry.as_ref().map(|(path, _)| path.as_path())
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// 命中则返回缓存的权重, 否则清空槽位并调用 `load` 加载
    ///
    /// `load` 返回 `Ok(None)` 或错误时槽位保持为空.
    pub fn get_or_load<E, F>(&mut self, path: &Path, load: F) -> Result<Option<&W>, E>
    where
        F: FnOnce(&Path) -> Result<Option<W>, E>,
    {
        if self.path() != Some(path) {
            self.entry = None;
            if let Some(weights) = load(path)? {
                self.entry = Some((path.to_path_buf(), weights));
            }
        }

        Ok(self.entry.as_ref().map(|(_, weights)| weights))
    }
}
