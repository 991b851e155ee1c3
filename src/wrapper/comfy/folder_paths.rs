//! 文件夹路径
//!
//! ComfyUI folder_paths 模块包装, 路径配置以宿主为准.

use std::path::PathBuf;

use pyo3::{
    types::{PyAnyMethods, PyModule},
    Bound, Python,
};

use crate::error::Error;

/// LoRA 文件夹名称
pub const FOLDER_LORAS: &str = "loras";

/// folder_paths 包装
pub struct FolderPaths<'py> {
    module: Bound<'py, PyModule>,
}

impl<'py> FolderPaths<'py> {
    pub fn new(py: Python<'py>) -> Result<Self, Error> {
        let module = py.import("folder_paths")?;
        Ok(Self { module })
    }

    /// 获取完整文件路径, 文件不存在时返回 None
    pub fn get_full_path(&self, folder_name: &str, filename: &str) -> Result<Option<PathBuf>, Error> {
        let path = self
            .module
            .call_method1("get_full_path", (folder_name, filename))?
            .extract::<Option<PathBuf>>()?;
        Ok(path)
    }

    /// 获取文件名列表
    pub fn get_filename_list(&self, folder_name: &str) -> Result<Vec<String>, Error> {
        let files = self
            .module
            .call_method1("get_filename_list", (folder_name,))?
            .extract::<Vec<String>>()?;
        Ok(files)
    }

    /// 获取文件夹路径列表
    pub fn get_folder_paths(&self, folder_name: &str) -> Result<Vec<PathBuf>, Error> {
        let paths = self
            .module
            .call_method1("get_folder_paths", (folder_name,))?
            .extract::<Vec<PathBuf>>()?;
        Ok(paths)
    }
}
