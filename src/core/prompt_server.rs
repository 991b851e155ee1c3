//! Prompt Server

use pyo3::{
    types::{PyAnyMethods, PyModule},
    Bound, PyAny, PyResult, Python,
};

/// comfyui PromptServer wrapper
pub struct PromptServer<'py> {
    instance: Bound<'py, PyAny>,
}

impl<'py> PromptServer<'py> {
    /// 获取 PromptServer 实例
    ///
    /// 不在 ComfyUI 进程内 (或服务尚未创建) 时返回错误.
    pub fn instance(py: Python<'py>) -> PyResult<Self> {
        let instance = PyModule::import(py, "server")?
            .getattr("PromptServer")?
            .getattr("instance")?;
        Ok(Self { instance })
    }

    /// aiohttp RouteTableDef, 扩展加载完成后由 ComfyUI 挂载到应用
    pub fn routes(&self) -> PyResult<Bound<'py, PyAny>> {
        self.instance.getattr("routes")
    }
}
