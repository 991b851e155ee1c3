//! 前端数据接口
//!
//! - `GET /lora_variations?lora_name=<name>`: 重新加载目录后返回变体选项
//! - `GET /lora_catalog`: 返回目录中的 LoRA 文件名

use log::{error, info};
use pyo3::{
    exceptions::PyRuntimeError,
    ffi::c_str,
    pyclass, pyfunction, pymethods,
    types::{PyAnyMethods, PyModule},
    Bound, PyAny, PyErr, PyResult, Python,
};
use serde::{Deserialize, Serialize};

use crate::{catalog::CatalogContext, core::PromptServer, error::Error};

/// 变体选项响应
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationsResponse {
    pub variations: Vec<String>,
}

/// 目录文件名响应
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogNamesResponse {
    pub loras: Vec<String>,
}

/// 重新加载目录并查询变体选项
pub fn variations_response(
    context: &CatalogContext,
    lora_name: &str,
) -> Result<VariationsResponse, Error> {
    context.reload()?;
    let catalog = context.read()?;
    Ok(VariationsResponse {
        variations: catalog.variation_options(lora_name),
    })
}

/// 查询目录文件名
pub fn names_response(context: &CatalogContext) -> Result<CatalogNamesResponse, Error> {
    let catalog = context.read()?;
    Ok(CatalogNamesResponse {
        loras: catalog.names(),
    })
}

/// 目录接口, 由路由处理函数调用
#[pyclass]
pub struct CatalogApi {
    context: CatalogContext,
}

impl CatalogApi {
    pub fn new(context: CatalogContext) -> Self {
        Self { context }
    }
}

#[pymethods]
impl CatalogApi {
    fn variations<'py>(&self, py: Python<'py>, lora_name: &str) -> PyResult<Bound<'py, PyAny>> {
        let results = variations_response(&self.context, lora_name)
            .and_then(|v| pythonize::pythonize(py, &v).map_err(Error::from));

        match results {
            Ok(v) => Ok(v),
            Err(e) => {
                error!("CatalogApi variations error, {e}");
                Err(PyErr::new::<PyRuntimeError, _>(e.to_string()))
            }
        }
    }

    fn names<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let results = names_response(&self.context)
            .and_then(|v| pythonize::pythonize(py, &v).map_err(Error::from));

        match results {
            Ok(v) => Ok(v),
            Err(e) => {
                error!("CatalogApi names error, {e}");
                Err(PyErr::new::<PyRuntimeError, _>(e.to_string()))
            }
        }
    }
}

/// 在 PromptServer 上注册路由
pub fn register_routes(py: Python<'_>, context: CatalogContext) -> Result<(), Error> {
    let routes = PromptServer::instance(py)?.routes()?;

    let module = PyModule::from_code(
        py,
        c_str!(include_str!("py/lora_routes.py")),
        c"lora_routes.py",
        c"lora_routes",
    )?;

    let api = Bound::new(py, CatalogApi::new(context))?;
    module.getattr("register")?.call1((routes, api))?;

    info!("registered routes /lora_variations, /lora_catalog");
    Ok(())
}

/// 查询 LoRA 的变体选项 (不重新加载目录)
#[pyfunction]
pub fn variation_options(lora_name: &str) -> PyResult<Vec<String>> {
    let context = CatalogContext::installed();
    let catalog = context
        .read()
        .map_err(|e| PyErr::new::<PyRuntimeError, _>(e.to_string()))?;
    Ok(catalog.variation_options(lora_name))
}

/// 目录中的 LoRA 文件名
#[pyfunction]
pub fn catalog_names() -> PyResult<Vec<String>> {
    names_response(&CatalogContext::installed())
        .map(|v| v.loras)
        .map_err(|e| PyErr::new::<PyRuntimeError, _>(e.to_string()))
}

/// 重新加载目录, 返回条目数量
#[pyfunction]
pub fn reload_catalog() -> PyResult<usize> {
    let context = CatalogContext::installed();
    let results = context.reload().and_then(|_| context.read().map(|v| v.len()));

    match results {
        Ok(v) => Ok(v),
        Err(e) => {
            error!("reload catalog failed, {e}");
            Err(PyErr::new::<PyRuntimeError, _>(e.to_string()))
        }
    }
}
