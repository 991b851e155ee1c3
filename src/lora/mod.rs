//! LoRA 加载与触发词

use pyo3::{
    types::{PyModule, PyModuleMethods},
    wrap_pyfunction, Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

pub mod api;
pub mod cache;
pub mod loader;
pub mod trigger;

mod node;
pub use node::{ComfyHost, LoraLoaderWithTriggers};

/// LoRA 触发词模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "lora_triggers")?;
    submodule.add_class::<LoraLoaderWithTriggers>()?;
    submodule.add_class::<api::CatalogApi>()?;
    submodule.add_function(wrap_pyfunction!(api::variation_options, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(api::catalog_names, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(api::reload_catalog, &submodule)?)?;
    Ok(submodule)
}

/// 节点注册
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![NodeRegister(
        "LoraLoaderWithTriggers",
        py.get_type::<LoraLoaderWithTriggers>(),
        "LoRA Loader With Triggers",
    )];
    Ok(nodes)
}
