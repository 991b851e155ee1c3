pub mod catalog;
pub mod core;
pub mod error;
pub mod lora;
pub mod wrapper;

use log::warn;
use pyo3::{
    pymodule,
    types::{PyDict, PyDictMethods, PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::{
    catalog::{CatalogConfig, CatalogContext},
    core::node::NodeRegister,
    wrapper::comfy::folder_paths::{FolderPaths, FOLDER_LORAS},
};

/// A Python module implemented in Rust.
#[pymodule]
#[pyo3(name = "comfyui_lora_triggers")] // 需要与包名保持一致
fn py_init(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // 初始化日志
    // 每个扩展模块都有自己的全局变量，因此所使用的记录器也与其他 Rust 原生扩展无关。
    let _ = tracing_subscriber::fmt()
        .with_ansi(true)
        .with_max_level(tracing::Level::DEBUG)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .try_init();

    // 加载目录, 之后由节点与前端接口共享
    let context = init_catalog(py);

    // 添加子模块
    m.add_submodule(&lora::submodule(py)?)?;

    // 注册 ComfyUI NODE_CLASS_MAPPINGS/NODE_DISPLAY_NAME_MAPPINGS
    let node_mapping = PyDict::new(py);
    let name_mapping = PyDict::new(py);

    let nodes = node_register(py)?;
    for node in nodes {
        node_mapping.set_item(node.0, node.1)?;
        name_mapping.set_item(node.0, node.2)?;
    }

    const WEB_DIRECTORY: &str = "./web";

    m.add("NODE_CLASS_MAPPINGS", node_mapping)?;
    m.add("NODE_DISPLAY_NAME_MAPPINGS", name_mapping)?;
    m.add("WEB_DIRECTORY", WEB_DIRECTORY)?;

    // 前端接口
    if let Err(e) = lora::api::register_routes(py, context) {
        warn!("PromptServer unavailable, skip route registration, {e}");
    }
    Ok(())
}

/// 解析目录路径并安装目录上下文
fn init_catalog(py: Python<'_>) -> CatalogContext {
    let lora_dirs = match FolderPaths::new(py).and_then(|v| v.get_folder_paths(FOLDER_LORAS)) {
        Ok(v) => v,
        Err(e) => {
            warn!("get loras folder paths failed, {e}");
            Vec::new()
        }
    };

    let path = CatalogConfig::default().resolve(&lora_dirs);
    tracing::info!("LoRA catalog path: {}", path.display());
    CatalogContext::open(path).install()
}

/// 节点注册
fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let mut nodes: Vec<NodeRegister> = Vec::new();
    nodes.extend(lora::node_register(py)?);
    Ok(nodes)
}
