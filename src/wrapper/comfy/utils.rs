//! comfy.utils

use std::path::Path;

use pyo3::{
    types::{PyAnyMethods, PyDict, PyDictMethods},
    Bound, PyAny, Python,
};

use crate::error::Error;

/// 读取模型权重文件 (safetensors / ckpt ...)
///
/// `safe_load` 为 true 时禁止反序列化任意 Python 对象.
pub fn load_torch_file<'py>(
    py: Python<'py>,
    path: &Path,
    safe_load: bool,
) -> Result<Bound<'py, PyAny>, Error> {
    let utils = py.import("comfy.utils")?;

    let kwargs = PyDict::new(py);
    kwargs.set_item("safe_load", safe_load)?;

    let path = path.to_string_lossy().to_string();
    let state_dict = utils.call_method("load_torch_file", (path,), Some(&kwargs))?;
    Ok(state_dict)
}
