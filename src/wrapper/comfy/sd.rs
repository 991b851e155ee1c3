//! comfy.sd

use pyo3::{
    types::{PyAnyMethods, PyTuple, PyTupleMethods},
    Bound, PyAny, Python,
};

use crate::error::Error;

/// 将 LoRA 权重合并到模型与 CLIP
///
/// 返回 (model, clip), 输入句柄保持不变.
pub fn load_lora_for_models<'py>(
    py: Python<'py>,
    model: &Bound<'py, PyAny>,
    clip: &Bound<'py, PyAny>,
    lora: &Bound<'py, PyAny>,
    strength_model: f64,
    strength_clip: f64,
) -> Result<(Bound<'py, PyAny>, Bound<'py, PyAny>), Error> {
    let sd = py.import("comfy.sd")?;

    let args = (model, clip, lora, strength_model, strength_clip);
    let results = sd.call_method1("load_lora_for_models", args)?;
    let results = results.downcast_into::<PyTuple>().map_err(pyo3::PyErr::from)?;

    let model_lora = results.get_item(0)?;
    let clip_lora = results.get_item(1)?;
    Ok((model_lora, clip_lora))
}
