//! LoRA Loader With Triggers
//!
//! 加载 LoRA 并输出目录中对应的触发词.
//! 目录文件见 [`crate::catalog`], 变体选项由前端通过 `/lora_variations` 刷新.

use std::path::{Path, PathBuf};

use log::error;
use pyo3::{
    pyclass, pymethods,
    types::{PyAnyMethods, PyDict, PyType},
    Bound, Py, PyAny, PyResult, Python,
};

use crate::{
    catalog::CatalogContext,
    core::{
        category::CATEGORY_LOADERS,
        types::{NODE_CLIP, NODE_FLOAT, NODE_MODEL, NODE_STRING},
    },
    error::Error,
    lora::{
        loader::{LoraApplier, LoraHost, LoraOutput, LoraRequest},
        trigger::BASE_ONLY,
    },
    wrapper::comfy::{
        folder_paths::{FolderPaths, FOLDER_LORAS},
        sd, utils,
    },
};

/// ComfyUI 宿主能力
pub struct ComfyHost<'py> {
    py: Python<'py>,
}

impl<'py> ComfyHost<'py> {
    pub fn new(py: Python<'py>) -> Self {
        Self { py }
    }
}

impl<'py> LoraHost for ComfyHost<'py> {
    type Model = Bound<'py, PyAny>;
    type Clip = Bound<'py, PyAny>;
    type Weights = Py<PyAny>;

    fn resolve_path(&self, lora_name: &str) -> Result<Option<PathBuf>, Error> {
        FolderPaths::new(self.py)?.get_full_path(FOLDER_LORAS, lora_name)
    }

    fn load_weights(&self, path: &Path) -> Result<Option<Py<PyAny>>, Error> {
        let lora = utils::load_torch_file(self.py, path, true)?;
        if lora.is_none() || lora.len()? == 0 {
            return Ok(None);
        }
        Ok(Some(lora.unbind()))
    }

    fn apply(
        &self,
        model: &Bound<'py, PyAny>,
        clip: &Bound<'py, PyAny>,
        weights: &Py<PyAny>,
        strength_model: f64,
        strength_clip: f64,
    ) -> Result<(Bound<'py, PyAny>, Bound<'py, PyAny>), Error> {
        sd::load_lora_for_models(
            self.py,
            model,
            clip,
            weights.bind(self.py),
            strength_model,
            strength_clip,
        )
    }
}

/// LoRA Loader With Triggers
#[pyclass(subclass)]
pub struct LoraLoaderWithTriggers {
    catalog: CatalogContext,
    applier: LoraApplier<Py<PyAny>>,
}

#[pymethods]
impl LoraLoaderWithTriggers {
    #[new]
    fn new() -> Self {
        Self {
            catalog: CatalogContext::installed(),
            applier: LoraApplier::new(),
        }
    }

    #[classattr]
    #[pyo3(name = "INPUT_IS_LIST")]
    fn input_is_list() -> bool {
        false
    }

    #[classattr]
    #[pyo3(name = "RETURN_TYPES")]
    fn return_types() -> (&'static str, &'static str, &'static str) {
        (NODE_MODEL, NODE_CLIP, NODE_STRING)
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str, &'static str, &'static str) {
        ("MODEL", "CLIP", "TRIGGERS")
    }

    #[classattr]
    #[pyo3(name = "OUTPUT_TOOLTIPS")]
    fn output_tooltips() -> (&'static str, &'static str, &'static str) {
        (
            "The modified diffusion model.",
            "The modified CLIP model.",
            "Trigger words of the LoRA from the catalog.",
        )
    }

    #[classattr]
    #[pyo3(name = "OUTPUT_IS_LIST")]
    fn output_is_list() -> (bool, bool, bool) {
        (false, false, false)
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_LOADERS;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Apply a LoRA to the diffusion and CLIP models, and output its trigger words from lora_catalog.json.
        Pick a variation to append its trigger words to the base ones, or Random to pick one at random."
    }

    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            let lora_list = Self::get_lora_list(py);
            let variation_list = Self::get_variation_list();

            let dict = PyDict::new(py);
            dict.set_item("required", {
                let required = PyDict::new(py);
                required.set_item(
                    "model",
                    (NODE_MODEL, {
                        let model = PyDict::new(py);
                        model.set_item("tooltip", "The diffusion model the LoRA will be applied to.")?;
                        model
                    }),
                )?;
                required.set_item(
                    "clip",
                    (NODE_CLIP, {
                        let clip = PyDict::new(py);
                        clip.set_item("tooltip", "The CLIP model the LoRA will be applied to.")?;
                        clip
                    }),
                )?;
                required.set_item(
                    "lora_name",
                    (lora_list, {
                        let lora_name = PyDict::new(py);
                        lora_name.set_item("tooltip", "The file name of the LoRA.")?;
                        lora_name
                    }),
                )?;
                required.set_item(
                    "variation",
                    (variation_list, {
                        let variation = PyDict::new(py);
                        variation.set_item("default", BASE_ONLY)?;
                        variation.set_item(
                            "tooltip",
                            "Trigger word variation from the catalog, refreshed when lora_name changes.",
                        )?;
                        variation
                    }),
                )?;
                required.set_item(
                    "strength_model",
                    (NODE_FLOAT, {
                        let strength_model = PyDict::new(py);
                        strength_model.set_item("default", 1.0)?;
                        strength_model.set_item("min", -10.0)?;
                        strength_model.set_item("max", 10.0)?;
                        strength_model.set_item("step", 0.01)?;
                        strength_model.set_item(
                            "tooltip",
                            "How strongly to modify the diffusion model. This value can be negative.",
                        )?;
                        strength_model
                    }),
                )?;
                required.set_item(
                    "strength_clip",
                    (NODE_FLOAT, {
                        let strength_clip = PyDict::new(py);
                        strength_clip.set_item("default", 1.0)?;
                        strength_clip.set_item("min", -10.0)?;
                        strength_clip.set_item("max", 10.0)?;
                        strength_clip.set_item("step", 0.01)?;
                        strength_clip.set_item(
                            "tooltip",
                            "How strongly to modify the CLIP model. This value can be negative.",
                        )?;
                        strength_clip
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    #[pyo3(name = "execute")]
    #[allow(clippy::too_many_arguments)]
    fn execute<'py>(
        &mut self,
        py: Python<'py>,
        model: Bound<'py, PyAny>,
        clip: Bound<'py, PyAny>,
        lora_name: &str,
        variation: &str,
        strength_model: f64,
        strength_clip: f64,
    ) -> PyResult<(Bound<'py, PyAny>, Bound<'py, PyAny>, String)> {
        let request = LoraRequest::new(lora_name, variation, strength_model, strength_clip);
        let output = self.load_lora(py, &request, model, clip);
        Ok((output.model, output.clip, output.triggers))
    }
}

impl LoraLoaderWithTriggers {
    /// 获取LoRA列表
    fn get_lora_list(py: Python<'_>) -> Vec<String> {
        match FolderPaths::new(py).and_then(|v| v.get_filename_list(FOLDER_LORAS)) {
            Ok(v) => v,
            Err(e) => {
                error!("get LoRA list failed, {e}");
                Vec::new()
            }
        }
    }

    /// 获取全部变体选项
    fn get_variation_list() -> Vec<String> {
        match CatalogContext::installed().read() {
            Ok(catalog) => catalog.all_variation_options(),
            Err(e) => {
                error!("read catalog failed, {e}");
                vec![BASE_ONLY.to_string()]
            }
        }
    }

    /// 加载LoRA
    ///
    /// 目录不可读时同样原样返回输入.
    fn load_lora<'py>(
        &mut self,
        py: Python<'py>,
        request: &LoraRequest,
        model: Bound<'py, PyAny>,
        clip: Bound<'py, PyAny>,
    ) -> LoraOutput<Bound<'py, PyAny>, Bound<'py, PyAny>> {
        let catalog = match self.catalog.read() {
            Ok(v) => v,
            Err(e) => {
                error!("LoraLoaderWithTriggers error, {e}");
                return LoraOutput {
                    model,
                    clip,
                    triggers: String::new(),
                };
            }
        };

        let host = ComfyHost::new(py);
        let mut rng = rand::rng();
        self.applier
            .execute(&host, &catalog, &mut rng, request, model, clip)
    }
}
