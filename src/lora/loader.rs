//! LoRA 加载与应用
//!
//! 路径解析、权重读取、权重合并均由宿主提供, 见 [`LoraHost`].
//! 所有失败都退化为原样返回输入, 触发词为空.

use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use rand::Rng;

use crate::{
    catalog::LoraCatalog,
    error::Error,
    lora::{
        cache::LoraSlot,
        trigger::{catalog_triggers, VariationSelector},
    },
};

/// 宿主能力
pub trait LoraHost {
    /// 扩散模型句柄
    type Model;
    /// 文本编码器句柄
    type Clip;
    /// 反序列化后的 LoRA 权重
    type Weights;

    /// 按文件名解析 LoRA 完整路径
    fn resolve_path(&self, lora_name: &str) -> Result<Option<PathBuf>, Error>;

    /// 读取 LoRA 权重, 没有数据时返回 `None`
    fn load_weights(&self, path: &Path) -> Result<Option<Self::Weights>, Error>;

    /// 将权重合并到模型与文本编码器, 返回新的句柄
    fn apply(
        &self,
        model: &Self::Model,
        clip: &Self::Clip,
        weights: &Self::Weights,
        strength_model: f64,
        strength_clip: f64,
    ) -> Result<(Self::Model, Self::Clip), Error>;
}

/// 一次节点调用的参数
#[derive(Debug, Clone)]
pub struct LoraRequest {
    pub lora_name: String,
    pub variation: VariationSelector,
    pub strength_model: f64,
    pub strength_clip: f64,
}

impl LoraRequest {
    pub fn new(lora_name: &str, variation: &str, strength_model: f64, strength_clip: f64) -> Self {
        Self {
            lora_name: lora_name.to_string(),
            variation: VariationSelector::parse(variation),
            strength_model,
            strength_clip,
        }
    }

    /// 两个强度都为 0 时不做任何事
    pub fn is_noop(&self) -> bool {
        self.strength_model == 0.0 && self.strength_clip == 0.0
    }
}

/// 节点输出
#[derive(Debug)]
pub struct LoraOutput<M, C> {
    pub model: M,
    pub clip: C,
    pub triggers: String,
}

impl<M, C> LoraOutput<M, C> {
    fn passthrough(model: M, clip: C) -> Self {
        Self {
            model,
            clip,
            triggers: String::new(),
        }
    }
}

/// LoRA 加载器, 每个节点实例持有一个
#[derive(Debug)]
pub struct LoraApplier<W> {
    slot: LoraSlot<W>,
}

impl<W> Default for LoraApplier<W> {
    fn default() -> Self {
        Self {
            slot: LoraSlot::default(),
        }
    }
}

impl<W> LoraApplier<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前缓存的 LoRA 路径
    pub fn cached_path(&self) -> Option<&Path> {
        self.slot.path()
    }

    /// 加载并应用 LoRA, 同时生成触发词
    pub fn execute<H, R>(
        &mut self,
        host: &H,
        catalog: &LoraCatalog,
        rng: &mut R,
        request: &LoraRequest,
        model: H::Model,
        clip: H::Clip,
    ) -> LoraOutput<H::Model, H::Clip>
    where
        H: LoraHost<Weights = W>,
        R: Rng + ?Sized,
    {
        if request.is_noop() {
            debug!("both strengths are zero, skip '{}'", request.lora_name);
            return LoraOutput::passthrough(model, clip);
        }

        let path = match host.resolve_path(&request.lora_name) {
            Ok(Some(path)) => path,
            Ok(None) => {
                warn!("LoRA file not found, {}", request.lora_name);
                return LoraOutput::passthrough(model, clip);
            }
            Err(e) => {
                error!("resolve LoRA path failed, {}, {e}", request.lora_name);
                return LoraOutput::passthrough(model, clip);
            }
        };

        let weights = match self.slot.get_or_load(&path, |p| host.load_weights(p)) {
            Ok(Some(weights)) => weights,
            Ok(None) => {
                warn!("LoRA file has no data, {}", path.display());
                return LoraOutput::passthrough(model, clip);
            }
            Err(e) => {
                error!("load LoRA failed, {}, {e}", path.display());
                return LoraOutput::passthrough(model, clip);
            }
        };

        let (model_lora, clip_lora) = match host.apply(
            &model,
            &clip,
            weights,
            request.strength_model,
            request.strength_clip,
        ) {
            Ok(v) => v,
            Err(e) => {
                error!("apply LoRA failed, {}, {e}", request.lora_name);
                return LoraOutput::passthrough(model, clip);
            }
        };

        let triggers = catalog_triggers(catalog, &request.lora_name, &request.variation, rng);
        LoraOutput {
            model: model_lora,
            clip: clip_lora,
            triggers,
        }
    }
}
