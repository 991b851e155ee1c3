// python 包装
pub mod comfy;
