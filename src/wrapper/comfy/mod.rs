//! ComfyUI comfy 包与 folder_paths 模块包装

pub mod folder_paths;
pub mod sd;
pub mod utils;
