//! 触发词解析

use std::str::FromStr;

use log::warn;
use rand::{seq::IndexedRandom, Rng};
use strum_macros::EnumString;

use crate::catalog::{CatalogEntry, LoraCatalog};

/// 仅使用基础触发词
pub const BASE_ONLY: &str = "Base Only";
/// 随机选择一个变体
pub const RANDOM: &str = "Random";
/// LoRA 不在目录中
pub const NOT_IN_CATALOG: &str = "Not in Catalog";

/// 触发词分隔符
pub const TRIGGER_SEPARATOR: &str = ", ";

/// 变体选择
///
/// 只有 "Base Only" 与 "Random" 优先于同名的变体键.
/// "None", "N/A" 等其他标签按变体键查找, 找不到时同样只输出基础触发词.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
pub enum VariationSelector {
    #[strum(serialize = "Base Only")]
    BaseOnly,
    #[strum(serialize = "Random")]
    Random,
    #[strum(default)]
    Named(String),
}

impl VariationSelector {
    /// 解析前端选项
    pub fn parse(label: &str) -> Self {
        Self::from_str(label).unwrap_or_else(|_| Self::Named(label.to_string()))
    }
}

/// 拼接基础触发词与变体触发词, 空的一侧被忽略
pub fn join_triggers(base: &str, variation: &str) -> String {
    [base.trim(), variation.trim()]
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(TRIGGER_SEPARATOR)
}

/// 按变体选择生成条目的触发词
pub fn resolve_triggers<R>(entry: &CatalogEntry, selector: &VariationSelector, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let variation = match selector {
        VariationSelector::BaseOnly => None,
        VariationSelector::Random => {
            let values = entry.variations.values().collect::<Vec<_>>();
            values.choose(rng).copied()
        }
        VariationSelector::Named(name) => entry.variations.get(name),
    };

    match variation {
        Some(variation) => join_triggers(&entry.base, variation),
        None => entry.base.trim().to_string(),
    }
}

/// 按 LoRA 文件名查询目录并生成触发词
///
/// 目录中没有该 LoRA 时返回空字符串.
pub fn catalog_triggers<R>(
    catalog: &LoraCatalog,
    lora_name: &str,
    selector: &VariationSelector,
    rng: &mut R,
) -> String
where
    R: Rng + ?Sized,
{
    match catalog.lookup(lora_name) {
        Some(entry) => resolve_triggers(entry, selector, rng),
        None => {
            warn!(
                "no trigger word entry found for '{lora_name}' in {}",
                catalog.path().display()
            );
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn entry(base: &str, variations: &[(&str, &str)]) -> CatalogEntry {
        CatalogEntry {
            base: base.to_string(),
            variations: variations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<IndexMap<_, _>>(),
        }
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!(VariationSelector::parse("Base Only"), VariationSelector::BaseOnly);
        assert_eq!(VariationSelector::parse("Random"), VariationSelector::Random);
        assert_eq!(
            VariationSelector::parse("None"),
            VariationSelector::Named("None".to_string())
        );
        assert_eq!(
            VariationSelector::parse("night"),
            VariationSelector::Named("night".to_string())
        );
    }

    #[test]
    fn test_join_triggers() {
        assert_eq!(join_triggers("base", "var"), "base, var");
        assert_eq!(join_triggers("", "var"), "var");
        assert_eq!(join_triggers("base", ""), "base");
        assert_eq!(join_triggers("  ", " var "), "var");
        assert_eq!(join_triggers("", ""), "");
    }

    #[test]
    fn test_base_only_is_trimmed_base() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let entry = entry("  masterpiece, style a \n", &[("night", "night city")]);
        let triggers = resolve_triggers(&entry, &VariationSelector::BaseOnly, &mut rng);
        assert_eq!(triggers, "masterpiece, style a");
    }

    #[test]
    fn test_named_variation() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let entry = entry("style a", &[("night", "night city"), ("day", "sunny")]);

        let selector = VariationSelector::parse("day");
        assert_eq!(resolve_triggers(&entry, &selector, &mut rng), "style a, sunny");
    }

    #[test]
    fn test_named_variation_with_empty_base() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let entry = entry("", &[("night", "night city")]);

        let selector = VariationSelector::parse("night");
        assert_eq!(resolve_triggers(&entry, &selector, &mut rng), "night city");
    }

    #[test]
    fn test_empty_variation_text() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let entry = entry("style a", &[("blank", "   ")]);

        let selector = VariationSelector::parse("blank");
        assert_eq!(resolve_triggers(&entry, &selector, &mut rng), "style a");
    }

    #[test]
    fn test_unknown_variation_falls_back_to_base() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let entry = entry("style a", &[("night", "night city")]);

        let selector = VariationSelector::parse("Variation 9");
        assert_eq!(resolve_triggers(&entry, &selector, &mut rng), "style a");
    }

    #[test]
    fn test_random_without_variations_is_base() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let entry = entry("style a", &[]);
        assert_eq!(
            resolve_triggers(&entry, &VariationSelector::Random, &mut rng),
            "style a"
        );
    }

    #[test]
    fn test_random_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let entry = entry("style a", &[("night", "night city"), ("day", "sunny"), ("rain", "rainy")]);
        let allowed = ["style a, night city", "style a, sunny", "style a, rainy"];

        let mut seen = std::collections::HashSet::new();
        for _ in 0..300 {
            let triggers = resolve_triggers(&entry, &VariationSelector::Random, &mut rng);
            assert!(allowed.contains(&triggers.as_str()), "unexpected {triggers}");
            seen.insert(triggers);
        }
        // 300 次抽样应覆盖所有变体
        assert_eq!(seen.len(), allowed.len());
    }

    #[test]
    fn test_sentinel_wins_over_colliding_key() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let entry = entry("style a", &[("Base Only", "shadowed")]);
        assert_eq!(
            resolve_triggers(&entry, &VariationSelector::parse("Base Only"), &mut rng),
            "style a"
        );
    }

    #[test]
    fn test_none_labels_without_key_are_base() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let entry = entry("style a", &[("night", "night city")]);
        for label in ["None", "No Variations", "Not in Catalog", "N/A"] {
            let selector = VariationSelector::parse(label);
            assert_eq!(resolve_triggers(&entry, &selector, &mut rng), "style a");
        }
    }

    #[test]
    fn test_variation_key_named_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let entry = entry("style a", &[("None", "bare head"), ("N/A", "plain")]);

        let selector = VariationSelector::parse("None");
        assert_eq!(resolve_triggers(&entry, &selector, &mut rng), "style a, bare head");

        let selector = VariationSelector::parse("N/A");
        assert_eq!(resolve_triggers(&entry, &selector, &mut rng), "style a, plain");
    }

    #[test]
    fn test_missing_entry_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let catalog = LoraCatalog::default();
        for label in ["Base Only", "Random", "night"] {
            let triggers = catalog_triggers(
                &catalog,
                "unknown.safetensors",
                &VariationSelector::parse(label),
                &mut rng,
            );
            assert_eq!(triggers, "");
        }
    }
}
