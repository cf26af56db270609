//! Keyword-based category and tag inference.
//!
//! Best-effort enrichment: substring matches against product names, first
//! matching rule wins for categories, every matching rule contributes tags.

use std::collections::{BTreeMap, BTreeSet};

/// Category used when no label, keyword, or mall default applies.
pub const FALLBACK_CATEGORY: &str = "기타";

/// Ordered: gift sets are checked before their contents so that
/// `"한우 선물세트"` lands in 선물세트.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("선물세트", &["선물세트", "선물용", "기획세트", "명절세트"]),
    ("건강식품", &["홍삼", "인삼", "도라지청", "즙", "동충하초", "녹용", "진액", "효소"]),
    ("축산물", &["한우", "한돈", "돼지", "흑돼지", "소고기", "닭", "오리", "계란", "등심", "불고기"]),
    ("수산물", &["굴비", "전복", "멸치", "조미김", "김자반", "미역", "다시마", "새우", "고등어", "오징어", "꽃게", "젓갈"]),
    ("가공식품", &["김치", "된장", "고추장", "간장", "장아찌", "떡", "만두", "과자", "잼", "매실청", "분말"]),
    ("농산물", &["쌀", "현미", "잡곡", "사과", "배", "감귤", "딸기", "고구마", "감자", "더덕", "나물", "버섯", "대추"]),
];

/// Keyword → tag. Several keywords may map to the same tag.
const TAG_RULES: &[(&str, &str)] = &[
    ("한우", "한우"),
    ("한돈", "한돈"),
    ("흑돼지", "흑돼지"),
    ("김치", "김치"),
    ("묵은지", "김치"),
    ("유기농", "유기농"),
    ("무농약", "친환경"),
    ("친환경", "친환경"),
    ("국내산", "국내산"),
    ("국산", "국내산"),
    ("홍삼", "홍삼"),
    ("전통", "전통식품"),
    ("수제", "수제"),
    ("선물", "선물"),
    ("세트", "세트상품"),
    ("냉동", "냉동식품"),
    ("냉장", "냉장식품"),
    ("햅", "햇상품"),
    ("특산", "특산품"),
];

/// Returns the controlled category for a product.
///
/// An explicit site label wins (translated through `category_map` when an
/// entry exists); otherwise keyword rules apply to `name`; otherwise
/// `default_category`; otherwise [`FALLBACK_CATEGORY`].
#[must_use]
pub fn infer_category(
    name: &str,
    label: Option<&str>,
    category_map: &BTreeMap<String, String>,
    default_category: Option<&str>,
) -> String {
    if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
        return category_map
            .get(label)
            .cloned()
            .unwrap_or_else(|| label.to_owned());
    }

    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map(|(category, _)| (*category).to_owned())
        .or_else(|| default_category.map(str::to_owned))
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_owned())
}

/// Returns keyword tags for `name` unioned with the mall's own tags.
#[must_use]
pub fn infer_tags<'a>(name: &str, mall_tags: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    let mut tags: BTreeSet<String> = TAG_RULES
        .iter()
        .filter(|(keyword, _)| name.contains(keyword))
        .map(|(_, tag)| (*tag).to_owned())
        .collect();
    tags.extend(
        mall_tags
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned),
    );
    tags
}
