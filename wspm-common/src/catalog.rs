//! Option catalogs offered by the plan editing surface
//!
//! The record itself stores free strings; these lists are what the editor
//! presents as choices. Membership is advisory only.

/// Support-service categories a client may be receiving
pub const SERVICE_TYPES: [&str; 8] = [
    "居宅介護",
    "重度訪問介護",
    "同行援護",
    "行動援護",
    "療養介護",
    "生活介護",
    "就労継続支援",
    "就労移行支援",
];

pub const GENDERS: [&str; 3] = ["男性", "女性", "その他"];

pub const DISABILITY_TYPES: [&str; 5] = ["身体障害", "知的障害", "精神障害", "発達障害", "その他"];

pub const SUPPORT_LEVELS: [&str; 6] = ["区分1", "区分2", "区分3", "区分4", "区分5", "区分6"];

pub const EDUCATION_LEVELS: [&str; 3] = ["高卒", "大卒", "特別支援卒"];

/// Check whether a label belongs to the service-type catalog
pub fn is_known_service_type(label: &str) -> bool {
    SERVICE_TYPES.contains(&label)
}
