//! Built-in sample plan
//!
//! Used whenever no stored value exists for the requested identifier, and
//! when a plan is viewed without one. Values are sample data and are pinned
//! by tests; change them only together with the fixtures.

use super::{
    BasicInfo, CurrentSituation, Goals, Monitoring, PlanIdentity, PlanRecord, Services,
    SupportSystem, CURRENT_SCHEMA_VERSION,
};

/// Build the default plan record
pub fn default_template() -> PlanRecord {
    PlanRecord {
        schema_version: CURRENT_SCHEMA_VERSION,
        identity: PlanIdentity::default(),
        basic_info: BasicInfo {
            name: "田中太郎".to_string(),
            birth_date: "1985-03-15".to_string(),
            gender: "男性".to_string(),
            address: "東京都渋谷区○○町1-2-3".to_string(),
            phone: "03-1234-5678".to_string(),
            emergency_contact: "田中花子（母） 090-1234-5678".to_string(),
            disability_type: "身体障害".to_string(),
            support_level: "区分2".to_string(),
            education: "高卒".to_string(),
            medical_info: String::new(),
        },
        current_situation: CurrentSituation {
            living_situation: "一人暮らし（アパート）".to_string(),
            physical_condition: "車椅子を使用、上肢に軽度の麻痺あり".to_string(),
            mental_condition: "安定している".to_string(),
            social_participation: "地域のボランティア活動に参加".to_string(),
            family_situation: "両親は健在、定期的に連絡".to_string(),
        },
        goals: Goals {
            short_term: "6ヶ月以内に自立した生活を送る".to_string(),
            long_term: "1年後に就労を目指す".to_string(),
            achievement_indicators: "日常生活動作の自立度向上".to_string(),
        },
        services: Services {
            service_type: vec!["居宅介護".to_string()],
            frequency_map: Default::default(),
            duration_map: Default::default(),
            provider: "○○介護サービス".to_string(),
            start_date: "2024-02-01".to_string(),
        },
        support_system: SupportSystem {
            support_coordinator: "山田相談員".to_string(),
            service_providers: "○○介護サービス、△△医療センター".to_string(),
            related_institutions: "区役所福祉課、地域包括支援センター".to_string(),
            informal_support: "近隣住民、ボランティア".to_string(),
        },
        monitoring: Monitoring {
            frequency: "月1回".to_string(),
            evaluation_method: "面談、アンケート".to_string(),
            review_date: "2024-07-01".to_string(),
            emergency_response: "24時間対応可能".to_string(),
        },
        summary: String::new(),
        life_history: String::new(),
    }
}

/// Sample plan shown by the read-only view when nothing is stored
///
/// The editor template plus a filled identity header, medical notes, sample
/// free text and metrics for the selected service.
pub fn view_sample() -> PlanRecord {
    let mut record = default_template();
    record.identity = PlanIdentity {
        created_at: "2024-01-15".to_string(),
        creator: "山田相談員".to_string(),
        support_coordinator_name: "山田相談員".to_string(),
        contact: "03-1234-5678".to_string(),
    };
    record.basic_info.medical_info =
        "かかりつけ医：渋谷クリニック、通院：月1回、服薬：有".to_string();
    record
        .services
        .frequency_map
        .insert("居宅介護".to_string(), "3".to_string());
    record
        .services
        .duration_map
        .insert("居宅介護".to_string(), "2".to_string());
    record.summary = "支援経過や課題の例文がここに入ります。".to_string();
    record.life_history = "生活歴の例文がここに入ります。".to_string();
    record
}
