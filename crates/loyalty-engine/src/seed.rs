//! 演示数据

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::error::{LoyaltyError, Result};
use crate::models::{Grade, NewMember, NewReward, NewSlot};
use crate::LoyaltyEngine;

pub const DEMO_MEMBER_ID: &str = "u-101";

const DEMO_REWARDS: [(&str, &str, i64, u32, u32); 6] = [
    ("r-1", "Logitech MX Master 3S", 120, 5, 1),
    ("r-2", "Keychron K2 Mechanical", 100, 8, 2),
    ("r-3", "Sony WH-1000XM5", 350, 2, 3),
    ("r-4", "24\" IPS Monitor", 180, 4, 4),
    ("r-5", "Office Ergonomic Chair", 250, 3, 5),
    ("r-6", "Shopping Voucher 500k", 25, 50, 6),
];

const DEMO_SLOTS: [(&str, &str, u32, u32); 4] = [
    ("s-1", "2024-06-20T09:00:00", 5, 2),
    ("s-2", "2024-06-20T13:00:00", 5, 5),
    ("s-3", "2024-06-21T09:00:00", 5, 1),
    ("s-4", "2024-06-21T15:00:00", 5, 0),
];

/// 载入演示会员、奖品与领取时段
pub fn load_demo_data(engine: &LoyaltyEngine) -> Result<()> {
    let expiry = NaiveDate::from_ymd_opt(2026, 12, 31)
        .ok_or_else(|| LoyaltyError::Internal("无效的演示日期".to_string()))?;

    engine.enroll(
        NewMember::new("Budi Santoso", "budi.santoso@techno.co.id", expiry)
            .with_id(DEMO_MEMBER_ID)
            .with_grade(Grade::Ruby)
            .with_opening_balance(145)
            .with_inactivity(1, 2),
    )?;

    for (id, name, cost, stock, image) in DEMO_REWARDS {
        engine.catalog().add_reward(
            NewReward::new(name, cost, stock)
                .with_id(id)
                .with_image(format!("https://picsum.photos/id/{image}/300/300")),
        )?;
    }

    for (id, datetime, quota, booked) in DEMO_SLOTS {
        let datetime = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M:%S")
            .map_err(|e| LoyaltyError::Internal(format!("无效的演示时段 {datetime}: {e}")))?;
        engine
            .slots()
            .add_slot(NewSlot::new(datetime, quota).with_id(id).with_booked(booked))?;
    }

    info!(
        rewards = DEMO_REWARDS.len(),
        slots = DEMO_SLOTS.len(),
        "演示数据已载入"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;

    #[test]
    fn test_demo_data() {
        let engine = LoyaltyEngine::default();
        load_demo_data(&engine).unwrap();

        let member = engine.member(DEMO_MEMBER_ID).unwrap();
        assert_eq!(member.tokens, 145);
        assert_eq!(member.grade, Grade::Ruby);
        assert_eq!(member.inactive_months_consecutive, 1);
        assert_eq!(member.inactive_months_cumulative, 2);
        assert!(member.is_consistent());
        assert_eq!(member.history[0].kind, EntryKind::Adjustment);

        assert_eq!(engine.catalog().list().len(), 6);
        assert_eq!(
            engine.catalog().get("r-4").unwrap().image,
            "https://picsum.photos/id/4/300/300"
        );
        assert_eq!(engine.slots().get("s-2").unwrap().booked, 5);
    }

    #[test]
    fn test_loading_twice_fails() {
        let engine = LoyaltyEngine::default();
        load_demo_data(&engine).unwrap();
        assert!(matches!(
            load_demo_data(&engine),
            Err(LoyaltyError::AlreadyExists { .. })
        ));
    }
}
