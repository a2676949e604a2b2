//! 并发兑换与账本串行化测试

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::NaiveDate;
use loyalty_engine::{
    LoyaltyEngine, LoyaltyError, NewMember, NewReward, NewSlot, ProgramContext, RedeemRequest,
    SystemPhase,
};

fn engine_with_members(count: usize, balance: i64) -> Arc<LoyaltyEngine> {
    let engine = LoyaltyEngine::new(ProgramContext::new(SystemPhase::Redeem));
    let expiry = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
    for i in 0..count {
        engine
            .enroll(
                NewMember::new(format!("Member {i}"), format!("m{i}@example.com"), expiry)
                    .with_id(format!("u-{i}"))
                    .with_opening_balance(balance),
            )
            .unwrap();
    }
    Arc::new(engine)
}

fn slot(engine: &LoyaltyEngine, id: &str, quota: u32) {
    let datetime = NaiveDate::from_ymd_opt(2024, 6, 20)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    engine
        .slots()
        .add_slot(NewSlot::new(datetime, quota).with_id(id))
        .unwrap();
}

/// 并发执行兑换，返回每个线程的结果
fn redeem_concurrently(
    engine: &Arc<LoyaltyEngine>,
    requests: Vec<RedeemRequest>,
) -> Vec<Result<i64, LoyaltyError>> {
    let barrier = Arc::new(Barrier::new(requests.len()));
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let engine = Arc::clone(engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine
                    .redemption()
                    .redeem(&request)
                    .map(|receipt| receipt.balance)
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_last_unit_of_stock_goes_to_exactly_one_member() {
    for _ in 0..20 {
        let engine = engine_with_members(2, 200);
        engine
            .catalog()
            .add_reward(NewReward::new("Sony WH-1000XM5", 150, 1).with_id("r-3"))
            .unwrap();
        slot(&engine, "s-1", 10);

        let results = redeem_concurrently(
            &engine,
            vec![
                RedeemRequest::new("u-0", "r-3", "s-1"),
                RedeemRequest::new("u-1", "r-3", "s-1"),
            ],
        );

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(LoyaltyError::OutOfStock(id)) if id == "r-3"))
        );

        assert_eq!(engine.catalog().get("r-3").unwrap().stock, 0);
        assert_eq!(engine.slots().get("s-1").unwrap().booked, 1);

        let total: i64 = engine.members().iter().map(|m| m.tokens).sum();
        assert_eq!(total, 250);
    }
}

#[test]
fn test_last_slot_seat_goes_to_exactly_one_member() {
    let engine = engine_with_members(8, 100);
    engine
        .catalog()
        .add_reward(NewReward::new("Shopping Voucher 500k", 25, 50).with_id("r-6"))
        .unwrap();
    slot(&engine, "s-1", 3);

    let requests = (0..8)
        .map(|i| RedeemRequest::new(format!("u-{i}"), "r-6", "s-1"))
        .collect();
    let results = redeem_concurrently(&engine, requests);

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(LoyaltyError::SlotFull(_))))
            .count(),
        5
    );
    assert_eq!(engine.slots().get("s-1").unwrap().booked, 3);
    assert_eq!(engine.catalog().get("r-6").unwrap().stock, 47);
}

#[test]
fn test_same_member_cannot_overspend() {
    let engine = engine_with_members(1, 100);
    engine
        .catalog()
        .add_reward(NewReward::new("Keychron K2 Mechanical", 60, 10).with_id("r-2"))
        .unwrap();
    slot(&engine, "s-1", 10);

    let requests = (0..6)
        .map(|_| RedeemRequest::new("u-0", "r-2", "s-1"))
        .collect();
    let results = redeem_concurrently(&engine, requests);

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let member = engine.member("u-0").unwrap();
    assert_eq!(member.tokens, 40);
    assert!(member.is_consistent());
}

#[test]
fn test_concurrent_credits_are_serialized() {
    let engine = engine_with_members(1, 0);
    let barrier = Arc::new(Barrier::new(10));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..50 {
                    engine.ledger().credit("u-0", 20, "Sprint Upload").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let member = engine.member("u-0").unwrap();
    assert_eq!(member.tokens, 10 * 50 * 20);
    assert_eq!(member.history.len(), 500);
    assert!(member.is_consistent());
}

#[test]
fn test_phase_switch_during_redemptions_never_corrupts_state() {
    let engine = engine_with_members(4, 500);
    engine
        .catalog()
        .add_reward(NewReward::new("Voucher", 25, 100).with_id("r-6"))
        .unwrap();
    slot(&engine, "s-1", 100);

    let barrier = Arc::new(Barrier::new(5));
    let mut handles = Vec::new();
    for i in 0..4 {
        let engine = Arc::clone(&engine);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let request = RedeemRequest::new(format!("u-{i}"), "r-6", "s-1");
            (0..10)
                .filter(|_| engine.redemption().redeem(&request).is_ok())
                .count()
        }));
    }

    let switcher = {
        let engine = Arc::clone(&engine);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            engine.phase().set_phase(SystemPhase::Fulfillment);
        })
    };

    let redeemed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    switcher.join().unwrap();

    let redeemed = u32::try_from(redeemed).unwrap();
    assert_eq!(engine.catalog().get("r-6").unwrap().stock, 100 - redeemed);
    assert_eq!(engine.slots().get("s-1").unwrap().booked, redeemed);
    for summary in engine.members() {
        assert!(engine.member(&summary.id).unwrap().is_consistent());
    }
}
