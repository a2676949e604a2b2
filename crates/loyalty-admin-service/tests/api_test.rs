//! 管理后台 REST API 测试
//!
//! 使用 `tower::ServiceExt::oneshot` 直接驱动路由，不启动 HTTP 服务器。

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use loyalty_admin_service::{AppState, app};
use loyalty_engine::seed::load_demo_data;
use loyalty_engine::{LoyaltyEngine, ProgramContext, SystemPhase};
use serde_json::{Value, json};
use tower::ServiceExt;

// ==================== 辅助函数 ====================

fn test_state(phase: SystemPhase) -> AppState {
    let engine = LoyaltyEngine::new(ProgramContext::new(phase));
    load_demo_data(&engine).unwrap();
    AppState::new(engine)
}

fn test_app(phase: SystemPhase) -> Router {
    app(test_state(phase))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn redeem_body(reward_id: &str, slot_id: &str) -> Value {
    json!({ "memberId": "u-101", "rewardId": reward_id, "slotId": slot_id })
}

// ==================== 阶段 ====================

#[tokio::test]
async fn test_get_phase() {
    let (status, body) = send(test_app(SystemPhase::Accumulation), get("/api/phase")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["phase"], "ACCUMULATION");
    assert_eq!(body["data"]["next"], "JUDGMENT");
    assert_eq!(body["data"]["redemptionOpen"], false);
    assert_eq!(
        body["data"]["description"],
        "Routine sprint activity upload. Redemption Locked."
    );
}

#[tokio::test]
async fn test_set_and_advance_phase() {
    let state = test_state(SystemPhase::Accumulation);

    let (status, body) = send(
        app(state.clone()),
        json_request("PUT", "/api/phase", json!({ "phase": "redeem" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["previous"], "ACCUMULATION");
    assert_eq!(body["data"]["current"]["phase"], "REDEEM");

    let (status, body) = send(
        app(state.clone()),
        Request::builder()
            .method("POST")
            .uri("/api/phase/advance")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["previous"], "REDEEM");
    assert_eq!(body["data"]["current"]["phase"], "FULFILLMENT");
    assert_eq!(state.engine.phase().current(), SystemPhase::Fulfillment);
}

#[tokio::test]
async fn test_set_unknown_phase() {
    let (status, body) = send(
        test_app(SystemPhase::Accumulation),
        json_request("PUT", "/api/phase", json!({ "phase": "HARVEST" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// ==================== 兑换 ====================

#[tokio::test]
async fn test_redeem_success() {
    let state = test_state(SystemPhase::Redeem);
    let (status, body) = send(
        app(state.clone()),
        json_request("POST", "/api/redemptions", redeem_body("r-1", "s-1")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["balance"], 25);
    assert_eq!(body["data"]["reward"]["stock"], 4);
    assert_eq!(body["data"]["slot"]["booked"], 3);
    assert_eq!(body["data"]["entry"]["change"], -120);
    assert_eq!(body["data"]["entry"]["kind"], "SPEND");
    assert_eq!(
        body["data"]["entry"]["description"],
        "Redeemed: Logitech MX Master 3S"
    );
}

#[tokio::test]
async fn test_redeem_rejections() {
    let cases = [
        (
            SystemPhase::Accumulation,
            "r-1",
            "s-1",
            StatusCode::LOCKED,
            "PHASE_LOCKED",
        ),
        (
            SystemPhase::Redeem,
            "r-3",
            "s-1",
            StatusCode::CONFLICT,
            "INSUFFICIENT_BALANCE",
        ),
        (
            SystemPhase::Redeem,
            "r-1",
            "s-2",
            StatusCode::CONFLICT,
            "SLOT_FULL",
        ),
        (
            SystemPhase::Redeem,
            "r-404",
            "s-1",
            StatusCode::NOT_FOUND,
            "REWARD_NOT_FOUND",
        ),
    ];

    for (phase, reward_id, slot_id, expected_status, expected_code) in cases {
        let state = test_state(phase);
        let (status, body) = send(
            app(state.clone()),
            json_request("POST", "/api/redemptions", redeem_body(reward_id, slot_id)),
        )
        .await;

        assert_eq!(status, expected_status, "{expected_code}");
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], expected_code);
        assert!(body["data"].is_null());
        assert_eq!(state.engine.member("u-101").unwrap().tokens, 145);
    }
}

#[tokio::test]
async fn test_redeem_validation() {
    let (status, body) = send(
        test_app(SystemPhase::Redeem),
        json_request(
            "POST",
            "/api/redemptions",
            json!({ "memberId": "", "rewardId": "r-1", "slotId": "s-1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_redemption_preview() {
    let state = test_state(SystemPhase::Judgment);
    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/redemptions/preview",
            redeem_body("r-1", "s-1"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phaseOpen"], false);
    assert_eq!(body["data"]["affordable"], true);
    assert_eq!(body["data"]["balanceAfter"], 25);
    assert_eq!(body["data"]["blockedBy"], "PHASE_LOCKED");
    assert_eq!(state.engine.catalog().get("r-1").unwrap().stock, 5);
}

// ==================== 活动与裁决 ====================

#[tokio::test]
async fn test_upload_sprints_then_judge() {
    let state = test_state(SystemPhase::Accumulation);

    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/ingestion/sprints",
            json!({
                "label": "June 2024",
                "reports": [{ "memberId": "u-101", "sprintCount": 0 }, { "memberId": "u-999", "sprintCount": 1 }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["markedInactive"], 1);
    assert_eq!(body["data"]["unknownMembers"], json!(["u-999"]));

    let (status, body) = send(
        app(state.clone()),
        Request::builder()
            .method("POST")
            .uri("/api/judgment/run")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["downgrades"], 1);
    assert_eq!(body["data"]["outcomes"][0]["outcome"], "DOWNGRADE");
    assert_eq!(body["data"]["outcomes"][0]["cut"], 72);

    let (_, body) = send(app(state), get("/api/members/u-101")).await;
    assert_eq!(body["data"]["tokens"], 73);
    assert_eq!(body["data"]["grade"], "SAPPHIRE");
    assert_eq!(
        body["data"]["recentHistory"][0]["description"],
        "PENALTY: Cumulative Inactivity. Downgrade to Sapphire & 50% Token Cut"
    );
}

#[tokio::test]
async fn test_judge_unknown_member() {
    let (status, body) = send(
        test_app(SystemPhase::Judgment),
        Request::builder()
            .method("POST")
            .uri("/api/judgment/members/u-404")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "MEMBER_NOT_FOUND");
}

// ==================== 奖品与时段 ====================

#[tokio::test]
async fn test_import_rewards() {
    let state = test_state(SystemPhase::Accumulation);
    let response = app(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/rewards/import")
                .header("content-type", "text/plain")
                .body(Body::from(
                    "Name,Cost,Stock,ImageURL\nStanding Desk,400,2\nBroken,abc,1\n",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["imported"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["rejected"][0]["line"], 3);
    assert_eq!(
        body["data"]["imported"][0]["image"],
        "https://via.placeholder.com/300"
    );
    assert_eq!(state.engine.catalog().list().len(), 7);
}

#[tokio::test]
async fn test_stock_and_image_maintenance() {
    let state = test_state(SystemPhase::Accumulation);

    let (status, body) = send(
        app(state.clone()),
        json_request("PATCH", "/api/rewards/r-5/stock", json!({ "delta": -10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stock"], 0);

    let (status, _) = send(
        app(state.clone()),
        json_request(
            "PATCH",
            "/api/rewards/r-5/stock",
            json!({ "delta": 1, "stock": 4 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app(state.clone()),
        json_request(
            "PUT",
            "/api/rewards/r-5/image",
            json!({ "image": "https://cdn.example.com/chair.png" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["image"], "https://cdn.example.com/chair.png");

    let (_, body) = send(app(state), get("/api/rewards/low-stock")).await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["r-5", "r-3"]);
}

#[tokio::test]
async fn test_create_reward_and_slot() {
    let state = test_state(SystemPhase::Accumulation);

    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/rewards",
            json!({ "name": "Desk Lamp", "cost": 40, "stock": 6 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["id"].as_str().unwrap().starts_with("r-"));

    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/rewards",
            json!({ "name": "Free", "cost": 0, "stock": 6 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/slots",
            json!({ "datetime": "2024-06-19T08:00:00", "quota": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(app(state), get("/api/slots")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"][0]["datetime"], "2024-06-19T08:00:00");
}

// ==================== 会员 ====================

#[tokio::test]
async fn test_member_history_and_advice() {
    let state = test_state(SystemPhase::Accumulation);

    let (status, body) = send(app(state.clone()), get("/api/members/u-101/history?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["kind"], "ADJUSTMENT");

    let (status, body) = send(
        app(state.clone()),
        get("/api/members/u-101/advice?rewardId=r-3"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["plan"]["sprintsNeeded"], 11);
    assert_eq!(body["data"]["plan"]["shortfall"], 205);

    let (status, body) = send(app(state), get("/api/members/u-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "MEMBER_NOT_FOUND");
}

#[tokio::test]
async fn test_create_member() {
    let state = test_state(SystemPhase::Accumulation);

    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/members",
            json!({
                "id": "u-202",
                "name": "Sari Wulandari",
                "email": "sari@techno.co.id",
                "tokenExpiryDate": "2026-12-31",
                "openingBalance": 30
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["tokens"], 30);
    assert_eq!(body["data"]["grade"], "SAPPHIRE");

    let (status, body) = send(app(state.clone()), get("/api/members")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        app(state),
        json_request(
            "POST",
            "/api/members",
            json!({
                "id": "u-202",
                "name": "Sari Wulandari",
                "email": "sari@techno.co.id",
                "tokenExpiryDate": "2026-12-31"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn test_sprint_credit_overflow_is_rejected() {
    let state = test_state(SystemPhase::Accumulation);

    let (status, _) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/members",
            json!({
                "id": "u-303",
                "name": "Rina Kusuma",
                "email": "rina@techno.co.id",
                "tokenExpiryDate": "2026-12-31",
                "openingBalance": i64::MAX
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/ingestion/sprints",
            json!({
                "label": "July 2024",
                "reports": [{ "memberId": "u-303", "sprintCount": 1 }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_AMOUNT");

    let (_, body) = send(app(state), get("/api/members/u-303")).await;
    assert_eq!(body["data"]["tokens"], i64::MAX);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(test_app(SystemPhase::Redeem), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["phase"], "REDEEM");
}
