mod common;

use common::date;
use serde_json::json;

#[tokio::test]
async fn test_stats_single_day() {
    let app = common::test_app();
    common::seed_stat(&app.stats, 123, date(2024, 1, 1), 3).await;
    common::seed_stat(&app.stats, 456, date(2024, 1, 1), 1).await;

    let response = app
        .server
        .get("/stats")
        .add_query_param("from", "2024-01-01")
        .add_query_param("to", "2024-01-01")
        .add_query_param("by", "day")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "stats": [
            { "period_from": "2024-01-01", "period_to": "2024-01-01", "clicks": 4 }
        ],
        "total_clicks": 4
    }));
}

#[tokio::test]
async fn test_stats_by_day_skips_empty_days() {
    let app = common::test_app();
    common::seed_stat(&app.stats, 1, date(2024, 1, 2), 2).await;
    common::seed_stat(&app.stats, 1, date(2024, 1, 5), 7).await;
    common::seed_stat(&app.stats, 2, date(2024, 1, 5), 1).await;
    common::seed_stat(&app.stats, 1, date(2024, 2, 1), 100).await;

    let response = app
        .server
        .get("/stats")
        .add_query_param("from", "2024-01-01")
        .add_query_param("to", "2024-01-31")
        .add_query_param("by", "day")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "stats": [
            { "period_from": "2024-01-02", "period_to": "2024-01-02", "clicks": 2 },
            { "period_from": "2024-01-05", "period_to": "2024-01-05", "clicks": 8 }
        ],
        "total_clicks": 10
    }));
}

#[tokio::test]
async fn test_stats_by_month() {
    let app = common::test_app();
    common::seed_stat(&app.stats, 1, date(2024, 1, 10), 2).await;
    common::seed_stat(&app.stats, 1, date(2024, 1, 20), 3).await;
    common::seed_stat(&app.stats, 2, date(2024, 2, 29), 4).await;
    common::seed_stat(&app.stats, 1, date(2024, 4, 1), 1).await;

    let response = app
        .server
        .get("/stats")
        .add_query_param("from", "2024-01-01")
        .add_query_param("to", "2024-04-30")
        .add_query_param("by", "month")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "stats": [
            { "period_from": "2024-01-01", "period_to": "2024-01-31", "clicks": 5 },
            { "period_from": "2024-02-01", "period_to": "2024-02-29", "clicks": 4 },
            { "period_from": "2024-04-01", "period_to": "2024-04-30", "clicks": 1 }
        ],
        "total_clicks": 10
    }));
}

#[tokio::test]
async fn test_stats_empty_range_returns_placeholder() {
    let app = common::test_app();

    let response = app
        .server
        .get("/stats")
        .add_query_param("from", "2024-03-01")
        .add_query_param("to", "2024-03-31")
        .add_query_param("by", "month")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "stats": [
            { "period_from": "2024-03-01", "period_to": "2024-03-31", "clicks": 0 }
        ],
        "total_clicks": 0
    }));
}

#[tokio::test]
async fn test_stats_invalid_parameters() {
    let app = common::test_app();

    let cases = [
        ("2024-01-01", "2024-01-31", "week"),
        ("2024-01-01", "2024-01-31", "DAY"),
        ("2024/01/01", "2024-01-31", "day"),
        ("2024-01-01", "not-a-date", "day"),
        ("2024-02-01", "2024-01-01", "day"),
    ];

    for (from, to, by) in cases {
        let response = app
            .server
            .get("/stats")
            .add_query_param("from", from)
            .add_query_param("to", to)
            .add_query_param("by", by)
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["code"], "validation_error", "{from} {to} {by}");
    }
}

#[tokio::test]
async fn test_stats_missing_parameters() {
    let app = common::test_app();

    app.server
        .get("/stats")
        .add_query_param("from", "2024-01-01")
        .add_query_param("to", "2024-01-31")
        .await
        .assert_status_bad_request();

    app.server
        .get("/stats")
        .add_query_param("by", "day")
        .await
        .assert_status_bad_request();
}
