mod common;

use axum::http::StatusCode;
use common::{BACKENDS, TestApp, five_bootcamps, ids, setup_test_app};
use serde_json::{Value, json};

async fn seeded(backend: common::Backend) -> TestApp {
    let app = setup_test_app(backend).await;
    app.seed("bootcamps", five_bootcamps()).await;
    app.seed(
        "courses",
        vec![
            json!({"_id": "c1", "title": "Front End", "tuition": 8000, "weeks": 8, "bootcamp": "b1", "user": "publisher1", "createdAt": "2024-02-01T00:00:00.000Z"}),
            json!({"_id": "c2", "title": "Full Stack", "tuition": 10000, "weeks": 12, "bootcamp": "b1", "user": "publisher1", "createdAt": "2024-02-02T00:00:00.000Z"}),
            json!({"_id": "c3", "title": "Data Science", "tuition": 12000, "weeks": 10, "bootcamp": "b3", "user": "publisher3", "createdAt": "2024-02-03T00:00:00.000Z"}),
            json!({"_id": "c4", "title": "Orphan", "tuition": 500, "weeks": 1, "bootcamp": "gone", "user": "publisher9", "createdAt": "2024-02-04T00:00:00.000Z"}),
        ],
    )
    .await;
    app
}

#[tokio::test]
async fn test_first_page_has_next_only() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (status, body) = app.get("/api/v1/bootcamps?page=1&limit=2").await;

        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["count"], json!(2));
        assert_eq!(ids(&body), vec!["b5", "b4"], "{backend:?}");
        assert_eq!(body["pagination"]["next"], json!({"page": 2, "limit": 2}));
        assert!(body["pagination"].get("previous").is_none());
    }
}

#[tokio::test]
async fn test_last_page_has_previous_only() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (status, body) = app.get("/api/v1/bootcamps?page=3&limit=2").await;

        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["count"], json!(1));
        assert_eq!(ids(&body), vec!["b1"], "{backend:?}");
        assert_eq!(body["pagination"]["previous"], json!({"page": 2, "limit": 2}));
        assert!(body["pagination"].get("next").is_none());
    }
}

#[tokio::test]
async fn test_default_sort_is_newest_first() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (_, body) = app.get("/api/v1/bootcamps").await;
        assert_eq!(ids(&body), vec!["b5", "b4", "b3", "b2", "b1"], "{backend:?}");
        assert_eq!(body["count"], json!(5));
    }
}

#[tokio::test]
async fn test_select_returns_exact_fields_plus_id() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (status, body) = app.get("/api/v1/bootcamps?select=name,email").await;

        assert_eq!(status, StatusCode::OK, "{backend:?}");
        for bootcamp in body["data"].as_array().unwrap() {
            let mut keys: Vec<&str> = bootcamp.as_object().unwrap().keys().map(String::as_str).collect();
            keys.sort_unstable();
            assert_eq!(keys, vec!["_id", "email", "name"], "{backend:?}");
        }
    }
}

#[tokio::test]
async fn test_comparison_filter_and_sort() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (_, body) = app
            .get("/api/v1/bootcamps?averageCost%5Blte%5D=6000&sort=-averageCost&select=name,averageCost")
            .await;

        assert_eq!(ids(&body), vec!["b3", "b2", "b1"], "{backend:?}");
        let costs: Vec<&Value> = body["data"].as_array().unwrap().iter().map(|b| &b["averageCost"]).collect();
        assert_eq!(costs, vec![&json!(6000), &json!(4000), &json!(2000)]);
    }
}

#[tokio::test]
async fn test_in_filter_matches_any_array_element() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (_, body) = app
            .get("/api/v1/bootcamps?careers%5Bin%5D=Business,UI/UX&sort=name")
            .await;
        assert_eq!(ids(&body), vec!["b1", "b2", "b3"], "{backend:?}");
    }
}

#[tokio::test]
async fn test_nested_field_and_literal_coercion() {
    for backend in BACKENDS {
        let app = seeded(backend).await;

        let (_, body) = app.get("/api/v1/bootcamps?location.state=MA&sort=name").await;
        assert_eq!(ids(&body), vec!["b1", "b3"], "{backend:?}");

        let (_, body) = app.get("/api/v1/bootcamps?housing=true&sort=name").await;
        assert_eq!(ids(&body), vec!["b2", "b4"], "{backend:?}");

        // Leading zeros keep zip codes as strings.
        let (_, body) = app.get("/api/v1/bootcamps?location.zipcode=02113").await;
        assert_eq!(ids(&body), vec!["b3"], "{backend:?}");
    }
}

#[tokio::test]
async fn test_pagination_is_computed_from_unfiltered_total() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (_, body) = app.get("/api/v1/bootcamps?location.state=MA&limit=1").await;

        assert_eq!(body["count"], json!(1), "{backend:?}");
        assert_eq!(body["pagination"]["next"], json!({"page": 2, "limit": 1}));
    }
}

#[tokio::test]
async fn test_no_match_is_an_empty_success() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (status, body) = app.get("/api/v1/bootcamps?name=Nowhere").await;

        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["count"], json!(0));
        assert_eq!(body["data"], json!([]));
    }
}

#[tokio::test]
async fn test_malformed_query_is_rejected() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (status, body) = app.get("/api/v1/bootcamps?select=name,-email").await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{backend:?}");
        assert_eq!(body, json!({"success": false, "error": "Invalid query parameters"}));
    }
}

#[tokio::test]
async fn test_same_query_same_envelope() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let uri = "/api/v1/courses?tuition%5Bgte%5D=8000&sort=tuition&page=1&limit=2";
        let (_, first) = app.get(uri).await;
        let (_, second) = app.get(uri).await;
        assert_eq!(first, second, "{backend:?}");
    }
}

#[tokio::test]
async fn test_courses_populate_bootcamp_summary() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (_, body) = app.get("/api/v1/courses?tuition%5Bgt%5D=9000&sort=tuition").await;

        assert_eq!(ids(&body), vec!["c2", "c3"], "{backend:?}");
        assert_eq!(
            body["data"][0]["bootcamp"],
            json!({"_id": "b1", "name": "Bootcamp 1", "description": "Description 1"})
        );
        assert_eq!(body["data"][1]["bootcamp"]["_id"], json!("b3"));
    }
}

#[tokio::test]
async fn test_missing_reference_populates_null() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (_, body) = app.get("/api/v1/courses?title=Orphan").await;
        assert_eq!(body["data"][0]["bootcamp"], Value::Null, "{backend:?}");
    }
}

#[tokio::test]
async fn test_bootcamps_populate_their_courses() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (_, body) = app.get("/api/v1/bootcamps?sort=name").await;
        let data = body["data"].as_array().unwrap();

        let course_ids = |bootcamp: &Value| -> Vec<String> {
            let mut ids: Vec<String> = bootcamp["courses"]
                .as_array()
                .unwrap()
                .iter()
                .map(|c| c["_id"].as_str().unwrap().to_string())
                .collect();
            ids.sort();
            ids
        };
        assert_eq!(course_ids(&data[0]), vec!["c1", "c2"], "{backend:?}");
        assert!(course_ids(&data[1]).is_empty());
        assert_eq!(course_ids(&data[2]), vec!["c3"]);
    }
}

#[tokio::test]
async fn test_route_limit_falls_back_for_bad_values() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (_, body) = app.get("/api/v1/bootcamps?page=0&limit=abc").await;

        assert_eq!(body["count"], json!(5), "{backend:?}");
        assert_eq!(body["pagination"]["page"], json!(1));
        assert_eq!(body["pagination"]["limit"], json!(25));
    }
}

#[tokio::test]
async fn test_page_beyond_the_data_is_empty() {
    for backend in BACKENDS {
        let app = seeded(backend).await;

        let (status, body) = app.get("/api/v1/bootcamps?page=4&limit=2").await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["data"], json!([]));
        assert!(body["pagination"].get("next").is_none());
        assert_eq!(body["pagination"]["previous"], json!({"page": 3, "limit": 2}));

        let (status, body) = app.get("/api/v1/bootcamps?page=4611686018427387905&limit=2").await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["count"], json!(0));
        assert_eq!(body["pagination"]["page"], json!(4_611_686_018_427_387_905_u64));
        assert!(body["pagination"].get("next").is_none());
    }
}

#[tokio::test]
async fn test_huge_limit_returns_everything() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let (status, body) = app.get("/api/v1/bootcamps?limit=9223372036854775808").await;

        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["count"], json!(5));
        assert!(body["pagination"].get("next").is_none());
    }
}

#[tokio::test]
async fn test_mixed_types_sort_the_same_on_every_store() {
    for backend in BACKENDS {
        let app = setup_test_app(backend).await;
        app.seed(
            "bootcamps",
            vec![
                json!({"_id": "o", "tag": {"k": 1}, "createdAt": "2024-01-01T00:00:00.000Z"}),
                json!({"_id": "a", "tag": ["a"], "createdAt": "2024-01-02T00:00:00.000Z"}),
                json!({"_id": "s", "tag": "zzz", "createdAt": "2024-01-03T00:00:00.000Z"}),
                json!({"_id": "n", "tag": 3, "createdAt": "2024-01-04T00:00:00.000Z"}),
                json!({"_id": "m", "createdAt": "2024-01-05T00:00:00.000Z"}),
            ],
        )
        .await;

        let (_, body) = app.get("/api/v1/bootcamps?sort=tag&select=tag").await;
        assert_eq!(ids(&body), vec!["m", "n", "s", "a", "o"], "{backend:?}");

        let (_, body) = app.get("/api/v1/bootcamps?sort=-tag&select=tag").await;
        assert_eq!(ids(&body), vec!["o", "a", "s", "n", "m"], "{backend:?}");
    }
}

#[tokio::test]
async fn test_long_in_list_is_answered() {
    for backend in BACKENDS {
        let app = seeded(backend).await;
        let mut states: Vec<String> = (0..2000).map(|n| format!("X{n}")).collect();
        states.push("VT".to_string());
        let uri = format!("/api/v1/bootcamps?location.state%5Bin%5D={}", states.join(","));

        let (status, body) = app.get(&uri).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(ids(&body), vec!["b2"]);
    }
}
