mod common;

use axum::http::StatusCode;
use common::{BACKENDS, TestApp, setup_test_app};
use devcamper::auth::Role;
use serde_json::{Value, json};

/// A published bootcamp owned by `p1`; returns its id and the owner's token.
async fn published(app: &TestApp) -> (String, String) {
    let token = app.login("p1", Role::Publisher).await;
    let bootcamp = json!({
        "name": "Codemasters",
        "description": "Is coding your passion?",
        "address": "220 Pawtucket St, Lowell, MA 01854",
        "careers": ["Web Development", "Data Science"],
    });
    let (status, body) = app.post("/api/v1/bootcamps", &token, bootcamp).await;
    assert_eq!(status, StatusCode::CREATED);
    (body["data"]["_id"].as_str().unwrap().to_string(), token)
}

fn course(title: &str, tuition: u32) -> Value {
    json!({
        "title": title,
        "description": "Course description",
        "weeks": 10,
        "tuition": tuition,
        "minimumSkill": "intermediate",
        "scholarshipAvailable": true,
    })
}

fn number(value: &Value) -> f64 {
    value.as_f64().expect("numeric field")
}

#[tokio::test]
async fn test_average_cost_follows_courses() {
    for backend in BACKENDS {
        let app = setup_test_app(backend).await;
        let (bootcamp, token) = published(&app).await;
        let courses_uri = format!("/api/v1/bootcamps/{bootcamp}/courses");

        let (status, first) = app.post(&courses_uri, &token, course("Web Design", 8000)).await;
        assert_eq!(status, StatusCode::CREATED, "{backend:?}");
        assert_eq!(first["data"]["bootcamp"], json!(bootcamp));
        app.post(&courses_uri, &token, course("Python", 10001)).await;

        let (_, body) = app.get(&format!("/api/v1/bootcamps/{bootcamp}")).await;
        assert_eq!(number(&body["data"]["averageCost"]), 9010.0, "{backend:?}");

        let first_uri = format!("/api/v1/courses/{}", first["data"]["_id"].as_str().unwrap());
        let (status, _) = app.put(&first_uri, &token, json!({"tuition": 12000})).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = app.get(&format!("/api/v1/bootcamps/{bootcamp}")).await;
        assert_eq!(number(&body["data"]["averageCost"]), 11010.0);

        app.delete(&first_uri, &token).await;
        let (_, body) = app.get(&format!("/api/v1/bootcamps/{bootcamp}")).await;
        assert_eq!(number(&body["data"]["averageCost"]), 10010.0);
    }
}

#[tokio::test]
async fn test_only_bootcamp_owner_adds_courses() {
    for backend in BACKENDS {
        let app = setup_test_app(backend).await;
        let (bootcamp, _) = published(&app).await;
        let stranger = app.login("p2", Role::Publisher).await;

        let (status, body) = app
            .post(&format!("/api/v1/bootcamps/{bootcamp}/courses"), &stranger, course("Rust", 9000))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{backend:?}");
        assert_eq!(body["error"], json!("User p2 is not authorized to add a course to this bootcamp"));
    }
}

#[tokio::test]
async fn test_course_for_unknown_bootcamp_is_not_found() {
    for backend in BACKENDS {
        let app = setup_test_app(backend).await;
        let token = app.login("p1", Role::Publisher).await;
        let (status, body) = app
            .post("/api/v1/bootcamps/nope/courses", &token, course("Rust", 9000))
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{backend:?}");
        assert_eq!(body["error"], json!("Bootcamp not found with id of nope"));
    }
}

#[tokio::test]
async fn test_bootcamp_course_listing_and_single_read() {
    for backend in BACKENDS {
        let app = setup_test_app(backend).await;
        let (bootcamp, token) = published(&app).await;
        let courses_uri = format!("/api/v1/bootcamps/{bootcamp}/courses");
        let (_, created) = app.post(&courses_uri, &token, course("Web Design", 8000)).await;
        app.post(&courses_uri, &token, course("Python", 9000)).await;

        let (status, body) = app.get(&courses_uri).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["count"], json!(2));
        assert!(body.get("pagination").is_none());

        let id = created["data"]["_id"].as_str().unwrap();
        let (_, body) = app.get(&format!("/api/v1/courses/{id}")).await;
        assert_eq!(
            body["data"]["bootcamp"],
            json!({"_id": bootcamp, "name": "Codemasters", "description": "Is coding your passion?"})
        );
    }
}

#[tokio::test]
async fn test_reviews_average_rating_and_one_per_user() {
    for backend in BACKENDS {
        let app = setup_test_app(backend).await;
        let (bootcamp, publisher) = published(&app).await;
        let alice = app.login("alice", Role::User).await;
        let bob = app.login("bob", Role::User).await;
        let reviews_uri = format!("/api/v1/bootcamps/{bootcamp}/reviews");

        let (status, body) = app
            .post(&reviews_uri, &publisher, json!({"title": "Mine", "text": "Best", "rating": 10}))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{backend:?}");
        assert_eq!(body["error"], json!("User role publisher is not authorized to access this route"));

        let (status, review) = app
            .post(&reviews_uri, &alice, json!({"title": "Good", "text": "Solid", "rating": 8}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        app.post(&reviews_uri, &bob, json!({"title": "Okay", "text": "Fine", "rating": 5}))
            .await;

        let (status, body) = app
            .post(&reviews_uri, &alice, json!({"title": "Again", "text": "Twice", "rating": 1}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Duplicate field value entered"));

        let (_, body) = app.get(&format!("/api/v1/bootcamps/{bootcamp}")).await;
        assert_eq!(number(&body["data"]["averageRating"]), 6.5);

        let review_uri = format!("/api/v1/reviews/{}", review["data"]["_id"].as_str().unwrap());
        let (status, _) = app.put(&review_uri, &bob, json!({"rating": 1})).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.get(&review_uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["bootcamp"]["name"], json!("Codemasters"));

        let (_, listing) = app.get(&reviews_uri).await;
        assert_eq!(listing["count"], json!(2));
    }
}

#[tokio::test]
async fn test_rating_out_of_range_is_rejected() {
    for backend in BACKENDS {
        let app = setup_test_app(backend).await;
        let (bootcamp, _) = published(&app).await;
        let alice = app.login("alice", Role::User).await;

        let (status, body) = app
            .post(
                &format!("/api/v1/bootcamps/{bootcamp}/reviews"),
                &alice,
                json!({"title": "Wow", "text": "Unreal", "rating": 11}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{backend:?}");
        assert_eq!(body["error"], json!("Please add a rating between 1 and 10"));
    }
}

#[tokio::test]
async fn test_reviews_list_supports_query_pipeline() {
    for backend in BACKENDS {
        let app = setup_test_app(backend).await;
        let (bootcamp, _) = published(&app).await;
        let reviews_uri = format!("/api/v1/bootcamps/{bootcamp}/reviews");
        for (user, rating) in [("u1", 3), ("u2", 7), ("u3", 9)] {
            let token = app.login(user, Role::User).await;
            app.post(&reviews_uri, &token, json!({"title": user, "text": "Review", "rating": rating}))
                .await;
        }

        let (_, body) = app.get("/api/v1/reviews?rating%5Bgte%5D=7&sort=-rating&select=title,rating").await;
        let titles: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["u3", "u2"], "{backend:?}");
        assert!(body["data"][0].get("bootcamp").is_none());
    }
}
