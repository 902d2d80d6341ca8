use axum::http::StatusCode;
use axum_test::TestServer;
use minion_store::api::create_router;
use minion_store::db::Database;
use minion_store::models::*;
use serde_json::json;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.init_schema().expect("Failed to create schema");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_parent(server: &TestServer, name: &str) {
    server
        .post("/api/v1/Parent")
        .json(&Parent::named(name))
        .await
        .assert_status(StatusCode::CREATED);
}

async fn create_minion(server: &TestServer, name: &str, parent: &str, contents: &[&str]) {
    server
        .post("/api/v1/Minion")
        .json(&Minion::named(name).with_parent(parent).with_contents(contents.iter().copied()))
        .await
        .assert_status(StatusCode::CREATED);
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }
}

mod parents {
    use super::*;

    #[tokio::test]
    async fn returns_empty_list_when_no_parents_exist() {
        let server = setup();

        let response = server.get("/api/v1/Parent").await;

        response.assert_status_ok();
        let parents: Vec<Parent> = response.json();
        assert!(parents.is_empty());
    }

    #[tokio::test]
    async fn create_returns_created_with_location() {
        let server = setup();

        let response = server
            .post("/api/v1/Parent")
            .json(&json!({ "name": "P1", "description": "first" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.header("location"), "/api/v1/Parent/P1");
        let parent: Parent = response.json();
        assert_eq!(parent.name.as_deref(), Some("P1"));
        assert_eq!(parent.description.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn create_encodes_name_in_location() {
        let server = setup();

        let response = server
            .post("/api/v1/Parent")
            .json(&Parent::named("test parent"))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.header("location"), "/api/v1/Parent/test%20parent");
    }

    #[tokio::test]
    async fn create_with_control_character_in_name_is_created() {
        let server = setup();

        let response = server
            .post("/api/v1/Parent")
            .json(&json!({ "name": "line\nbreak" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.header("location"), "/api/v1/Parent/line%0Abreak");
        let parents: Vec<Parent> = server.get("/api/v1/Parent").await.json();
        assert_eq!(parents[0].name.as_deref(), Some("line\nbreak"));
    }

    #[tokio::test]
    async fn create_without_name_is_bad_request() {
        let server = setup();

        let response = server
            .post("/api/v1/Parent")
            .json(&json!({ "description": "nameless" }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn duplicate_create_is_bad_request() {
        let server = setup();
        create_parent(&server, "P1").await;

        let response = server.post("/api/v1/Parent").json(&Parent::named("P1")).await;

        response.assert_status_bad_request();
        assert!(response.text().contains("already exists"));
    }

    #[tokio::test]
    async fn get_by_name_reports_minion_names() {
        let server = setup();
        create_parent(&server, "P1").await;
        create_minion(&server, "M1", "P1", &["a"]).await;

        let response = server.get("/api/v1/Parent/P1").await;

        response.assert_status_ok();
        response.assert_json(&json!([
            { "name": "P1", "description": null, "minionNames": ["M1"] }
        ]));
    }

    #[tokio::test]
    async fn update_changes_description() {
        let server = setup();
        create_parent(&server, "P1").await;

        let response = server
            .put("/api/v1/Parent/P1")
            .json(&json!({ "description": "updated" }))
            .await;

        response.assert_status_ok();
        let parent: Parent = response.json();
        assert_eq!(parent.name.as_deref(), Some("P1"));
        assert_eq!(parent.description.as_deref(), Some("updated"));
    }

    #[tokio::test]
    async fn update_unknown_parent_is_not_found() {
        let server = setup();

        let response = server
            .put("/api/v1/Parent/missing")
            .json(&json!({ "description": "updated" }))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_cascades_to_minions() {
        let server = setup();
        create_parent(&server, "P1").await;
        create_minion(&server, "M1", "P1", &[]).await;

        server
            .delete("/api/v1/Parent/P1")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let minions: Vec<Minion> = server.get("/api/v1/Minion/M1").await.json();
        assert!(minions.is_empty());
    }

    #[tokio::test]
    async fn delete_all_empties_the_collection() {
        let server = setup();
        create_parent(&server, "P1").await;
        create_parent(&server, "P2").await;

        server
            .delete("/api/v1/Parent")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let parents: Vec<Parent> = server.get("/api/v1/Parent").await.json();
        assert!(parents.is_empty());
    }
}

mod minions {
    use super::*;

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let server = setup();
        create_parent(&server, "P1").await;
        create_minion(&server, "M1", "P1", &["a"]).await;

        let response = server.get("/api/v1/Minion/M1").await;

        response.assert_status_ok();
        response.assert_json(&json!([
            { "name": "M1", "description": null, "contents": ["a"], "parentName": "P1" }
        ]));
    }

    #[tokio::test]
    async fn create_without_parent_name_is_bad_request() {
        let server = setup();
        create_parent(&server, "P1").await;

        let response = server
            .post("/api/v1/Minion")
            .json(&json!({ "name": "M1" }))
            .await;

        response.assert_status_bad_request();
        assert!(response.text().contains("parentName"));
    }

    #[tokio::test]
    async fn create_with_unknown_parent_is_not_found() {
        let server = setup();

        let response = server
            .post("/api/v1/Minion")
            .json(&json!({ "name": "M1", "parentName": "nobody" }))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn update_contents_keeps_parent() {
        let server = setup();
        create_parent(&server, "P1").await;
        create_minion(&server, "M1", "P1", &["a"]).await;

        let response = server
            .put("/api/v1/Minion/M1")
            .json(&json!({ "contents": ["b", "c"] }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "name": "M1", "description": null, "contents": ["b", "c"], "parentName": "P1"
        }));
    }

    #[tokio::test]
    async fn update_to_unknown_parent_is_not_found_and_keeps_link() {
        let server = setup();
        create_parent(&server, "P1").await;
        create_minion(&server, "M1", "P1", &[]).await;

        server
            .put("/api/v1/Minion/M1")
            .json(&json!({ "parentName": "P2" }))
            .await
            .assert_status_not_found();

        let minions: Vec<Minion> = server.get("/api/v1/Minion/M1").await.json();
        assert_eq!(minions[0].parent_name.as_deref(), Some("P1"));
    }

    #[tokio::test]
    async fn list_returns_all_minions() {
        let server = setup();
        create_parent(&server, "P1").await;
        create_minion(&server, "M1", "P1", &[]).await;
        create_minion(&server, "M2", "P1", &[]).await;

        let minions: Vec<Minion> = server.get("/api/v1/Minion").await.json();

        let names: Vec<_> = minions.into_iter().filter_map(|m| m.name).collect();
        assert_eq!(names, vec!["M1".to_string(), "M2".to_string()]);
    }

    #[tokio::test]
    async fn delete_all_keeps_parents() {
        let server = setup();
        create_parent(&server, "P1").await;
        create_minion(&server, "M1", "P1", &[]).await;

        server
            .delete("/api/v1/Minion")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let parents: Vec<Parent> = server.get("/api/v1/Parent").await.json();
        assert_eq!(parents.len(), 1);
        assert!(parents[0].minion_names.is_empty());
    }
}

mod unavailable_store {
    use super::*;

    #[tokio::test]
    async fn every_request_is_an_internal_error() {
        let server = TestServer::new(create_router(Database::unavailable("disk missing")))
            .expect("Failed to create test server");

        let response = server.get("/api/v1/Parent").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.text().contains("disk missing"));

        server
            .post("/api/v1/Minion")
            .json(&json!({ "name": "M1", "parentName": "P1" }))
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
