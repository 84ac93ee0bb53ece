//! Integration tests for events, boards, candidates, mission and settings.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    admin_token, create, delete_request, get_request, json_request, member_token, send, test_app,
    test_app_sharing_store,
};
use persistence::repositories::collections::{ELECTION_CANDIDATES, VOTERS};
use persistence::{CollectionPath, DocumentStore};
use serde_json::{json, Value};

fn names(page: &Value, field: &str) -> Vec<String> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item[field].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_events_ordered_by_date_and_upcoming_filter() {
    let app = test_app();
    let token = admin_token(&app).await;

    for (title, date) in [
        ("Charity iftar", "2099-04-10"),
        ("Blood camp", "2000-02-01"),
        ("Fundraising gala", "2099-01-15"),
    ] {
        create(
            &app,
            &token,
            "/api/v1/events",
            json!({ "title": title, "details": "Community hall", "date": date, "participants": 40 }),
        )
        .await;
    }

    let (_, all) = send(&app, get_request("/api/v1/events", None)).await;
    assert_eq!(
        names(&all, "title"),
        vec!["Blood camp", "Fundraising gala", "Charity iftar"]
    );

    let (_, upcoming) = send(&app, get_request("/api/v1/events?upcoming_only=true", None)).await;
    assert_eq!(names(&upcoming, "title"), vec!["Fundraising gala", "Charity iftar"]);
}

#[tokio::test]
async fn test_event_update_and_delete() {
    let app = test_app();
    let token = admin_token(&app).await;
    let event = create(
        &app,
        &token,
        "/api/v1/events",
        json!({ "title": "Tree planting", "details": "Park", "date": "2099-05-05", "participants": 10 }),
    )
    .await;
    let uri = format!("/api/v1/events/{}", event["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        json_request(Method::PATCH, &uri, Some(&token), json!({ "participants": 25 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["participants"], 25);
    assert_eq!(updated["title"], "Tree planting");

    let (status, _) = send(&app, delete_request(&uri, &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, get_request(&uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_boards_are_separate_and_ordered() {
    let app = test_app();
    let token = admin_token(&app).await;

    for (name, order) in [("Fatema", 2), ("Anwar", 1)] {
        create(
            &app,
            &token,
            "/api/v1/boards/advisory/members",
            json!({ "name": name, "designation": "Advisor", "display_order": order }),
        )
        .await;
    }
    create(
        &app,
        &token,
        "/api/v1/boards/executive/members",
        json!({ "name": "Selim", "designation": "Treasurer", "display_order": 1 }),
    )
    .await;

    let (status, advisory) = send(&app, get_request("/api/v1/boards/advisory/members", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&advisory, "name"), vec!["Anwar", "Fatema"]);

    let (_, executive) = send(&app, get_request("/api/v1/boards/executive/members", None)).await;
    assert_eq!(names(&executive, "name"), vec!["Selim"]);

    let (status, _) = send(&app, get_request("/api/v1/boards/treasury/members", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_candidates_with_voters() {
    let (app, store) = test_app_sharing_store();
    let token = admin_token(&app).await;

    let president = create(
        &app,
        &token,
        "/api/v1/candidates",
        json!({ "name": "Karim", "symbol": "Boat", "position": "President" }),
    )
    .await;
    create(
        &app,
        &token,
        "/api/v1/candidates",
        json!({ "name": "Shirin", "symbol": "Lamp", "position": "GeneralSecretary" }),
    )
    .await;

    let president_id = president["id"].as_str().unwrap();
    let voters = CollectionPath::root(ELECTION_CANDIDATES).child(president_id, VOTERS);
    for (voter, at) in [("uid-2", "2024-03-01T10:05:00Z"), ("uid-1", "2024-03-01T09:00:00Z")] {
        let data = json!({ "voter_id": voter, "voter_name": voter, "voted_at": at });
        store
            .insert(&voters, None, data.as_object().unwrap().clone())
            .await
            .unwrap();
    }

    let (status, page) = send(&app, get_request("/api/v1/candidates?include_voters=true", None)).await;
    assert_eq!(status, StatusCode::OK);
    let entries = page["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let karim = entries.iter().find(|c| c["name"] == "Karim").unwrap();
    assert_eq!(karim["vote_count"], 2);
    let shirin = entries.iter().find(|c| c["name"] == "Shirin").unwrap();
    assert_eq!(shirin["vote_count"], 0);

    let (_, filtered) = send(&app, get_request("/api/v1/candidates?position=GeneralSecretary", None)).await;
    assert_eq!(names(&filtered, "name"), vec!["Shirin"]);
    assert!(filtered["data"][0].get("vote_count").is_none());

    let (status, voters) = send(
        &app,
        get_request(&format!("/api/v1/candidates/{}/voters", president_id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = voters
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["voter_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["uid-1", "uid-2"]);

    let (status, _) = send(&app, get_request("/api/v1/candidates/missing/voters", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mission_set_and_read() {
    let app = test_app();
    let token = admin_token(&app).await;

    let (status, _) = send(&app, get_request("/api/v1/mission", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body = json!({
        "mission": "Serve the community",
        "vision": "No one left behind",
        "values": ["Integrity", "Compassion"]
    });
    let (status, saved) = send(&app, json_request(Method::PUT, "/api/v1/mission", Some(&token), body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["mission"], "Serve the community");

    let (status, fetched) = send(&app, get_request("/api/v1/mission", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["values"], json!(["Integrity", "Compassion"]));

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/v1/mission",
            Some(&token),
            json!({ "mission": "", "vision": "x" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_display_settings_live_in_memory() {
    let app = test_app();

    let (status, settings) = send(&app, get_request("/api/v1/settings", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["display_name"], "BPJP");

    let member = member_token(&app).await;
    let (status, _) = send(
        &app,
        json_request(Method::PATCH, "/api/v1/settings", Some(&member), json!({ "display_name": "Mine" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = admin_token(&app).await;
    let (status, updated) = send(
        &app,
        json_request(
            Method::PATCH,
            "/api/v1/settings",
            Some(&admin),
            json!({ "display_name": "BPJP Dhaka" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["display_name"], "BPJP Dhaka");

    let (_, settings) = send(&app, get_request("/api/v1/settings", None)).await;
    assert_eq!(settings["display_name"], "BPJP Dhaka");

    let (status, _) = send(
        &app,
        json_request(Method::PATCH, "/api/v1/settings", Some(&admin), json!({ "display_name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
