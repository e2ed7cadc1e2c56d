mod common;

use std::collections::HashMap;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_test_app, create_test_app_with};

#[tokio::test]
async fn test_health_endpoints() {
    let app = create_test_app().await;

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");

    let (status, body) = app.get("/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/health/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "lexilist-backend");
    assert_eq!(body["activeStudySessions"], 0);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_test_app().await;
    let (status, body) = app.get("/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let app = create_test_app().await;

    let (status, body) = app.get("/api/lists", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/lists", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_logout() {
    let app = create_test_app().await;
    let token = app.register("Ana@Example.com").await;

    let (status, body) = app.get("/api/auth/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "ana@example.com");
    assert_eq!(body["data"]["user"]["progress"]["streak"], 0);

    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "ana@example.com", "password": "secret123", "displayName": "Again" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "bob@example.com", "password": "123", "displayName": "Bob" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ana@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ana@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let second = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = app.post("/api/auth/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/auth/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Other sessions survive a logout.
    let (status, _) = app.get("/api/auth/verify", Some(&second)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_profile_update() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;

    let (status, body) = app
        .put("/api/users/me", Some(&token), json!({ "displayName": "  Ana  " }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["displayName"], "Ana");

    let (status, _) = app
        .put("/api/users/me", Some(&token), json!({ "displayName": "x".repeat(51) }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_crud_and_ownership() {
    let app = create_test_app().await;
    let ana = app.register("ana@example.com").await;
    let bob = app.register("bob@example.com").await;

    let (status, _) = app.post("/api/lists", Some(&ana), json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/lists",
            Some(&ana),
            json!({ "name": "French Basics", "description": "Everyday words" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let list_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["language"], "English");
    assert_eq!(body["data"]["wordCount"], 0);

    let (status, _) = app.get(&format!("/api/lists/{list_id}"), Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/api/lists/{list_id}"), Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .put(
            &format!("/api/lists/{list_id}"),
            Some(&ana),
            json!({ "name": "French A1", "language": "French" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "French A1");
    assert_eq!(body["data"]["description"], "Everyday words");

    let (_, body) = app.get("/api/lists", Some(&bob)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    let (_, body) = app.get("/api/lists", Some(&ana)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_words_keep_word_count_in_step() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;
    let list_id = app
        .seed_list(&token, "Fruit", &[("pomme", "apple"), ("poire", "pear")])
        .await;

    let (_, body) = app.get(&format!("/api/lists/{list_id}"), Some(&token)).await;
    assert_eq!(body["data"]["wordCount"], 2);

    let (status, _) = app
        .post(
            &format!("/api/lists/{list_id}/words"),
            Some(&token),
            json!({ "word": "", "meaning": "nothing" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get(&format!("/api/lists/{list_id}/words"), Some(&token)).await;
    let words = body["data"].as_array().unwrap().clone();
    assert_eq!(words.len(), 2);
    let word_id = words[0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(
            &format!("/api/words/{word_id}"),
            Some(&token),
            json!({ "context": "Je mange une pomme" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["context"], "Je mange une pomme");

    let (status, _) = app
        .put(
            &format!("/api/words/{word_id}/progress"),
            Some(&token),
            json!({ "learned": true, "reviewCount": 1, "correctCount": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            &format!("/api/words/{word_id}/progress"),
            Some(&token),
            json!({ "learned": true, "reviewCount": 2, "correctCount": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["progress"]["learned"], true);

    let (status, _) = app.delete(&format!("/api/words/{word_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&format!("/api/lists/{list_id}"), Some(&token)).await;
    assert_eq!(body["data"]["wordCount"], 1);

    let (status, body) = app.delete(&format!("/api/lists/{list_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deletedWords"], 1);
    let (_, body) = app.get("/api/words", Some(&token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_learning_session_flow() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;
    let list_id = app
        .seed_list(&token, "Fruit", &[("pomme", "apple"), ("poire", "pear")])
        .await;

    let (status, body) = app
        .post(
            &format!("/api/lists/{list_id}/sessions"),
            Some(&token),
            json!({ "mode": "learning" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["current"]["kind"], "card");
    assert!(body["data"]["current"].get("meaning").is_none());

    let (status, body) = app
        .post(&format!("/api/sessions/{session_id}/reveal"), Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["current"]["meaning"].is_string());

    let (status, _) = app
        .get(&format!("/api/sessions/{session_id}/summary"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let answer = format!("/api/sessions/{session_id}/answer");
    let (status, body) = app.post(&answer, Some(&token), json!({ "kind": "know" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"]["newlyLearned"], true);
    assert_eq!(body["data"]["session"]["progressPercent"], 50);

    let (status, body) = app
        .post(&answer, Some(&token), json!({ "kind": "stillLearning" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["session"]["complete"], true);

    let (status, _) = app.post(&answer, Some(&token), json!({ "kind": "know" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .get(&format!("/api/sessions/{session_id}/summary"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], 1);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["percentage"], 50);

    let (_, body) = app.get(&format!("/api/lists/{list_id}"), Some(&token)).await;
    assert_eq!(body["data"]["progress"]["learnedWords"], 1);
    assert!(body["data"]["progress"]["lastStudied"].is_string());

    let (_, body) = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(body["data"]["progress"]["streak"], 1);

    let (status, body) = app
        .post(&format!("/api/sessions/{session_id}/restart"), Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["index"], 0);
    assert_eq!(body["data"]["score"], 0);

    let (status, _) = app.delete(&format!("/api/sessions/{session_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/sessions/{session_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quiz_session_flow() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;
    let pairs = [
        ("pomme", "apple"),
        ("poire", "pear"),
        ("fraise", "strawberry"),
        ("cerise", "cherry"),
        ("citron", "lemon"),
    ];
    let list_id = app.seed_list(&token, "Fruit", &pairs).await;
    let meanings: HashMap<&str, &str> = pairs.iter().copied().collect();

    let (status, body) = app
        .post(
            &format!("/api/lists/{list_id}/sessions"),
            Some(&token),
            json!({ "mode": "quiz" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = body["data"]["id"].as_str().unwrap().to_string();
    let total = body["data"]["total"].as_u64().unwrap();
    assert_eq!(total, 5);

    let answer = format!("/api/sessions/{session_id}/answer");
    let (status, _) = app.post(&answer, Some(&token), json!({ "kind": "know" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut current = body["data"]["current"].clone();
    for _ in 0..total {
        assert_eq!(current["kind"], "question");
        let options = current["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        let expected = meanings[current["word"].as_str().unwrap()];

        let (status, body) = app
            .post(&answer, Some(&token), json!({ "kind": "choose", "option": expected }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"]["correct"], true);
        current = body["data"]["session"]["current"].clone();
    }
    assert!(current.is_null());

    let (_, body) = app
        .get(&format!("/api/sessions/{session_id}/summary"), Some(&token))
        .await;
    assert_eq!(body["data"]["percentage"], 100);
    assert_eq!(body["data"]["tier"], "excellent");

    let (_, body) = app.get("/api/words", Some(&token)).await;
    for word in body["data"].as_array().unwrap() {
        assert_eq!(word["progress"]["reviewCount"], 1);
        assert_eq!(word["progress"]["correctCount"], 1);
        assert_eq!(word["progress"]["learned"], false);
    }
}

#[tokio::test]
async fn test_sessions_on_empty_or_foreign_lists() {
    let app = create_test_app().await;
    let ana = app.register("ana@example.com").await;
    let bob = app.register("bob@example.com").await;
    let empty = app.seed_list(&ana, "Empty", &[]).await;
    let full = app.seed_list(&ana, "Full", &[("pomme", "apple")]).await;

    let (status, _) = app
        .post(&format!("/api/lists/{empty}/sessions"), Some(&ana), json!({ "mode": "learning" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&format!("/api/lists/{full}/sessions"), Some(&bob), json!({ "mode": "voice" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(&format!("/api/lists/{full}/sessions"), Some(&ana), json!({ "mode": "voice" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.get(&format!("/api/sessions/{session_id}"), Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            &format!("/api/sessions/{session_id}/answer"),
            Some(&ana),
            json!({ "kind": "attempt" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"]["kind"], "recognition");
    assert_eq!(body["data"]["session"]["complete"], true);

    let (_, body) = app.get("/api/words", Some(&ana)).await;
    assert_eq!(body["data"][0]["progress"]["reviewCount"], 0);
}

#[tokio::test]
async fn test_search_and_recent_searches() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;
    app.seed_list(&token, "Fruit", &[("pomme", "apple"), ("poire", "pear")])
        .await;

    let (status, body) = app.get("/api/search?q=POM", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["type"], "word");
    assert_eq!(results[0]["listName"], "Fruit");
    assert_eq!(body["data"]["recentSearches"], json!(["pom"]));

    let (_, body) = app.get("/api/search?q=fruit&filter=words", Some(&token)).await;
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 0);

    let (_, body) = app.get("/api/search?q=", Some(&token)).await;
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["recentSearches"], json!(["fruit", "pom"]));

    let (status, _) = app.delete("/api/search/recent", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/search/recent", Some(&token)).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_settings_roundtrip_and_reset() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;

    let (_, body) = app.get("/api/settings", Some(&token)).await;
    assert_eq!(body["data"]["darkMode"], false);
    assert_eq!(body["data"]["soundEffects"], true);

    let (status, body) = app
        .put("/api/settings", Some(&token), json!({ "darkMode": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["darkMode"], true);
    assert_eq!(body["data"]["notifications"], true);

    app.get("/api/search?q=hello", Some(&token)).await;
    let (status, body) = app.delete("/api/settings", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["darkMode"], false);

    let (_, body) = app.get("/api/search/recent", Some(&token)).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_progress_overview() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;
    let list_id = app
        .seed_list(&token, "Fruit", &[("pomme", "apple"), ("poire", "pear")])
        .await;

    let (_, body) = app.get(&format!("/api/lists/{list_id}/words"), Some(&token)).await;
    let word_id = body["data"][0]["id"].as_str().unwrap().to_string();
    app.put(
        &format!("/api/words/{word_id}/progress"),
        Some(&token),
        json!({ "learned": true, "reviewCount": 1, "correctCount": 1 }),
    )
    .await;

    let (status, body) = app
        .post("/api/users/me/progress/sync", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["progress"]["totalWords"], 2);
    assert_eq!(body["data"]["progress"]["learnedWords"], 1);

    let (status, body) = app.get("/api/progress", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalWords"], 2);
    assert_eq!(body["data"]["lists"][0]["name"], "Fruit");
}

#[tokio::test]
async fn test_password_reset_revokes_sessions() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;

    let (status, body) = app
        .post("/api/auth/password/request", None, json!({ "email": "nobody@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let generic = body["message"].clone();
    assert!(app.email.sent().is_empty());

    let (status, body) = app
        .post("/api/auth/password/request", None, json!({ "email": "ana@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], generic);

    let sent = app.email.sent();
    assert_eq!(sent.len(), 1);
    let reset_token = sent[0]
        .body
        .split("token=")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap()
        .to_string();

    // A second request inside the cooldown sends nothing.
    app.post("/api/auth/password/request", None, json!({ "email": "ana@example.com" }))
        .await;
    assert_eq!(app.email.sent().len(), 1);

    let (status, _) = app
        .post(
            "/api/auth/password/reset",
            None,
            json!({ "token": "bogus", "newPassword": "newsecret" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/auth/password/reset",
            None,
            json!({ "token": reset_token, "newPassword": "newsecret" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/auth/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/auth/password/reset",
            None,
            json!({ "token": reset_token, "newPassword": "another1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ana@example.com", "password": "newsecret" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_voice_and_ar_session_flow() {
    let app = create_test_app_with(|config| config.recognition_success_rate = 1.0).await;
    let token = app.register("ana@example.com").await;
    let list_id = app
        .seed_list(&token, "Fruit", &[("pomme", "apple"), ("poire", "pear")])
        .await;

    for (mode, message) in [
        ("voice", "Excellent pronunciation!"),
        ("ar", "Excellent object recognition!"),
    ] {
        let (status, body) = app
            .post(&format!("/api/lists/{list_id}/sessions"), Some(&token), json!({ "mode": mode }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["current"]["kind"], "prompt");
        let session_id = body["data"]["id"].as_str().unwrap().to_string();
        let answer = format!("/api/sessions/{session_id}/answer");

        for _ in 0..2 {
            let (status, body) = app
                .post(
                    &answer,
                    Some(&token),
                    json!({ "kind": "attempt", "imageUri": "file:///photo.jpg" }),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            let outcome = &body["data"]["outcome"];
            assert_eq!(outcome["kind"], "recognition");
            assert_eq!(outcome["correct"], true);
            if mode == "ar" {
                assert_eq!(outcome["imageUri"], "file:///photo.jpg");
            } else {
                assert!(outcome.get("imageUri").is_none());
            }
        }

        let (status, body) = app
            .get(&format!("/api/sessions/{session_id}/summary"), Some(&token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["percentage"], 100);
        assert_eq!(body["data"]["message"], message);
    }

    let (_, body) = app.get("/api/words", Some(&token)).await;
    for word in body["data"].as_array().unwrap() {
        assert_eq!(word["progress"]["reviewCount"], 0);
        assert_eq!(word["progress"]["learned"], false);
    }

    let (_, body) = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(body["data"]["progress"]["streak"], 1);
}

#[tokio::test]
async fn test_failed_completion_write_leaves_session_retryable() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;
    let list_id = app.seed_list(&token, "Fruit", &[("pomme", "apple")]).await;

    let (_, body) = app
        .post(&format!("/api/lists/{list_id}/sessions"), Some(&token), json!({ "mode": "learning" }))
        .await;
    let session_id = body["data"]["id"].as_str().unwrap().to_string();
    let answer = format!("/api/sessions/{session_id}/answer");

    app.execute_sql(
        r#"CREATE TRIGGER "lists_read_only" BEFORE UPDATE ON "lists"
           BEGIN SELECT RAISE(ABORT, 'lists are read-only'); END"#,
    )
    .await;

    let (status, body) = app.post(&answer, Some(&token), json!({ "kind": "know" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);

    let (status, body) = app.get(&format!("/api/sessions/{session_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["index"], 0);
    assert_eq!(body["data"]["score"], 0);
    assert_eq!(body["data"]["complete"], false);

    app.execute_sql(r#"DROP TRIGGER "lists_read_only""#).await;

    let (status, body) = app.post(&answer, Some(&token), json!({ "kind": "know" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["session"]["complete"], true);
    assert_eq!(body["data"]["outcome"]["newlyLearned"], true);

    let (_, body) = app.get(&format!("/api/lists/{list_id}"), Some(&token)).await;
    assert_eq!(body["data"]["progress"]["learnedWords"], 1);
    assert!(body["data"]["progress"]["lastStudied"].is_string());

    let (_, body) = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(body["data"]["progress"]["streak"], 1);
}

#[tokio::test]
async fn test_invalid_search_filter_uses_error_envelope() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;

    let (status, body) = app.get("/api/search?q=pom&filter=everything", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_word_progress_refreshes_list_learned_count() {
    let app = create_test_app().await;
    let token = app.register("ana@example.com").await;
    let list_id = app
        .seed_list(&token, "Fruit", &[("pomme", "apple"), ("poire", "pear")])
        .await;

    let (_, body) = app.get(&format!("/api/lists/{list_id}/words"), Some(&token)).await;
    let word_id = body["data"][0]["id"].as_str().unwrap().to_string();
    let progress = format!("/api/words/{word_id}/progress");

    let (status, _) = app
        .put(&progress, Some(&token), json!({ "learned": true, "reviewCount": 1, "correctCount": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/progress", Some(&token)).await;
    assert_eq!(body["data"]["learnedWords"], 1);
    assert_eq!(body["data"]["percentage"], 50);

    app.put(&progress, Some(&token), json!({ "learned": false, "reviewCount": 1, "correctCount": 0 }))
        .await;
    let (_, body) = app.get(&format!("/api/lists/{list_id}"), Some(&token)).await;
    assert_eq!(body["data"]["progress"]["learnedWords"], 0);
}
