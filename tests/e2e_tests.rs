//! End-to-end scenarios driven through a real bound socket: a WebSocket
//! client for room events and `reqwest` for the REST control plane,
//! against a server backed by the in-memory store.

mod test_helpers;

use serde_json::json;
use test_helpers::{recv_event, send_event, spawn_app, spawn_app_fast_timers};

async fn create_room(server: &test_helpers::TestServer, client: &reqwest::Client, max_players: u8) -> String {
    let resp = client
        .post(server.http_url("/game/"))
        .json(&json!({ "max_players": max_players }))
        .send()
        .await
        .expect("create room request failed");
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("room response was not JSON");
    body["room_id"].as_str().expect("missing room_id").to_string()
}

#[tokio::test]
async fn seat_occupancy_round_trip() {
    let server = spawn_app().await;
    let client = reqwest::Client::new();
    let room = create_room(&server, &client, 4).await;

    let mut alice = server.connect(&room, "alice").await;
    let _ = recv_event(&mut alice, "player_connected").await;

    send_event(
        &mut alice,
        "seat_change",
        json!({ "seat_layout": ["alice", "empty", "empty", "empty"] }),
    )
    .await;
    let frame = recv_event(&mut alice, "seat_change").await;
    assert_eq!(
        frame["data"]["seat_layout"],
        json!(["alice", "empty", "empty", "empty"])
    );

    let resp = client
        .get(server.http_url(&format!("/game/{room}")))
        .send()
        .await
        .expect("get room request failed");
    let room_doc: serde_json::Value = resp.json().await.expect("room body was not JSON");
    assert_eq!(
        room_doc["seat_layout"],
        json!(["alice", "empty", "empty", "empty"])
    );
}

#[tokio::test]
async fn dice_prompt_resolves_on_roll() {
    let server = spawn_app_fast_timers().await;
    let client = reqwest::Client::new();
    let room = create_room(&server, &client, 4).await;

    let mut dm = server.connect(&room, "dm").await;
    let _ = recv_event(&mut dm, "player_connected").await;
    let mut bob = server.connect(&room, "bob").await;
    let _ = recv_event(&mut dm, "player_connected").await;
    let _ = recv_event(&mut bob, "player_connected").await;

    send_event(
        &mut dm,
        "dice_prompt",
        json!({ "promptedPlayer": "bob", "rollType": "dexterity save", "promptId": "p1" }),
    )
    .await;
    let prompt = recv_event(&mut bob, "dice_prompt").await;
    assert_eq!(prompt["data"]["prompt_id"], "p1");
    assert_eq!(prompt["data"]["prompted_player"], "bob");

    send_event(
        &mut bob,
        "dice_roll",
        json!({
            "player": "bob",
            "diceNotation": "1d20",
            "results": [17],
            "modifier": 2,
            "total": 19,
            "promptId": "p1",
        }),
    )
    .await;

    let roll = recv_event(&mut bob, "dice_roll").await;
    assert_eq!(roll["data"]["total"], 19);
    assert_eq!(roll["data"]["prompt_id"], "p1");

    let removal = recv_event(&mut bob, "adventure_log_removed").await;
    assert_eq!(removal["data"]["prompt_id"], "p1");

    let clear = recv_event(&mut bob, "dice_prompt_clear").await;
    assert_eq!(clear["data"]["prompt_id"], "p1");
    assert_eq!(clear["data"]["auto_cleared"], true);
}

#[tokio::test]
async fn reconnect_within_grace_skips_duplicate_connect_log() {
    let server = spawn_app().await;
    let client = reqwest::Client::new();
    let room = create_room(&server, &client, 2).await;

    let mut alice = server.connect(&room, "alice").await;
    let _ = recv_event(&mut alice, "player_connected").await;
    drop(alice);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let mut alice_again = server.connect(&room, "alice").await;
    // A reconnect within the grace window does not re-announce
    // player_connected; confirm the socket is otherwise live by round
    // tripping a seat_change.
    send_event(
        &mut alice_again,
        "seat_change",
        json!({ "seat_layout": ["alice", "empty"] }),
    )
    .await;
    let frame = recv_event(&mut alice_again, "seat_change").await;
    assert_eq!(frame["data"]["seat_layout"], json!(["alice", "empty"]));

    let resp = client
        .get(server.http_url(&format!("/game/{room}/logs")))
        .send()
        .await
        .expect("get logs request failed");
    let body: serde_json::Value = resp.json().await.expect("logs body was not JSON");
    let connect_entries = body["logs"]
        .as_array()
        .expect("logs should be an array")
        .iter()
        .filter(|entry| entry["message"].as_str().unwrap_or_default().ends_with("connected"))
        .count();
    assert_eq!(
        connect_entries, 1,
        "reconnecting within grace should not log a second connect"
    );
}

#[tokio::test]
async fn remote_audio_batch_replays_into_audio_state() {
    let server = spawn_app().await;
    let client = reqwest::Client::new();
    let room = create_room(&server, &client, 2).await;

    let mut dm = server.connect(&room, "dm").await;
    let _ = recv_event(&mut dm, "player_connected").await;

    send_event(
        &mut dm,
        "remote_audio_batch",
        json!({
            "operations": [
                { "trackId": "ambience", "operation": "play", "filename": "tavern.mp3", "volume": 0.6, "looping": true },
                { "trackId": "stinger", "operation": "load", "filename": "crit.mp3" },
            ],
            "triggeredBy": "dm",
        }),
    )
    .await;

    let frame = recv_event(&mut dm, "remote_audio_batch").await;
    let audio_state = &frame["data"]["audio_state"];
    assert_eq!(audio_state["ambience"]["filename"], "tavern.mp3");
    assert_eq!(audio_state["ambience"]["looping"], true);
    assert_eq!(audio_state["stinger"]["filename"], "crit.mp3");

    let resp = client
        .get(server.http_url(&format!("/game/{room}")))
        .send()
        .await
        .expect("get room request failed");
    let room_doc: serde_json::Value = resp.json().await.expect("room body was not JSON");
    assert_eq!(room_doc["audio_state"]["ambience"]["filename"], "tavern.mp3");
}

#[tokio::test]
async fn remote_audio_resume_with_track_type_only_resumes_that_channel() {
    let server = spawn_app().await;
    let client = reqwest::Client::new();
    let room = create_room(&server, &client, 2).await;

    let mut dm = server.connect(&room, "dm").await;
    let _ = recv_event(&mut dm, "player_connected").await;

    send_event(
        &mut dm,
        "remote_audio_batch",
        json!({
            "operations": [
                { "trackId": "bgm", "operation": "play", "filename": "boss.mp3", "volume": 0.8, "looping": true },
                { "trackId": "sfx", "operation": "play", "filename": "thunder.mp3", "volume": 1.0, "looping": false },
            ],
            "triggeredBy": "dm",
        }),
    )
    .await;
    let _ = recv_event(&mut dm, "remote_audio_batch").await;

    send_event(
        &mut dm,
        "remote_audio_batch",
        json!({
            "operations": [
                { "trackId": "bgm", "operation": "pause" },
                { "trackId": "sfx", "operation": "pause" },
            ],
            "triggeredBy": "dm",
        }),
    )
    .await;
    let _ = recv_event(&mut dm, "remote_audio_batch").await;

    send_event(
        &mut dm,
        "remote_audio_resume",
        json!({ "trackType": "bgm", "triggeredBy": "dm" }),
    )
    .await;

    let frame = recv_event(&mut dm, "remote_audio_resume").await;
    assert_eq!(frame["data"]["tracks"], json!(["bgm"]));
    assert_eq!(frame["data"]["audio_state"]["bgm"]["playback_state"], "playing");
    assert_eq!(frame["data"]["audio_state"]["sfx"]["playback_state"], "paused");
}

#[tokio::test]
async fn map_reload_preserves_stored_grid_config() {
    let server = spawn_app().await;
    let client = reqwest::Client::new();
    let room = create_room(&server, &client, 2).await;

    let mut dm = server.connect(&room, "dm").await;
    let _ = recv_event(&mut dm, "player_connected").await;

    send_event(
        &mut dm,
        "map_load",
        json!({ "mapData": { "filename": "dungeon.png", "filePath": "/maps/dungeon.png" } }),
    )
    .await;
    let _ = recv_event(&mut dm, "map_load").await;

    send_event(
        &mut dm,
        "map_config_update",
        json!({
            "filename": "dungeon.png",
            "gridConfig": { "width": 40.0, "height": 30.0, "opacity": 0.5, "offset_x": 0.0, "offset_y": 0.0 },
        }),
    )
    .await;
    let configured = recv_event(&mut dm, "map_config_update").await;
    assert_eq!(configured["data"]["grid_config"]["width"], 40.0);

    send_event(&mut dm, "map_clear", json!({})).await;
    let _ = recv_event(&mut dm, "map_clear").await;

    send_event(
        &mut dm,
        "map_load",
        json!({ "mapData": { "filename": "dungeon.png", "filePath": "/maps/dungeon.png" } }),
    )
    .await;
    let reloaded = recv_event(&mut dm, "map_load").await;
    assert_eq!(reloaded["data"]["grid_config"]["width"], 40.0);
}

#[tokio::test]
async fn seat_reduction_displaces_out_of_bounds_players() {
    let server = spawn_app().await;
    let client = reqwest::Client::new();
    let room = create_room(&server, &client, 4).await;

    let mut carol = server.connect(&room, "carol").await;
    let _ = recv_event(&mut carol, "player_connected").await;
    let mut dan = server.connect(&room, "dan").await;
    let _ = recv_event(&mut carol, "player_connected").await;
    let _ = recv_event(&mut dan, "player_connected").await;

    send_event(
        &mut carol,
        "seat_change",
        json!({ "seat_layout": ["carol", "dan", "empty", "empty"] }),
    )
    .await;
    let _ = recv_event(&mut carol, "seat_change").await;
    let _ = recv_event(&mut dan, "seat_change").await;

    let resp = client
        .put(server.http_url(&format!("/game/{room}/seats")))
        .json(&json!({
            "max_players": 1,
            "displaced_players": [{ "player_name": "dan", "seat_id": 1 }],
        }))
        .send()
        .await
        .expect("update seat count request failed");
    assert_eq!(resp.status(), 200);
    let room_doc: serde_json::Value = resp.json().await.expect("seat count body was not JSON");
    assert_eq!(room_doc["seat_layout"], json!(["carol"]));

    let displaced = recv_event(&mut dan, "player_displaced").await;
    assert_eq!(displaced["data"]["player_name"], "dan");

    let seat_count_change = recv_event(&mut carol, "seat_count_change").await;
    assert_eq!(seat_count_change["data"]["max_players"], 1);
}
