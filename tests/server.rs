mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::{failure_body, spawn_loop, success_body, wait_for, Reply, ScriptedSolver, FROZEN};
use n_pendulum_viewer::{server, AnimationHandle, RunPolicy};
use serde_json::{json, Value};

fn viewer(reply: Reply) -> AnimationHandle {
    spawn_loop(ScriptedSolver::new(vec![reply]), FROZEN, RunPolicy::LastArrival)
}

macro_rules! app {
    ($handle:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($handle.clone()))
                .configure(server::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_state_before_any_run() {
    let handle = viewer(Reply::ok(success_body(2, 5, 2.5)));
    let app = app!(handle);

    let req = test::TestRequest::get().uri("/state").to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state["state"], "idle");
    assert_eq!(state["chain_length"], 2);
    assert_eq!(state["loading"], false);
    assert_eq!(state["fields"]["fields"][0]["id"], "mass_1");
    assert_eq!(state["fields"]["fields"][2]["value"], 90.0);
    assert_eq!(state["viewport"]["width"], 400);
}

#[actix_web::test]
async fn test_run_then_toggle_and_frame() {
    let handle = viewer(Reply::ok(success_body(2, 5, 2.5)));
    let app = app!(handle);

    let req = test::TestRequest::post().uri("/run").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    wait_for(&handle, |s| s.n.is_some()).await;

    let req = test::TestRequest::post().uri("/toggle").to_request();
    let toggled: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(toggled, json!({"state": "paused", "run_requested": false}));

    let req = test::TestRequest::get().uri("/frame.png").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");
    let body = test::read_body(resp).await;
    assert!(body.starts_with(&[0x89, b'P', b'N', b'G']));

    let req = test::TestRequest::get().uri("/trajectory.png").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_trajectory_missing_before_run() {
    let handle = viewer(Reply::ok(failure_body("diverged")));
    let app = app!(handle);
    let req = test::TestRequest::get().uri("/trajectory.png").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_simulation_failure_surfaces_alert() {
    let handle = viewer(Reply::ok(failure_body("diverged")));
    let app = app!(handle);
    let req = test::TestRequest::post().uri("/run").to_request();
    test::call_service(&app, req).await;
    wait_for(&handle, |s| s.alert.is_some()).await;

    let req = test::TestRequest::get().uri("/state").to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert!(state["alert"].as_str().unwrap().contains("diverged"));
    assert_eq!(state["state"], "idle");
}

#[actix_web::test]
async fn test_form_routes() {
    let handle = viewer(Reply::ok(success_body(2, 5, 2.5)));
    let app = app!(handle);

    let req = test::TestRequest::put().uri("/chain-length").set_json(json!({"n": 4})).to_request();
    let fields: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fields["fields"].as_array().unwrap().len(), 12);

    let req = test::TestRequest::put().uri("/fields/angle_4").set_json(json!({"value": 12.5})).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::put().uri("/fields/angle_5").set_json(json!({"value": 1.0})).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put().uri("/fields/mass_1").set_json(json!({"value": -1.0})).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::put().uri("/chain-length").set_json(json!({"n": 0})).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::put()
        .uri("/chain-length")
        .set_json(json!({"n": u64::MAX / 2}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post().uri("/resize").set_json(json!({"width": 40000})).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let state = handle.snapshot().await.unwrap();
    assert_eq!(state.chain_length, 4);
}

#[actix_web::test]
async fn test_reset_and_resize_routes() {
    let handle = viewer(Reply::ok(success_body(2, 5, 2.5)));
    let app = app!(handle);

    let req = test::TestRequest::post().uri("/resize").set_json(json!({"width": 320})).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    let req = test::TestRequest::post().uri("/reset").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let state = handle.snapshot().await.unwrap();
    assert_eq!(state.viewport.width, 320);
    assert_eq!(state.viewport.height, 320);
    assert_eq!(state.frame_index, 0);
}
