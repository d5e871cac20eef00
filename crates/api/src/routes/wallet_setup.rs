//! Wallet setup routes.
//!
//! Every handler requires a live session; the caller only ever sees and
//! changes their own active setup.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use database::{wallet_setup, WalletSetup};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// Response to a successful save.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub message: &'static str,
    pub wallet_setup: WalletSetup,
}

/// Response to a delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// Get the caller's active setup, or the empty setup if there is none.
pub async fn get_setup(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<WalletSetup>> {
    let setup = wallet_setup::get_active_setup(state.db.pool(), &caller.user_id)
        .await?
        .map(|record| record.setup)
        .unwrap_or_default();

    Ok(Json(setup))
}

/// Validate and store the caller's setup, replacing any active one.
///
/// Beneficiaries submitted without an id are assigned one. The main wallet
/// becomes the wallet linked to the account. Bodies that are not a wallet
/// setup are rejected with 400 like any other invalid input.
pub async fn save_setup(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: std::result::Result<Json<WalletSetup>, JsonRejection>,
) -> Result<Json<SaveResponse>> {
    let Json(mut setup) = payload?;
    for beneficiary in &mut setup.beneficiaries {
        if beneficiary.id.trim().is_empty() {
            beneficiary.id = Uuid::new_v4().to_string();
        }
    }

    let record = wallet_setup::save_active_setup(state.db.pool(), &caller.user_id, &setup).await?;

    info!(
        user_id = %caller.user_id,
        beneficiaries = record.setup.beneficiaries.len(),
        "Wallet setup saved"
    );

    Ok(Json(SaveResponse {
        message: "Wallet setup saved successfully",
        wallet_setup: record.setup,
    }))
}

/// Deactivate the caller's setup. Succeeds when there is nothing to deactivate.
pub async fn delete_setup(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<DeleteResponse>> {
    let deactivated = wallet_setup::deactivate_setup(state.db.pool(), &caller.user_id).await?;
    info!(user_id = %caller.user_id, deactivated, "Wallet setup deactivated");

    Ok(Json(DeleteResponse {
        message: "Wallet setup deactivated successfully",
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use database::{session, wallet_setup, Session};
    use serde_json::{json, Value};

    use crate::auth::hash_token;
    use crate::test_support::{register, send, send_raw, test_app_with_state};

    fn setup_body(shares: &[u32]) -> Value {
        let beneficiaries: Vec<Value> = shares
            .iter()
            .enumerate()
            .map(|(i, pct)| {
                json!({
                    "id": format!("b{}", i),
                    "name": format!("Heir {}", i),
                    "walletAddress": "0x52908400098527886E0F7030069857D2E4169EE7",
                    "percentage": pct,
                })
            })
            .collect();

        json!({
            "mainWallet": "0x8617E340B3D01FA5F11F306F4090FD50E238070D",
            "beneficiaries": beneficiaries,
            "backupWallet": "",
        })
    }

    #[tokio::test]
    async fn test_get_without_setup_returns_empty_default() {
        let (app, _state) = test_app_with_state().await;
        let token = register(&app, "ada@example.com").await;

        let (status, body) = send(&app, "GET", "/api/wallet-setup", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"mainWallet": "", "beneficiaries": [], "backupWallet": ""})
        );
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips() {
        let (app, _state) = test_app_with_state().await;
        let token = register(&app, "ada@example.com").await;

        let mut submitted = setup_body(&[60, 40]);
        submitted["backupWallet"] = json!("0x00000000219ab540356cBB839Cbe05303d7705Fa");
        submitted["beneficiaries"][0]["email"] = json!("heir@example.com");
        submitted["beneficiaries"][1]["phone"] = json!("+15550100");

        let (status, body) = send(
            &app,
            "POST",
            "/api/wallet-setup",
            Some(&token),
            Some(submitted.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Wallet setup saved successfully");
        assert_eq!(body["walletSetup"], submitted);

        let (status, body) = send(&app, "GET", "/api/wallet-setup", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, submitted);

        let (_, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(me["walletAddress"], submitted["mainWallet"]);
    }

    #[tokio::test]
    async fn test_save_assigns_missing_beneficiary_ids() {
        let (app, _state) = test_app_with_state().await;
        let token = register(&app, "ada@example.com").await;

        let mut submitted = setup_body(&[100]);
        submitted["beneficiaries"][0]["id"] = json!("");

        let (status, body) =
            send(&app, "POST", "/api/wallet-setup", Some(&token), Some(submitted)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["walletSetup"]["beneficiaries"][0]["id"]
            .as_str()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_setups() {
        let (app, state) = test_app_with_state().await;
        let token = register(&app, "ada@example.com").await;

        let mut no_wallet = setup_body(&[100]);
        no_wallet["mainWallet"] = json!("");

        for (payload, message) in [
            (no_wallet, "Main wallet address is required"),
            (setup_body(&[]), "At least one beneficiary is required"),
            (setup_body(&[50, 49]), "Beneficiaries percentages must total 100%"),
            (setup_body(&[51, 50]), "Beneficiaries percentages must total 100%"),
        ] {
            let (status, body) =
                send(&app, "POST", "/api/wallet-setup", Some(&token), Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], message);
        }

        let (_, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
        let setups = wallet_setup::list_setups(state.db.pool(), me["id"].as_str().unwrap())
            .await
            .unwrap();
        assert!(setups.is_empty());
    }

    #[tokio::test]
    async fn test_null_beneficiaries_is_a_validation_error() {
        let (app, _state) = test_app_with_state().await;
        let token = register(&app, "ada@example.com").await;

        let mut payload = setup_body(&[]);
        payload["beneficiaries"] = Value::Null;

        let (status, body) =
            send(&app, "POST", "/api/wallet-setup", Some(&token), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "At least one beneficiary is required");
    }

    #[tokio::test]
    async fn test_non_whole_percentages_are_rejected() {
        let (app, _state) = test_app_with_state().await;
        let token = register(&app, "ada@example.com").await;

        for shares in [json!([50.5, 49.5]), json!([-5, 105])] {
            let mut payload = setup_body(&[50, 50]);
            payload["beneficiaries"][0]["percentage"] = shares[0].clone();
            payload["beneficiaries"][1]["percentage"] = shares[1].clone();

            let (status, body) =
                send(&app, "POST", "/api/wallet-setup", Some(&token), Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let message = body["error"].as_str().unwrap();
            assert!(message.contains("whole number"), "got: {}", message);
        }
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_json_errors() {
        let (app, state) = test_app_with_state().await;
        let token = register(&app, "ada@example.com").await;

        for (content_type, payload) in [
            (Some("application/json"), "{not json"),
            (Some("application/json"), r#"{"beneficiaries": "everyone"}"#),
            (Some("text/plain"), "mainWallet=0x1"),
            (None, ""),
        ] {
            let (status, body) = send_raw(
                &app,
                "POST",
                "/api/wallet-setup",
                Some(&token),
                content_type,
                payload.to_string(),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", payload);
            assert!(body["error"].is_string(), "body: {}", payload);
        }

        let (_, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
        let setups = wallet_setup::list_setups(state.db.pool(), me["id"].as_str().unwrap())
            .await
            .unwrap();
        assert!(setups.is_empty());
    }

    #[tokio::test]
    async fn test_delete_soft_deletes() {
        let (app, state) = test_app_with_state().await;
        let token = register(&app, "ada@example.com").await;

        // Deleting with nothing saved still succeeds
        let (status, body) = send(&app, "DELETE", "/api/wallet-setup", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Wallet setup deactivated successfully");

        send(&app, "POST", "/api/wallet-setup", Some(&token), Some(setup_body(&[100]))).await;
        let (status, _) = send(&app, "DELETE", "/api/wallet-setup", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/api/wallet-setup", Some(&token), None).await;
        assert_eq!(body["mainWallet"], "");

        let (_, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
        let setups = wallet_setup::list_setups(state.db.pool(), me["id"].as_str().unwrap())
            .await
            .unwrap();
        assert_eq!(setups.len(), 1);
        assert!(!setups[0].is_active);
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let (app, _state) = test_app_with_state().await;

        for (method, body) in [
            ("GET", None),
            ("POST", Some(setup_body(&[100]))),
            ("DELETE", None),
        ] {
            let (status, response) = send(&app, method, "/api/wallet-setup", None, body).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(response, json!({"error": "Unauthorized"}));
        }

        let (status, _) = send(&app, "GET", "/api/wallet-setup", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let (app, state) = test_app_with_state().await;
        register(&app, "ada@example.com").await;

        let (_, login) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "correct horse"})),
        )
        .await;
        let user_id = login["user"]["id"].as_str().unwrap().to_string();

        let stale = "a".repeat(64);
        let now = Utc::now().timestamp();
        session::create_session(
            state.db.pool(),
            &Session {
                token_hash: hash_token(&stale),
                user_id,
                created_at: now - 7_200,
                expires_at: now - 3_600,
            },
        )
        .await
        .unwrap();

        let (status, _) = send(&app, "GET", "/api/wallet-setup", Some(&stale), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_setups_are_isolated_between_users() {
        let (app, _state) = test_app_with_state().await;
        let ada = register(&app, "ada@example.com").await;
        let bob = register(&app, "bob@example.com").await;

        send(&app, "POST", "/api/wallet-setup", Some(&ada), Some(setup_body(&[100]))).await;

        let (_, body) = send(&app, "GET", "/api/wallet-setup", Some(&bob), None).await;
        assert_eq!(body["beneficiaries"], json!([]));
    }
}
