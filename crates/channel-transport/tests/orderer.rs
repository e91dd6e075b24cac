//! Submission tests against the in-memory orderer and the frame server

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use channel_core::{
    extract_channel_config, BroadcastResponse, Certificate, ChannelConfigUpdate, ChannelError,
    ConfigTxEnvelope, ConfigUpdate, Identity, MspId, OrdererProfile, PolicyPrincipal, PolicySpec,
    Role,
};
use channel_signature::{sign_config, ChannelCreateRequest, IdentityContext, KeyMaterial};
use channel_transport::{
    frame, serve, MemoryOrderer, NetworkOrderer, OrdererSubmitter, OrderingService,
    TransportConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

fn admin(msp: &str, seed: u8) -> IdentityContext {
    let key = KeyMaterial::from_secret_bytes(&[seed; 32]);
    let identity = Identity::new(
        MspId::new(msp),
        Role::Admin,
        Certificate::new(format!("Admin@{msp}"), key.public_key()),
    );
    IdentityContext::new(identity, key)
}

fn org1() -> IdentityContext {
    admin("Org1MSP", 1)
}

fn org2() -> IdentityContext {
    admin("Org2MSP", 2)
}

fn orderer_admin() -> IdentityContext {
    admin("OrdererMSP", 3)
}

fn config(channel: &str) -> ChannelConfigUpdate {
    let bytes = ConfigUpdate {
        channel_id: channel.to_string(),
        ..Default::default()
    }
    .encode()
    .unwrap();
    extract_channel_config(&ConfigTxEnvelope::wrap(channel, bytes).encode().unwrap()).unwrap()
}

fn nested_policy() -> PolicySpec {
    PolicySpec::from_json_str(
        r#"{
            "identities": [
                {"role": {"name": "admin", "mspId": "Org1MSP"}},
                {"role": {"name": "admin", "mspId": "Org2MSP"}},
                {"role": {"name": "admin", "mspId": "OrdererMSP"}}
            ],
            "policy": {"2-of": [
                {"1-of": [{"signed-by": 0}, {"signed-by": 1}]},
                {"signed-by": 2}
            ]}
        }"#,
    )
    .unwrap()
}

fn profile(url: String) -> OrdererProfile {
    OrdererProfile {
        url,
        msp_id: MspId::new("OrdererMSP"),
        tls_cacerts: None,
        server_hostname: None,
    }
}

fn request(channel: &str, signers: &[IdentityContext], url: String) -> ChannelCreateRequest {
    request_with(channel, signers, url, false)
}

fn request_with(
    channel: &str,
    signers: &[IdentityContext],
    url: String,
    duplicate_signatures: bool,
) -> ChannelCreateRequest {
    let config = config(channel);
    let records: Vec<_> = signers
        .iter()
        .map(|ctx| sign_config(&config, ctx).unwrap())
        .collect();

    ChannelCreateRequest::builder()
        .config(config)
        .signatures(records)
        .channel_name(channel)
        .orderer(profile(url))
        .duplicate_signatures(duplicate_signatures)
        .build(&orderer_admin())
        .unwrap()
}

async fn spawn_server(service: Arc<OrderingService>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, service));
    format!("tcp://{addr}")
}

#[tokio::test]
async fn memory_orderer_accepts_three_signers() {
    let orderer = MemoryOrderer::new(nested_policy());
    let request = request(
        "mychannel",
        &[org1(), org2(), orderer_admin()],
        "tcp://127.0.0.1:7050".into(),
    );

    let result = orderer.submit(&request).await.unwrap();
    assert!(result.is_success());
    assert!(orderer.service().channel_exists("mychannel").await);
    assert_eq!(
        orderer.service().creating_transaction("mychannel").await,
        Some(request.tx_id().clone())
    );
    assert_eq!(orderer.submissions(), 1);
}

#[tokio::test]
async fn duplicate_transaction_id_is_rejected() {
    let orderer = MemoryOrderer::new(nested_policy());
    let request = request(
        "mychannel",
        &[org1(), orderer_admin()],
        "tcp://127.0.0.1:7050".into(),
    );

    assert!(orderer.submit(&request).await.unwrap().is_success());
    let err = orderer.submit(&request).await.unwrap_err();
    assert_matches!(err, ChannelError::Server { status, .. } if status == "DUPLICATE_TXID");
}

#[tokio::test]
async fn existing_channel_is_conflict() {
    let orderer = MemoryOrderer::new(nested_policy());
    orderer.service().insert_existing_channel("mychannel").await;

    let request = request(
        "mychannel",
        &[org1(), orderer_admin()],
        "tcp://127.0.0.1:7050".into(),
    );
    let err = orderer.submit(&request).await.unwrap_err();
    assert_matches!(err, ChannelError::Server { status, .. } if status == "CONFLICT");
}

#[tokio::test]
async fn insufficient_signers_are_forbidden() {
    let orderer = MemoryOrderer::new(nested_policy());
    let request = request("mychannel", &[org1(), org2()], "tcp://127.0.0.1:7050".into());

    let err = orderer.submit(&request).await.unwrap_err();
    assert_matches!(err, ChannelError::Policy { .. });
    assert!(!orderer.service().channel_exists("mychannel").await);
}

#[tokio::test]
async fn repeated_signatures_count_once() {
    let policy = PolicySpec::threshold(
        2,
        vec![
            PolicyPrincipal::new(Role::Admin, "Org1MSP"),
            PolicyPrincipal::new(Role::Admin, "Org2MSP"),
        ],
    )
    .unwrap();
    let orderer = MemoryOrderer::new(policy);
    let request = request_with("mychannel", &[org1()], "tcp://127.0.0.1:7050".into(), true);
    assert_eq!(request.signatures().len(), 2);

    let err = orderer.submit(&request).await.unwrap_err();
    assert_matches!(err, ChannelError::Policy { .. });
}

#[tokio::test]
async fn one_admin_cannot_cover_member_and_admin_principals() {
    let policy = PolicySpec::threshold(
        2,
        vec![
            PolicyPrincipal::new(Role::Member, "Org1MSP"),
            PolicyPrincipal::new(Role::Admin, "Org1MSP"),
        ],
    )
    .unwrap();
    let orderer = MemoryOrderer::new(policy);

    let single = request("mychannel", &[org1()], "tcp://127.0.0.1:7050".into());
    assert_eq!(single.signatures().len(), 1);
    let err = orderer.submit(&single).await.unwrap_err();
    assert_matches!(err, ChannelError::Policy { .. });
    assert!(!orderer.service().channel_exists("mychannel").await);

    let second_admin = admin("Org1MSP", 4);
    let both = request("mychannel", &[org1(), second_admin], "tcp://127.0.0.1:7050".into());
    assert!(orderer.submit(&both).await.unwrap().is_success());
}

#[tokio::test]
async fn repeated_signed_by_leaf_needs_distinct_signers() {
    let policy = PolicySpec::from_json_str(
        r#"{
            "identities": [{"role": {"name": "admin", "mspId": "Org1MSP"}}],
            "policy": {"2-of": [{"signed-by": 0}, {"signed-by": 0}]}
        }"#,
    )
    .unwrap();
    let orderer = MemoryOrderer::new(policy);

    let doubled = request_with("mychannel", &[org1()], "tcp://127.0.0.1:7050".into(), true);
    let err = orderer.submit(&doubled).await.unwrap_err();
    assert_matches!(err, ChannelError::Policy { .. });

    let two_admins = request(
        "mychannel",
        &[org1(), admin("Org1MSP", 4)],
        "tcp://127.0.0.1:7050".into(),
    );
    assert!(orderer.submit(&two_admins).await.unwrap().is_success());
}

#[tokio::test]
async fn network_orderer_round_trip_through_frame_server() {
    let service = Arc::new(OrderingService::new(nested_policy()));
    let url = spawn_server(Arc::clone(&service)).await;

    let orderer = NetworkOrderer::new(TransportConfig::testing()).unwrap();
    let first = request("mychannel", &[org1(), org2(), orderer_admin()], url.clone());
    assert!(orderer.submit(&first).await.unwrap().is_success());
    assert!(service.channel_exists("mychannel").await);

    let again = request("mychannel", &[org1(), orderer_admin()], url);
    let err = orderer.submit(&again).await.unwrap_err();
    assert_matches!(err, ChannelError::Server { status, .. } if status == "CONFLICT");
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let orderer = NetworkOrderer::new(TransportConfig::testing()).unwrap();
    let request = request(
        "mychannel",
        &[org1(), orderer_admin()],
        format!("tcp://{addr}"),
    );

    let err = orderer.submit(&request).await.unwrap_err();
    assert_matches!(err, ChannelError::Transport { .. });
}

#[tokio::test]
async fn silent_orderer_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(stream);
    });

    let config = TransportConfig {
        submit_timeout: Duration::from_millis(200),
        ..TransportConfig::testing()
    };
    let orderer = NetworkOrderer::new(config).unwrap();
    let request = request(
        "mychannel",
        &[org1(), orderer_admin()],
        format!("tcp://{addr}"),
    );

    let err = orderer.submit(&request).await.unwrap_err();
    assert_matches!(err, ChannelError::Timeout { .. });
}

#[tokio::test]
async fn unreadable_response_is_server_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _: channel_core::BroadcastEnvelope =
            frame::read_frame(&mut stream, frame::DEFAULT_MAX_FRAME_SIZE)
                .await
                .unwrap();
        frame::write_frame(&mut stream, &serde_json::json!({ "unexpected": true }))
            .await
            .unwrap();
    });

    let orderer = NetworkOrderer::new(TransportConfig::testing()).unwrap();
    let request = request(
        "mychannel",
        &[org1(), orderer_admin()],
        format!("tcp://{addr}"),
    );

    let err = orderer.submit(&request).await.unwrap_err();
    assert_matches!(err, ChannelError::Server { status, .. } if status == "MALFORMED_RESPONSE");
}

#[tokio::test]
async fn unknown_status_is_server_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _: channel_core::BroadcastEnvelope =
            frame::read_frame(&mut stream, frame::DEFAULT_MAX_FRAME_SIZE)
                .await
                .unwrap();
        let response: BroadcastResponse =
            serde_json::from_str(r#"{"status":"NOT_FOUND","info":"gone"}"#).unwrap();
        frame::write_frame(&mut stream, &response).await.unwrap();
    });

    let orderer = NetworkOrderer::new(TransportConfig::testing()).unwrap();
    let request = request(
        "mychannel",
        &[org1(), orderer_admin()],
        format!("tcp://{addr}"),
    );

    let err = orderer.submit(&request).await.unwrap_err();
    assert_matches!(err, ChannelError::Server { status, .. } if status == "UNKNOWN");
}

#[tokio::test]
async fn tls_endpoint_without_trust_root_is_config_error() {
    let orderer = NetworkOrderer::new(TransportConfig::testing()).unwrap();
    let request = request(
        "mychannel",
        &[org1(), orderer_admin()],
        "tls://127.0.0.1:7050".into(),
    );

    let err = orderer.submit(&request).await.unwrap_err();
    assert_matches!(err, ChannelError::Config { .. });
}
