//! End-to-end failure injection tests over a real listener.

use std::time::Duration;

use resilience_demo::config::CALL_POLICY;
use resilience_demo_sdk::DemoClient;

mod common;
use common::{fast_config, set_instance, small_breaker, spawn_server};

#[tokio::test]
async fn test_retry_masks_odd_attempts() {
    let (addr, shutdown) = spawn_server(fast_config()).await;
    let client = DemoClient::new(&format!("http://{}", addr));

    for expected in (1..=8).map(|request| request * 2) {
        let reply = client.call_sync().await.expect("server unreachable");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, format!("✅ Success on attempt {}", expected));
        assert!(reply.request_id.is_some());
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_circuit_opens_then_probes_after_wait() {
    let mut config = fast_config();
    config.simulation.failure_probability = 1.0;
    set_instance(&mut config, CALL_POLICY, Some(small_breaker(200)), None);
    let (addr, shutdown) = spawn_server(config).await;
    let client = DemoClient::new(&format!("http://{}", addr));

    for _ in 0..4 {
        let reply = client.call().await.unwrap();
        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("Simulated failure in external service"));
    }

    let rejected = client.call().await.unwrap();
    assert_eq!(rejected.status, 200);
    assert!(rejected.body.contains("is OPEN"), "{}", rejected.body);

    let breakers = client.circuit_breakers().await.unwrap();
    let external = breakers.iter().find(|b| b.name == CALL_POLICY).unwrap();
    assert_eq!(external.state, "OPEN");

    // After the wait one trial call reaches the (still failing) dependency
    // and the circuit opens again.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let probe = client.call().await.unwrap();
    assert!(probe.body.contains("Simulated failure in external service"), "{}", probe.body);

    let again = client.call().await.unwrap();
    assert!(again.body.contains("is OPEN"), "{}", again.body);

    shutdown.trigger();
}

#[tokio::test]
async fn test_async_and_callback_styles() {
    let (addr, shutdown) = spawn_server(fast_config()).await;
    let client = DemoClient::new(&format!("http://{}", addr));

    let reply = client.call_async().await.unwrap();
    assert_eq!(reply.status, 200);
    assert!(
        reply.body.starts_with("🎉 SUCCESS callback in Service")
            || reply.body.starts_with("💥 ERROR callback in Service"),
        "{}",
        reply.body
    );

    let reply = tokio::time::timeout(Duration::from_secs(2), client.callback())
        .await
        .expect("callback answered within the delay window")
        .unwrap();
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains('✅') || reply.body.contains('❌'));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unprotected_endpoint_surfaces_errors() {
    let mut config = fast_config();
    config.simulation.failure_probability = 1.0;
    let (addr, shutdown) = spawn_server(config).await;
    let client = DemoClient::new(&format!("http://{}", addr));

    let reply = client.test().await.unwrap();
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, "Simulated failure in external service");

    let status = client.health().await.unwrap();
    assert_eq!(status.status, "operational");

    shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown_stops_accepting() {
    let (addr, shutdown) = spawn_server(fast_config()).await;
    let client = DemoClient::new(&format!("http://{}", addr));
    assert!(client.health().await.is_ok());

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(client.health().await.is_err(), "server should refuse new connections");
}
