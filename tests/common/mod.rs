//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use slice_api::config::{AccountConfig, ServiceConfig};
use slice_api::gateway::Gateway;
use slice_api::lifecycle::{Services, Shutdown};

pub const TOKEN: &str = "token-ada";
pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "hunter2";

/// A service bound to an ephemeral loopback port.
pub struct TestService {
    pub addr: SocketAddr,
    pub gateway: Arc<Gateway>,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config with two seeded accounts; `ada` holds [`TOKEN`].
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.accounts = vec![
        AccountConfig {
            id: "1".into(),
            username: "ada".into(),
            email: Some(EMAIL.into()),
            password: PASSWORD.into(),
            tokens: vec![TOKEN.into()],
            verification_tokens: vec!["verify-ada".into()],
            ..AccountConfig::default()
        },
        AccountConfig {
            id: "2".into(),
            username: "grace".into(),
            email: Some("grace@example.com".into()),
            password: "cobol".into(),
            tokens: vec!["token-grace".into()],
            ..AccountConfig::default()
        },
    ];
    config
}

/// Build the services and serve them until the returned handle drops.
pub async fn start_service(config: ServiceConfig) -> TestService {
    let services = Services::build(&config).unwrap();
    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = services.http_server(&config);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(20)).await;

    TestService {
        addr,
        gateway: services.gateway.clone(),
        shutdown,
    }
}
