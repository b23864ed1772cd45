use crate::config::TurnConfig;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{info, warn};
use turn::auth::{AuthHandler, generate_auth_key};
use turn::relay::relay_static::RelayAddressGeneratorStatic;
use turn::server::Server;
use turn::server::config::{ConnConfig, ServerConfig};
use webrtc::util::vnet::net::Net;

/// Accepts exactly the one static username/password pair from [`TurnConfig`].
struct StaticAuthHandler {
    username: String,
    key: Vec<u8>,
}

impl AuthHandler for StaticAuthHandler {
    fn auth_handle(
        &self,
        username: &str,
        _realm: &str,
        src_addr: SocketAddr,
    ) -> Result<Vec<u8>, turn::Error> {
        if username != self.username {
            warn!("TURN auth rejected for '{}' from {}", username, src_addr);
            return Err(turn::Error::Other(format!("unknown user {}", username)));
        }
        Ok(self.key.clone())
    }
}

/// TURN server sharing the process with the signaling relay.
pub struct TurnRelay {
    server: Server,
}

impl TurnRelay {
    pub async fn start(config: &TurnConfig) -> Result<Self> {
        let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let conn = Arc::new(
            UdpSocket::bind(bind_addr)
                .await
                .with_context(|| format!("Failed to bind TURN socket {}", bind_addr))?,
        );

        let auth_handler = StaticAuthHandler {
            username: config.username.clone(),
            key: generate_auth_key(&config.username, &config.realm, &config.password),
        };

        let server = Server::new(ServerConfig {
            conn_configs: vec![ConnConfig {
                conn,
                relay_addr_generator: Box::new(RelayAddressGeneratorStatic {
                    relay_address: config.public_ip,
                    address: "0.0.0.0".to_owned(),
                    net: Arc::new(Net::new(None)),
                }),
            }],
            realm: config.realm.clone(),
            auth_handler: Arc::new(auth_handler),
            channel_bind_timeout: Duration::from_secs(0),
            alloc_close_notify: None,
        })
        .await
        .context("Failed to start TURN server")?;

        info!("TURN server listening on {}", config.url());
        Ok(Self { server })
    }

    pub async fn close(self) -> Result<()> {
        self.server
            .close()
            .await
            .context("Failed to stop TURN server")
    }
}
