use duet_core::IceServerConfig;
use duet_core::utils::default_ice_servers;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Process-wide relay configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// STUN/TURN servers advertised to every client in `ice-config`.
    pub ice_servers: Vec<IceServerConfig>,
    /// Embedded TURN server; advertised in addition to `ice_servers`.
    pub turn: Option<TurnConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            ice_servers: default_ice_servers(),
            turn: None,
        }
    }
}

impl ServerConfig {
    pub fn advertised_ice_servers(&self) -> Vec<IceServerConfig> {
        let mut servers = self.ice_servers.clone();
        if let Some(turn) = &self.turn {
            servers.push(turn.ice_server());
        }
        servers
    }
}

/// Static-credential TURN server hosted next to the relay.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Address clients reach the relay allocations on.
    pub public_ip: IpAddr,
    pub port: u16,
    pub realm: String,
    pub username: String,
    pub password: String,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            public_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3478,
            realm: "duet".to_owned(),
            username: "duet".to_owned(),
            password: "duet".to_owned(),
        }
    }
}

impl TurnConfig {
    pub fn url(&self) -> String {
        format!("turn:{}:{}?transport=udp", self.public_ip, self.port)
    }

    pub fn ice_server(&self) -> IceServerConfig {
        IceServerConfig::turn(self.url(), self.username.clone(), self.password.clone())
    }
}
