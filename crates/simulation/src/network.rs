// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket},
    path::PathBuf,
    time::{Duration, SystemTime},
};

use bevy::prelude::*;
use bevy_replicon::prelude::RepliconChannels;
use bevy_replicon_renet::{
    RenetChannelsExt,
    netcode::{
        ClientAuthentication, NetcodeClientTransport, NetcodeServerTransport, ServerAuthentication,
        ServerConfig,
    },
    renet::{ConnectionConfig, RenetClient, RenetServer},
};
use clap::{Parser, Subcommand};

const DEFAULT_PORT: u16 = 5000;
/// Netcode only pairs peers sharing this id: "corsa" in ASCII.
const PROTOCOL_ID: u64 = 0x636f_7273_61;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    Singleplayer,
    Server,
    Client,
}

/// A parkour movement playground.
#[derive(Parser, Debug, PartialEq, Resource)]
pub struct Cli {
    /// Parkour tunables in RON, in centimetre-scale units.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub role: Role,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq)]
pub enum Role {
    /// Play locally.
    Singleplayer,
    /// Create a server that acts as both player and host.
    Server {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Connect to a host.
    Client {
        #[arg(short, long, default_value_t = Ipv4Addr::LOCALHOST.into())]
        ip: IpAddr,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

impl Default for Cli {
    fn default() -> Self {
        Self::parse()
    }
}

pub fn init(
    commands: &mut Commands,
    cli: &Cli,
    channels: &RepliconChannels,
) -> Result<NetworkMode> {
    match cli.role {
        Role::Singleplayer => Ok(NetworkMode::Singleplayer),
        Role::Server { port } => {
            init_server(commands, channels, port)?;
            Ok(NetworkMode::Server)
        }
        Role::Client { ip, port } => {
            init_client(commands, channels, ip, port)?;
            Ok(NetworkMode::Client)
        }
    }
}

/// Clients a server accepts: one runner on the course besides the host.
const MAX_CLIENTS: usize = 1;

/// Netcode expects the time since the Unix epoch.
fn netcode_time() -> Result<Duration> {
    Ok(SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?)
}

fn init_server(commands: &mut Commands, channels: &RepliconChannels, port: u16) -> Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))?;
    let transport = NetcodeServerTransport::new(
        ServerConfig {
            current_time: netcode_time()?,
            max_clients: MAX_CLIENTS,
            protocol_id: PROTOCOL_ID,
            authentication: ServerAuthentication::Unsecure,
            public_addresses: Default::default(),
        },
        socket,
    )?;

    commands.insert_resource(RenetServer::new(connection_config(channels)));
    commands.insert_resource(transport);
    commands.spawn(Text(format!("Hosting course on port {port}")));
    info!("Parkour server listening on port {port}, waiting for a runner");

    Ok(())
}

fn init_client(
    commands: &mut Commands,
    channels: &RepliconChannels,
    ip: IpAddr,
    port: u16,
) -> Result<()> {
    let server_addr = SocketAddr::new(ip, port);
    let current_time = netcode_time()?;
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    let local_addr = socket.local_addr()?;
    let authentication = ClientAuthentication::Unsecure {
        // Unique per launch.
        client_id: current_time.as_millis() as u64,
        protocol_id: PROTOCOL_ID,
        server_addr,
        user_data: None,
    };
    let transport = NetcodeClientTransport::new(current_time, authentication, socket)?;

    commands.insert_resource(RenetClient::new(connection_config(channels)));
    commands.insert_resource(transport);
    commands.spawn(Text(format!("Running on {server_addr}")));
    info!("Joining parkour server at {server_addr} from {local_addr}");

    Ok(())
}

/// Renet channels mirroring the ones Replicon registered for parkour actions and replication.
fn connection_config(channels: &RepliconChannels) -> ConnectionConfig {
    ConnectionConfig {
        server_channels_config: channels.server_configs(),
        client_channels_config: channels.client_configs(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_is_accepted_after_the_role() {
        let cli = Cli::try_parse_from(["corsa", "server", "--port", "6000", "--config", "a.ron"])
            .unwrap();
        assert_eq!(cli.role, Role::Server { port: 6000 });
        assert_eq!(cli.config, Some(PathBuf::from("a.ron")));
    }

    #[test]
    fn netcode_time_counts_from_the_epoch() {
        // 2020-01-01T00:00:00Z
        assert!(netcode_time().unwrap().as_secs() > 1_577_836_800);
    }

    #[test]
    fn protocol_is_specific_to_the_project() {
        assert_eq!(&PROTOCOL_ID.to_be_bytes()[3..], b"corsa");
    }

    #[test]
    fn client_defaults_to_localhost() {
        let cli = Cli::try_parse_from(["corsa", "client"]).unwrap();
        assert_eq!(
            cli.role,
            Role::Client {
                ip: Ipv4Addr::LOCALHOST.into(),
                port: DEFAULT_PORT
            }
        );
        assert_eq!(cli.config, None);
    }
}
