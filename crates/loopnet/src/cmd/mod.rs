use clap::{Args, Subcommand};
use loopnet_transport::{
    HostMode, LoopbackConfig, LoopbackTransport, DEFAULT_BUFFERED_MESSAGES, DEFAULT_MAX_MESSAGE,
};

use crate::exit::{transport_error, CliResult};
use crate::output::OutputFormat;

pub mod capacity;
pub mod exchange;
pub mod hosts;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a local session and print every frame each side receives.
    Exchange(ExchangeArgs),
    /// Fill the server's receive buffer and report where reliable sends overflow.
    Capacity(CapacityArgs),
    /// Show the host-list entry for the local server.
    Hosts(HostsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, buffers: &BufferArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Exchange(args) => exchange::run(args, buffers, format),
        Command::Capacity(args) => capacity::run(args, buffers, format),
        Command::Hosts(args) => hosts::run(args, buffers, format),
        Command::Version(args) => version::run(args),
    }
}

/// Receive buffer sizing shared by every command.
#[derive(Args, Debug, Clone)]
pub struct BufferArgs {
    /// Maximum message size in bytes (multiple of 4, at most 65535).
    #[arg(long, env = "LOOPNET_MAX_MESSAGE", default_value_t = DEFAULT_MAX_MESSAGE, global = true)]
    pub max_message: usize,
    /// Number of max-size messages each receive buffer holds.
    #[arg(long, env = "LOOPNET_BUFFERS", default_value_t = DEFAULT_BUFFERED_MESSAGES, global = true)]
    pub buffers: usize,
}

impl BufferArgs {
    pub fn config(&self) -> LoopbackConfig {
        LoopbackConfig {
            max_message: self.max_message,
            buffered_messages: self.buffers,
        }
    }

    /// Bring up a listen-mode transport with this sizing.
    pub fn transport(&self) -> CliResult<LoopbackTransport> {
        LoopbackTransport::with_config(HostMode::Listen, self.config())
            .map_err(|err| transport_error("init failed", err))
    }
}

#[derive(Args, Debug)]
pub struct ExchangeArgs {
    /// Payload text; each message appends its index.
    #[arg(long, default_value = "hello")]
    pub data: String,
    /// Number of reliable messages the client sends.
    #[arg(long, default_value_t = 3)]
    pub reliable: usize,
    /// Number of unreliable messages the client sends.
    #[arg(long, default_value_t = 3)]
    pub unreliable: usize,
    /// Have the server echo every reliable message back to the client.
    #[arg(long)]
    pub echo: bool,
}

#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// Payload size of each reliable message.
    #[arg(long, default_value_t = 0)]
    pub size: usize,
}

#[derive(Args, Debug)]
pub struct HostsArgs {
    /// Host name to report ("UNNAMED" is shown as "local").
    #[arg(long, default_value = loopnet_transport::UNNAMED_HOST)]
    pub hostname: String,
    /// Map name to report.
    #[arg(long, default_value = "start")]
    pub map: String,
    /// Maximum number of clients to report.
    #[arg(long, default_value_t = 8)]
    pub max_users: usize,
    /// Do not start the local server first.
    #[arg(long)]
    pub no_server: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
