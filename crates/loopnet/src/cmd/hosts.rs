use loopnet_transport::{HostStatus, LoopbackTransport, LOCAL_HOST};

use crate::cmd::{BufferArgs, HostsArgs};
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_hosts, OutputFormat};

pub fn run(args: HostsArgs, buffers: &BufferArgs, format: OutputFormat) -> CliResult<i32> {
    let mut transport = buffers.transport()?;

    if !args.no_server {
        transport
            .connect(LOCAL_HOST)
            .map_err(|err| transport_error("connect failed", err))?;
        transport.poll_accept();
    }

    let status = HostStatus {
        hostname: args.hostname,
        map: args.map,
        active_connections: live_endpoints(&transport),
        max_clients: args.max_users,
    };
    let entries = transport.list_local_host(&status);
    print_hosts(&entries, format);

    transport.shutdown();
    Ok(SUCCESS)
}

/// Open endpoints stand in for the game's connection count.
fn live_endpoints(transport: &LoopbackTransport) -> usize {
    usize::from(transport.client().is_some()) + usize::from(transport.server().is_some())
}
