use loopnet_transport::{EndpointHandle, LoopbackTransport, SendStatus, LOCAL_HOST};

use crate::cmd::{BufferArgs, ExchangeArgs};
use crate::exit::{transport_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ExchangeArgs, buffers: &BufferArgs, format: OutputFormat) -> CliResult<i32> {
    let mut transport = buffers.transport()?;

    let client = transport
        .connect(LOCAL_HOST)
        .map_err(|err| transport_error("connect failed", err))?;
    let server = transport
        .poll_accept()
        .ok_or_else(|| CliError::new(FAILURE, "server did not see the local connect"))?;

    let mut delivered = 0usize;
    let mut dropped = 0usize;

    for i in 0..args.reliable {
        if !transport.can_send_reliable(client) {
            delivered += drain(&mut transport, server, format)?;
        }
        let payload = format!("{} #{i}", args.data);
        transport
            .send_reliable(client, payload.as_bytes())
            .map_err(|err| transport_error("reliable send failed", err))?;
        delivered += drain(&mut transport, server, format)?;

        if args.echo {
            // The scratch buffer still holds the message the server just consumed.
            let echoed = transport.message().to_vec();
            transport
                .send_reliable(server, &echoed)
                .map_err(|err| transport_error("echo failed", err))?;
            delivered += drain(&mut transport, client, format)?;
        }
    }

    for i in 0..args.unreliable {
        let payload = format!("{} ~{i}", args.data);
        match transport
            .send_unreliable(client, payload.as_bytes())
            .map_err(|err| transport_error("unreliable send failed", err))?
        {
            SendStatus::Sent => {}
            SendStatus::Dropped => dropped += 1,
        }
    }
    delivered += drain(&mut transport, server, format)?;

    tracing::info!(delivered, dropped, "exchange complete");
    transport.shutdown();
    Ok(SUCCESS)
}

/// Print every frame queued for `handle`; returns how many were consumed.
fn drain(
    transport: &mut LoopbackTransport,
    handle: EndpointHandle,
    format: OutputFormat,
) -> CliResult<usize> {
    let mut count = 0usize;
    while let Some(frame) = transport
        .recv(handle)
        .map_err(|err| transport_error("receive failed", err))?
    {
        print_frame(&frame, handle.side(), format);
        count += 1;
    }
    Ok(count)
}
