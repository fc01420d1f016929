use loopnet_frame::{align, RELIABLE_HEADER_SIZE};
use loopnet_transport::{TransportError, LOCAL_HOST};
use serde::Serialize;

use crate::cmd::{BufferArgs, CapacityArgs};
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct CapacityOutput {
    payload_size: usize,
    frame_size: usize,
    capacity: usize,
    accepted: usize,
    queued: usize,
}

pub fn run(args: CapacityArgs, buffers: &BufferArgs, format: OutputFormat) -> CliResult<i32> {
    let mut transport = buffers.transport()?;
    let client = transport
        .connect(LOCAL_HOST)
        .map_err(|err| transport_error("connect failed", err))?;

    let payload = vec![0u8; args.size];
    let mut accepted = 0usize;
    loop {
        // Flow control is skipped; nothing drains the server here.
        match transport.send_reliable(client, &payload) {
            Ok(()) => accepted += 1,
            Err(TransportError::Overflow { .. }) => break,
            Err(err) => return Err(transport_error("reliable send failed", err)),
        }
    }

    let queued = transport.server().map_or(0, |server| server.queued_len());
    let out = CapacityOutput {
        payload_size: args.size,
        frame_size: align(args.size + RELIABLE_HEADER_SIZE),
        capacity: transport.config().capacity(),
        accepted,
        queued,
    };
    print_capacity(&out, format);

    transport.shutdown();
    Ok(SUCCESS)
}

fn print_capacity(out: &CapacityOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Reliable capacity:");
            println!("  Payload size:  {} bytes", out.payload_size);
            println!("  Frame size:    {} bytes", out.frame_size);
            println!("  Buffer:        {} bytes", out.capacity);
            println!("  Accepted:      {} frames", out.accepted);
            println!("  Queued:        {} bytes", out.queued);
        }
        OutputFormat::Raw => println!("{}", out.accepted),
    }
}
