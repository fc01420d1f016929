//! Minimal local session: the host connects to its own server, trades a
//! reliable handshake, then streams unreliable updates until the server's
//! buffer starts dropping them.
//!
//! Run with:
//!   cargo run --example local-session

use loopnet::frame::MessageKind;
use loopnet::transport::{HostMode, LoopbackConfig, LoopbackTransport, SendStatus, LOCAL_HOST};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoopbackConfig {
        max_message: 256,
        buffered_messages: 4,
    };
    let mut transport = LoopbackTransport::with_config(HostMode::Listen, config)?;

    let client = transport.connect(LOCAL_HOST)?;
    let server = transport
        .poll_accept()
        .ok_or("server never saw the connect")?;
    eprintln!("Connected {client:?} <-> {server:?}");

    transport.send_reliable(client, b"hello server")?;
    if let Some(MessageKind::Reliable) = transport.receive_next(server)? {
        eprintln!(
            "Server got: {}",
            String::from_utf8_lossy(transport.message())
        );
        transport.send_reliable(server, b"welcome")?;
    }
    while let Some(frame) = transport.recv(client)? {
        eprintln!("Client got {}: {:?}", frame.kind, frame.payload);
    }

    let update = [0u8; 120];
    let mut sent = 0;
    loop {
        match transport.send_unreliable(client, &update)? {
            SendStatus::Sent => sent += 1,
            SendStatus::Dropped => break,
        }
    }
    eprintln!("Server buffer took {sent} unreliable updates before dropping");

    // The reliable reserve is still free.
    transport.send_reliable(client, b"still reliable")?;

    let mut drained = 0;
    while transport.receive_next(server)?.is_some() {
        drained += 1;
    }
    eprintln!("Server drained {drained} frames");

    transport.shutdown();
    Ok(())
}
