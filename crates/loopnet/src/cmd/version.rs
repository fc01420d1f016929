use loopnet_frame::ALIGNMENT;
use loopnet_transport::{DEFAULT_BUFFERED_MESSAGES, DEFAULT_MAX_MESSAGE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("loopnet {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: loopnet");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("LOOPNET_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("frame_alignment: {ALIGNMENT}");
    println!(
        "default_buffers: {DEFAULT_BUFFERED_MESSAGES} x {DEFAULT_MAX_MESSAGE} bytes"
    );

    Ok(SUCCESS)
}
