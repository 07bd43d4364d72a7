use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("wpactrl {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: wpactrl");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("WPACTRL_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "features: supplicant={}, mock={}, cli=true",
        cfg!(feature = "supplicant"),
        cfg!(feature = "mock")
    );
    println!("default_ctrl_dir: {}", crate::cmd::DEFAULT_CTRL_DIR);

    Ok(SUCCESS)
}
