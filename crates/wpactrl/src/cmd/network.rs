use tracing::info;

use crate::cmd::{with_client, AddNetworkArgs, NetworkIdArgs, TargetArgs};
use crate::exit::{supplicant_error, CliResult, SUCCESS};
use crate::output::{print_ack, print_networks, OutputFormat};

pub fn list(target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    with_client(target, |client| {
        let networks = client
            .list_networks()
            .map_err(|err| supplicant_error("list networks failed", err))?;
        print_networks(&networks, format);
        Ok(SUCCESS)
    })
}

pub fn add(args: AddNetworkArgs, target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    with_client(target, |client| {
        let id = client
            .add_network()
            .map_err(|err| supplicant_error("add network failed", err))?;

        if let Some(ssid) = &args.ssid {
            client
                .set_ssid(&id, ssid)
                .map_err(|err| supplicant_error("set ssid failed", err))?;
        }
        if let Some(psk) = &args.psk {
            client
                .set_psk(&id, psk)
                .map_err(|err| supplicant_error("set psk failed", err))?;
        }
        if args.enable {
            client
                .enable_network(&id)
                .map_err(|err| supplicant_error("enable network failed", err))?;
        }

        info!(id = %id, enabled = args.enable, "network added");
        print_ack("add-network", Some(&id), format);
        Ok(SUCCESS)
    })
}

pub fn remove(args: NetworkIdArgs, target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    with_client(target, |client| {
        client
            .remove_network(&args.id)
            .map_err(|err| supplicant_error("remove network failed", err))?;
        print_ack("remove-network", Some(&args.id), format);
        Ok(SUCCESS)
    })
}

pub fn enable(args: NetworkIdArgs, target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    with_client(target, |client| {
        client
            .enable_network(&args.id)
            .map_err(|err| supplicant_error("enable network failed", err))?;
        print_ack("enable-network", Some(&args.id), format);
        Ok(SUCCESS)
    })
}

pub fn disable(args: NetworkIdArgs, target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    with_client(target, |client| {
        client
            .disable_network(&args.id)
            .map_err(|err| supplicant_error("disable network failed", err))?;
        print_ack("disable-network", Some(&args.id), format);
        Ok(SUCCESS)
    })
}

pub fn select(args: NetworkIdArgs, target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    with_client(target, |client| {
        client
            .select_network(&args.id)
            .map_err(|err| supplicant_error("select network failed", err))?;
        print_ack("select-network", Some(&args.id), format);
        Ok(SUCCESS)
    })
}
