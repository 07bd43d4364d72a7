use wpactrl_ctrl::Ctrl;

use crate::cmd::{with_client, CmdArgs, TargetArgs};
use crate::exit::{ctrl_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: CmdArgs, target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    let cmd = args.words.join(" ");
    let verb = args.words.first().map(String::as_str).unwrap_or("");

    with_client(target, |client| {
        let reply = client
            .ctrl()
            .command(&cmd)
            .map_err(|err| ctrl_error(&format!("{verb} failed"), err))?;
        print_reply(verb, &reply, format);
        Ok(SUCCESS)
    })
}
