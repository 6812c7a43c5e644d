//! Clap command tree definition.

use clap::{value_parser, Arg, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("phonebase")
        .about("Turn this device into a personal JSON backend")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(build_connect())
        .subcommand(build_serve())
        .subcommand(build_status())
}

fn port_arg() -> Arg {
    Arg::new("port")
        .long("port")
        .value_parser(value_parser!(u16))
        .help("TCP port to bind (default: 8080, or PHONEBASE_PORT)")
}

fn data_dir_arg() -> Arg {
    Arg::new("data-dir")
        .long("data-dir")
        .help("Directory for store files and the profile (default: ~/.phonebase)")
}

fn build_connect() -> Command {
    Command::new("connect")
        .about("Register with the cloud registry and start the local server")
        .arg(
            Arg::new("user")
                .long("user")
                .help("Username to register under (saved for later runs)"),
        )
        .arg(port_arg())
        .arg(data_dir_arg())
}

fn build_serve() -> Command {
    Command::new("serve")
        .about("Start the local server without cloud registration")
        .arg(port_arg())
        .arg(data_dir_arg())
}

fn build_status() -> Command {
    Command::new("status")
        .about("List registered phones and check for one matching a user")
        .arg(
            Arg::new("user")
                .long("user")
                .required(true)
                .help("User email or ID to look for"),
        )
}
