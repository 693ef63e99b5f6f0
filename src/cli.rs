use anyhow::{Result, anyhow};
use pico_args::Arguments;
use std::{env, io, path::PathBuf};

use touchmap::ProfileStore;

use crate::{input, live, replay};

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // Options first; pico-args hands out free args in order afterwards.
    let device: Option<String> = pargs.opt_value_from_str("--device")?;
    let profile: Option<String> = pargs.opt_value_from_str("--profile")?;

    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("live") => live::run(live::LiveOptions { device, profile }),

        Some("replay") => {
            let path: PathBuf = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: touchmap replay <script.toml> [--profile NAME]"))?;
            let script = replay::Script::load(&path)?;
            let store = ProfileStore::load_or_install_default()?;
            let prof = match profile {
                Some(name) => store.load_named(&name)?,
                None => store.profile,
            };
            let stdout = io::stdout();
            replay::run_script(&script, &prof, &mut stdout.lock())?;
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: touchmap use <profile_name>"))?;
            let mut store = ProfileStore::load_or_install_default()?;
            store.set_active(&name)?;
            println!("ok: active profile is now '{name}'");
            Ok(())
        }

        Some("list") => {
            let store = ProfileStore::load_or_install_default()?;
            for name in store.list_profiles() {
                let mark = if name == store.active_name { '*' } else { ' ' };
                println!("{mark} {name}");
            }
            Ok(())
        }

        Some("doctor") => {
            let store = ProfileStore::load_or_install_default()?;
            let report = input::doctor_report(&store);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!(
        r#"touchmap - map gesture arbitration on Linux touch devices

USAGE:
  touchmap help [command]                       Show general or command-specific help
  touchmap live [--device PATH] [--profile NAME] Drive a logged map camera from a touchscreen
  touchmap replay <script> [--profile NAME]     Run a scripted input file, print host calls as JSON
  touchmap use <name>                           Switch active profile
  touchmap list                                 List profiles
  touchmap doctor                               Diagnose permissions/devices

TIPS:
  - Profiles: ~/.config/touchmap/profiles
  - Active profile pointer: ~/.config/touchmap/active
  - Edits to the active profile apply to a running `live` session
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "live" => println!(
            "usage: touchmap live [--device PATH] [--profile NAME]\nReads multitouch frames and logs every camera change. Ctrl-C stops."
        ),
        "replay" => println!(
            "usage: touchmap replay <script.toml> [--profile NAME]\nPrints one JSON object per host call, tagged with time and step."
        ),
        "use" => {
            println!("usage: touchmap use <name>\nSwitches the active profile to <name>.")
        }
        "list" => {
            println!("usage: touchmap list\nLists available profiles; marks active with '*'.")
        }
        "doctor" => println!(
            "usage: touchmap doctor\nChecks permissions and lists detected multitouch devices."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}
