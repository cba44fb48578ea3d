//! Line-oriented configuration shell.
//!
//! Replies go to the output writer, one per line; log lines go to STDERR.

use crate::{
    conf_debug, conf_error,
    registry::{fields::Scalar, Projection},
    store::ConfigStore,
    sysc::ConfigResult,
};
use std::io::{self, BufRead, ErrorKind, Write};

const HELP: &str = "\
get <name>            value as \"name\":value
info <name>           introspection object
set <name> <json>     set and save if changed
next <name>           advance to the next value and save
toggle <name> <bit>   flip one bit of a bitmask item and save
save                  write the configuration
load                  re-read the configuration
reset                 restore defaults (not saved)
dump                  whole configuration document
help                  this text
quit";

/// What the shell loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run commands from `input` until it ends or `quit` is read.
pub fn run<R: BufRead, W: Write>(store: &ConfigStore, input: R, mut output: W) -> io::Result<()> {
    conf_debug!("Starting shell");
    writeln!(output, "Welcome to the GPS logger configuration shell, type `help`.")?;
    display_prompt(&mut output)?;

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(why) if why.kind() == ErrorKind::Interrupted => continue,
            Err(why) => return Err(why),
        };

        if execute(store, line.trim(), &mut output)? == Flow::Quit {
            break;
        }

        display_prompt(&mut output)?;
    }

    Ok(())
}

fn display_prompt<W: Write>(output: &mut W) -> io::Result<()> {
    write!(output, "> ")?;
    output.flush()
}

fn execute<W: Write>(store: &ConfigStore, line: &str, output: &mut W) -> io::Result<Flow> {
    let (command, args) = line.split_once(' ').unwrap_or((line, ""));
    let args = args.trim();

    match command {
        "" => {}
        "help" => writeln!(output, "{HELP}")?,
        "quit" | "exit" => return Ok(Flow::Quit),
        "get" | "info" => {
            let projection = if command == "get" {
                Projection::Bare
            } else {
                Projection::Extended
            };

            match store.get(args, projection) {
                Some(text) => writeln!(output, "{text}")?,
                None => writeln!(output, "unknown item `{args}`")?,
            }
        }
        "set" => {
            let (name, value) = args.split_once(' ').unwrap_or((args, ""));

            match store.set_and_save(Some(name), value.trim()) {
                Ok(result) => writeln!(output, "{}", result.status())?,
                Err(crate::ConfigError::Set(why)) => {
                    writeln!(output, "{}: {why}", why.status())?;
                }
                Err(why) => report(output, &why)?,
            }
        }
        "next" => reply(output, advance(store, args))?,
        "toggle" => {
            let (name, pos) = args.split_once(' ').unwrap_or((args, ""));

            match pos.trim().parse::<u8>() {
                Ok(pos) => reply(output, toggle(store, name, pos))?,
                Err(_) => writeln!(output, "usage: toggle <name> <bit>")?,
            }
        }
        "save" => match store.save() {
            Ok(()) => writeln!(output, "saved")?,
            Err(why) => report(output, &why)?,
        },
        "load" => match store.load() {
            Ok(source) => writeln!(output, "loaded {source}")?,
            Err(why) => report(output, &why)?,
        },
        "reset" => {
            store.reset_defaults();
            writeln!(output, "defaults restored")?;
        }
        "dump" => {
            let doc = serde_json::Value::Object(store.encode());
            writeln!(output, "{doc:#}")?;
        }
        other => writeln!(output, "unknown command `{other}`, try `help`")?,
    }

    Ok(Flow::Continue)
}

fn advance(store: &ConfigStore, name: &str) -> ConfigResult<(Scalar, String)> {
    let id = store
        .registry()
        .lookup(name)
        .ok_or_else(|| crate::ConfigError::UnknownItem(name.to_owned()))?;

    store.advance(id)?;
    describe(store, name)
}

fn toggle(store: &ConfigStore, name: &str, pos: u8) -> ConfigResult<(Scalar, String)> {
    let id = store
        .registry()
        .lookup(name)
        .ok_or_else(|| crate::ConfigError::UnknownItem(name.to_owned()))?;

    store.toggle(id, pos)?;
    describe(store, name)
}

fn describe(store: &ConfigStore, name: &str) -> ConfigResult<(Scalar, String)> {
    store
        .describe(name)
        .ok_or_else(|| crate::ConfigError::UnknownItem(name.to_owned()))
}

fn reply<W: Write>(output: &mut W, result: ConfigResult<(Scalar, String)>) -> io::Result<()> {
    match result {
        Ok((value, label)) => writeln!(output, "{} ({label})", value.to_json()),
        Err(why) => report(output, &why),
    }
}

fn report<W: Write>(output: &mut W, why: &crate::ConfigError) -> io::Result<()> {
    if !why.recoverable() {
        conf_error!("{why}");
    }

    writeln!(output, "error: {why}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoragePaths;
    use tempfile::tempdir;

    fn session(store: &ConfigStore, script: &str) -> String {
        let mut out = Vec::new();
        run(store, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn get_and_set() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(StoragePaths::under(dir.path()));

        let out = session(&store, "get sample_rate\nset sample_rate 10\nset sample_rate 10\nget sample_rate\n");

        assert!(out.contains("\"sample_rate\":5\n"));
        assert!(out.contains("> 1\n"));
        assert!(out.contains("> 0\n"));
        assert!(out.contains("\"sample_rate\":10\n"));
        assert!(dir.path().join("config.txt").exists());
    }

    #[test]
    fn rejected_set_prints_status() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(StoragePaths::under(dir.path()));

        let out = session(&store, "set gnss 48\nset volume 3\n");

        assert!(out.contains("> -2: invalid value for `gnss`"));
        assert!(out.contains("> -2: unknown item `volume`"));
    }

    #[test]
    fn next_and_toggle_describe_result() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(StoragePaths::under(dir.path()));

        let out = session(&store, "next gnss\ntoggle gpio12_screens 3\ntoggle gpio12_screens 9\n");

        assert!(out.contains("107 (G + B + R)"));
        assert!(out.contains("14 (Alfa 500m, NM / 1h, s10 runs)"));
        assert!(out.contains("error: item `gpio12_screens` has no toggle at bit 9"));
    }

    #[test]
    fn quit_stops_reading() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(StoragePaths::under(dir.path()));

        let out = session(&store, "quit\nget gnss\n");
        assert!(!out.contains("\"gnss\""));
    }

    #[test]
    fn unknown_command() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(StoragePaths::under(dir.path()));

        assert!(session(&store, "fly\n").contains("unknown command `fly`"));
    }
}
