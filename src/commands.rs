use tracing::instrument;

use crate::console::Console;
use crate::errors::{CommandError, CommandErrorType, Result};
use crate::handlers;

/// A player command with its arguments checked for shape. Arguments that need
/// the tree (paths, slot numbers) are checked by the handler.
#[derive(Debug, PartialEq)]
pub(crate) enum Command<'a> {
    Ls { show_hidden: bool, targets: Vec<&'a str> },
    Cd(Option<&'a str>),
    Cat(Vec<&'a str>),
    Rm { recursive: bool, target: &'a str },
    Restore(Vec<&'a str>),
    Trace(Vec<&'a str>),
    Mntr,
    Track(Vec<(&'a str, &'a str)>),
    Tut,
    Help,
    Pwd,
}

impl<'a> Command<'a> {
    pub(crate) fn parse(cmd_name: &str, arguments: &[&'a str]) -> Result<Command<'a>> {
        match cmd_name {
            "ls" => {
                let mut show_hidden = false;
                let mut targets = Vec::new();
                for arg in arguments {
                    if arg.starts_with('-') {
                        show_hidden = arg.contains('a');
                    } else {
                        targets.push(*arg);
                    }
                }
                Ok(Command::Ls {
                    show_hidden,
                    targets,
                })
            }
            "cd" => match arguments {
                [] => Ok(Command::Cd(None)),
                [path] => Ok(Command::Cd(Some(*path))),
                _ => Err(CommandError::usage("usage: cd <directory>")),
            },
            "cat" => {
                if arguments.is_empty() {
                    return Err(CommandError::usage("usage: cat <file(s)>"));
                }
                Ok(Command::Cat(arguments.to_vec()))
            }
            "rm" => {
                let Some(&target) = arguments.last() else {
                    return Err(CommandError::usage("usage: rm [-r] file ..."));
                };
                let recursive = arguments.contains(&"-r")
                    || (arguments[0].starts_with('-') && arguments[0].contains('r'));
                Ok(Command::Rm {
                    recursive,
                    target,
                })
            }
            "restore" => {
                if arguments.is_empty() {
                    return Err(CommandError::usage("usage: restore <file>"));
                }
                Ok(Command::Restore(arguments.to_vec()))
            }
            "trace" => {
                if arguments.is_empty() {
                    return Err(CommandError::usage("usage: trace <file(s)>"));
                }
                Ok(Command::Trace(arguments.to_vec()))
            }
            "mntr" => {
                if !arguments.is_empty() {
                    return Err(CommandError::usage("usage: mntr"));
                }
                Ok(Command::Mntr)
            }
            "track" => {
                if arguments.len() % 2 != 0 {
                    return Err(CommandError::usage("usage: track [<number> <file> ...]"));
                }
                let pairs = arguments
                    .chunks(2)
                    .map(|pair| (pair[0], pair[1]))
                    .collect();
                Ok(Command::Track(pairs))
            }
            "tut" => {
                if !arguments.is_empty() {
                    return Err(CommandError::usage("usage: tut"));
                }
                Ok(Command::Tut)
            }
            "help" => Ok(Command::Help),
            "pwd" => {
                if !arguments.is_empty() {
                    return Err(CommandError::usage("usage: pwd"));
                }
                Ok(Command::Pwd)
            }
            _ => Err(CommandError::new(
                CommandErrorType::NotFound,
                format!("{}: command not found", cmd_name),
            )),
        }
    }
}

/// Parse and run a command. Failures come back as their message; nothing a
/// player types can end the session.
#[instrument(name = "commands.run", level = "info", skip(console), fields(game = %console.save().id()))]
pub(crate) fn run(console: &mut Console, name: &str, args: &[&str]) -> Option<String> {
    let result = Command::parse(name, args).and_then(|cmd| dispatch(console, cmd));
    match result {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(error_type = ?e.error_type, "Command failed");
            Some(e.to_string())
        }
    }
}

fn dispatch(console: &mut Console, cmd: Command) -> Result<Option<String>> {
    match cmd {
        Command::Ls {
            show_hidden,
            targets,
        } => handlers::ls(console, show_hidden, &targets),
        Command::Cd(path) => handlers::cd(console, path),
        Command::Cat(paths) => handlers::cat(console, &paths),
        Command::Rm { recursive, target } => handlers::rm(console, recursive, target),
        Command::Restore(names) => handlers::restore(console, &names),
        Command::Trace(names) => handlers::trace(console, &names),
        Command::Mntr => handlers::mntr(console),
        Command::Track(pairs) => handlers::track(console, &pairs),
        Command::Tut => Ok(Some(handlers::TUT_MESSAGE.to_string())),
        Command::Help => Ok(Some(handlers::HELP_MESSAGE.to_string())),
        Command::Pwd => Ok(Some(console.fs().path_of(console.current_dir()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ls_flags() {
        let cmd = Command::parse("ls", &["-la", "docs", "pics"]).unwrap();
        assert_eq!(
            cmd,
            Command::Ls {
                show_hidden: true,
                targets: vec!["docs", "pics"]
            }
        );
        let cmd = Command::parse("ls", &["-a", "-l"]).unwrap();
        assert_eq!(
            cmd,
            Command::Ls {
                show_hidden: false,
                targets: vec![]
            }
        );
    }

    #[test]
    fn test_parse_rm() {
        assert_eq!(
            Command::parse("rm", &["-rf", "docs"]).unwrap(),
            Command::Rm {
                recursive: true,
                target: "docs"
            }
        );
        assert_eq!(
            Command::parse("rm", &["docs", "-r", "x"]).unwrap(),
            Command::Rm {
                recursive: true,
                target: "x"
            }
        );
        assert_eq!(
            Command::parse("rm", &["docs"]).unwrap(),
            Command::Rm {
                recursive: false,
                target: "docs"
            }
        );
        let err = Command::parse("rm", &[]).unwrap_err();
        assert_eq!(err.to_string(), "usage: rm [-r] file ...");
    }

    #[test]
    fn test_parse_usage_errors() {
        let cases: &[(&str, &[&str], &str)] = &[
            ("cd", &["a", "b"], "usage: cd <directory>"),
            ("cat", &[], "usage: cat <file(s)>"),
            ("restore", &[], "usage: restore <file>"),
            ("trace", &[], "usage: trace <file(s)>"),
            ("mntr", &["x"], "usage: mntr"),
            ("track", &["1"], "usage: track [<number> <file> ...]"),
            ("tut", &["x"], "usage: tut"),
        ];
        for (name, args, expected) in cases {
            let err = Command::parse(name, args).unwrap_err();
            assert_eq!(err.error_type, CommandErrorType::Usage);
            assert_eq!(&err.to_string(), expected);
        }
    }

    #[test]
    fn test_parse_track_pairs() {
        assert_eq!(
            Command::parse("track", &["1", "a", "2", "b"]).unwrap(),
            Command::Track(vec![("1", "a"), ("2", "b")])
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = Command::parse("sudo", &[]).unwrap_err();
        assert_eq!(err.to_string(), "sudo: command not found");
    }
}
