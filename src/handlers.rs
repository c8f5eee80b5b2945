use tracing::instrument;

use crate::console::Console;
use crate::errors::{CommandError, CommandErrorType, Result};
use crate::fsystem::path::{basename, resolve};
use crate::fsystem::{FileSystem, NodeId};
use crate::virus;

pub(crate) const TUT_MESSAGE: &str = "Type ./tutorial.sh";

pub(crate) const HELP_MESSAGE: &str = "ls [directory] -> Lists the specified directory, or the current one if none is given\n\
cd [directory] -> Changes the current directory, or moves to the beginning directory if none is given\n\
cat <file> -> Prints out the contents of a file\n\
rm [-r] [directory OR file] -> Removes a directory or file and moves it to the Trash\n\
track [<number> <file> ...] -> Allows you to track a virus file with a number to identify it easier.\n\
\tIf nothing is given, it will show you the files you're tracking currently.\n\
trace <file> -> (Can only be used in the Trash directory) Allows you to trace where a file was deleted from\n\
mntr -> Shows you the most recently deleted file, the speed at which files are deleted by the virus, how\n\
\tmany virus files you've deleted, and how many files have been deleted by the virus.\n\
restore <file> -> Restores a file to its original location (Can only be used in the Trash directory)\n\
pwd -> Shows the directory you are in\n\
help -> Shows this help message!";

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub(crate) fn list_contents(fs: &FileSystem, dir: NodeId, show_hidden: bool) -> String {
    let mut folders = Vec::new();
    let mut files = Vec::new();
    for child in fs.children(dir) {
        let Some(entry) = fs.get(child) else { continue };
        if entry.is_hidden() && !show_hidden {
            continue;
        }
        if entry.is_dir() {
            folders.push(format!("{}/", entry.name()));
        } else {
            files.push(entry.name().to_string());
        }
    }
    folders.append(&mut files);
    folders.join("  ")
}

pub(crate) fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .map(|line| {
            line.iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<String>>()
                .join(" ")
        })
        .collect::<Vec<String>>()
        .join("\n")
}

#[instrument(name = "handlers.ls", level = "info", skip(console))]
pub(crate) fn ls(console: &Console, show_hidden: bool, targets: &[&str]) -> Result<Option<String>> {
    let fs = console.fs();
    let current = console.current_dir();
    if targets.is_empty() {
        return Ok(non_empty(list_contents(fs, current, show_hidden)));
    }
    let mut results = Vec::new();
    for target in targets {
        let Some(id) = resolve(fs, current, target) else {
            results.push(format!("ls: {}: No such file or directory", target));
            continue;
        };
        // Headers echo the target as typed; a file target has no listing.
        let is_dir = fs.is_dir(id);
        if targets.len() > 1 {
            results.push(format!("{}{}", target, if is_dir { ":" } else { "" }));
        }
        if is_dir {
            results.push(list_contents(fs, id, show_hidden));
        }
    }
    Ok(non_empty(results.join("\n")))
}

// The walk happens on a local cursor and is only committed once every
// component has been found.
#[instrument(name = "handlers.cd", level = "info", skip(console))]
pub(crate) fn cd(console: &mut Console, path: Option<&str>) -> Result<Option<String>> {
    let Some(path) = path else {
        let home = console.home().ok_or_else(|| {
            CommandError::new(
                CommandErrorType::NotFound,
                format!("cd: usr/{}: No such file or directory", console.save().username()),
            )
        })?;
        console.set_current_dir(home);
        return Ok(None);
    };

    let fs = console.fs();
    let trash = console.trash();
    let mut cursor = if path.starts_with('/') {
        fs.root()
    } else {
        console.current_dir()
    };
    let mut previous = console.previous_dir();
    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                if console.is_in_game() && cursor == trash {
                    cursor = previous.or_else(|| fs.parent(cursor)).unwrap_or(cursor);
                } else if let Some(parent) = fs.parent(cursor) {
                    cursor = parent;
                }
            }
            "Trash" if console.is_in_game() => {
                previous = Some(cursor);
                cursor = trash;
                break;
            }
            _ => {
                let Some(child) = fs.child(cursor, part) else {
                    return Err(CommandError::new(
                        CommandErrorType::NotFound,
                        format!("cd: {}: No such file or directory", part),
                    ));
                };
                if !fs.is_dir(child) {
                    return Err(CommandError::new(
                        CommandErrorType::NotADirectory,
                        format!("cd: not a directory: {}", part),
                    ));
                }
                cursor = child;
            }
        }
    }
    console.set_current_dir(cursor);
    console.set_previous_dir(previous);
    Ok(None)
}

#[instrument(name = "handlers.cat", level = "info", skip(console))]
pub(crate) fn cat(console: &Console, paths: &[&str]) -> Result<Option<String>> {
    let fs = console.fs();
    let mut results = Vec::new();
    for path in paths {
        let Some(id) = resolve(fs, console.current_dir(), path) else {
            results.push(format!("cat: {}: No such file or directory", path));
            continue;
        };
        let entry = fs.entry(id)?;
        match entry.bytes() {
            Some(bytes) => results.push(hex_dump(bytes)),
            None => {
                results.push(format!("cat: {}: Is a directory", entry.name()));
                break;
            }
        }
    }
    Ok(non_empty(results.join("\n\n")))
}

#[instrument(name = "handlers.rm", level = "info", skip(console))]
pub(crate) fn rm(console: &mut Console, recursive: bool, target: &str) -> Result<Option<String>> {
    let id = console
        .fs()
        .child(console.current_dir(), target)
        .ok_or_else(|| {
            CommandError::new(
                CommandErrorType::NotFound,
                format!("rm: {}: No such file or directory", target),
            )
        })?;
    let entry = console.fs().entry(id)?;
    if entry.virus_index().is_some() {
        return virus::delete_virus(console, id).map(Some);
    }
    if entry.is_dir() && entry.size() > 0 && !recursive {
        return Err(CommandError::new(
            CommandErrorType::InvalidTarget,
            format!("rm: {}: is a directory", target),
        ));
    }
    let trash = console.trash();
    if console.fs().is_within(id, trash) {
        return Err(CommandError::new(
            CommandErrorType::InvalidTarget,
            format!("rm: {}: already in Trash", target),
        ));
    }
    if console.holds_a_trash(id) {
        return Err(CommandError::new(
            CommandErrorType::InvalidTarget,
            format!("rm: {}: contains the Trash", target),
        ));
    }
    let cause = format!("was removed by {}", console.save().username());
    console.move_to_trash(id, trash, &cause)?;
    tracing::info!("Moved {} to the trash", target);
    Ok(None)
}

#[instrument(name = "handlers.restore", level = "info", skip(console))]
pub(crate) fn restore(console: &mut Console, names: &[&str]) -> Result<Option<String>> {
    let trash = console.trash();
    if console.current_dir() != trash {
        return Err(CommandError::new(
            CommandErrorType::Mode,
            "restore: must be in Trash directory".to_string(),
        ));
    }
    let names: Vec<String> = if names == ["*"] {
        console
            .fs()
            .children(trash)
            .into_iter()
            .map(|id| console.fs().name(id).to_string())
            .collect()
    } else {
        names.iter().map(|name| name.to_string()).collect()
    };

    let mut results = Vec::new();
    for name in names {
        let found = resolve(console.fs(), trash, &name)
            .filter(|&id| id != trash && console.fs().is_within(id, trash));
        let Some(id) = found else {
            results.push(format!("restore: {}: No such file", name));
            continue;
        };
        let entry = console.fs().entry(id)?;
        let origin = match entry.origin() {
            Some(origin) if entry.is_normal_file() => origin.to_string(),
            _ => {
                results.push(format!("restore: {}: is not a valid file", entry.name()));
                continue;
            }
        };
        results.push(restore_file(console, id, &name, &origin)?);
    }
    Ok(non_empty(results.join("\n")))
}

fn restore_file(console: &mut Console, id: NodeId, name: &str, origin: &str) -> Result<String> {
    let (parent_path, file_name) = origin.rsplit_once('/').unwrap_or(("", origin));
    let dir = match console.fs.make_dirs(parent_path) {
        Ok(dir) if !console.in_any_trash(dir) => dir,
        _ => {
            tracing::info!("Cannot restore {} to {}", name, origin);
            return Ok(format!("restore: {}: cannot restore to {}", name, origin));
        }
    };
    let restored_name = console.fs.relocate_as(id, dir, file_name)?;
    console.fs.set_origin(id, None)?;
    console.save.restored_file();
    Ok(format!("{} restored to {}", restored_name, console.fs.path_of(id)))
}

#[instrument(name = "handlers.trace", level = "info", skip(console))]
pub(crate) fn trace(console: &Console, names: &[&str]) -> Result<Option<String>> {
    if !console.is_in_play() {
        return Ok(None);
    }
    let fs = console.fs();
    let trash = console.save().trash();
    let mut results = Vec::new();
    for name in names {
        let found = resolve(fs, trash, name).filter(|&id| fs.is_within(id, trash));
        let Some(id) = found else {
            results.push(format!("trace: {}: No such file or directory", name));
            continue;
        };
        let entry = fs.entry(id)?;
        if entry.is_dir() {
            results.push(format!("trace: {}: Is a directory", entry.name()));
            continue;
        }
        let key = entry.origin().map(basename).unwrap_or(entry.name());
        for log in console.save().deletion_log() {
            if basename(&log.path) == key {
                results.push(log.message.clone());
            }
        }
    }
    Ok(non_empty(results.join("\n")))
}

#[instrument(name = "handlers.mntr", level = "info", skip(console))]
pub(crate) fn mntr(console: &Console) -> Result<Option<String>> {
    let save = console.save();
    let last = save
        .deletion_log()
        .last()
        .map(|entry| entry.path.as_str())
        .unwrap_or("None found");
    Ok(Some(format!(
        "last log entry: {}\nspeed: {}s\nvirus files deleted: {}\nfiles deleted by virus: {}",
        last,
        save.speed(),
        save.virus_removed(),
        save.files_destroyed()
    )))
}

#[instrument(name = "handlers.track", level = "info", skip(console))]
pub(crate) fn track(console: &mut Console, pairs: &[(&str, &str)]) -> Result<Option<String>> {
    if pairs.is_empty() {
        let fs = console.fs();
        // Slots are listed one higher than they were bound, widened so the
        // largest slot cannot overflow.
        let lines: Vec<String> = console
            .save()
            .tracked()
            .iter()
            .filter(|(_, &id)| fs.contains(id))
            .map(|(&slot, &id)| format!("{}: {}", slot as u128 + 1, fs.path_of(id)))
            .collect();
        return Ok(non_empty(lines.join("\n")));
    }

    let mut messages = Vec::new();
    for (number, path) in pairs {
        let slot = match number.parse::<usize>() {
            Ok(n) if number.chars().all(|c| c.is_ascii_digit()) => n,
            _ => {
                messages.push(format!("track: {}: not a number", number));
                continue;
            }
        };
        match resolve(console.fs(), console.current_dir(), path) {
            Some(id) => {
                console.save_mut().track(slot, id);
                messages.push(format!("track: {} tracked", console.fs().path_of(id)));
            }
            None => messages.push(format!("track: {}: No such file or directory", path)),
        }
    }
    Ok(non_empty(messages.join("\n")))
}
