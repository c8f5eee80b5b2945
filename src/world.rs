use crate::fsystem::errors::Result;
use crate::fsystem::{FileSystem, NodeId};

// Paths under the player's home are written relative to it; everything else is
// absolute.
const SYSTEM_FILES: &[(&str, &str)] = &[
    ("/bin/ls", "#!/bin/sh\nexec list \"$@\"\n"),
    ("/bin/cat", "#!/bin/sh\nexec concat \"$@\"\n"),
    ("/bin/rm", "#!/bin/sh\nexec remove \"$@\"\n"),
    ("/etc/hosts", "127.0.0.1 localhost\n"),
    ("/etc/motd", "Welcome back. Remember to empty the trash.\n"),
    ("/etc/.shadow", "root:*:19000:0:99999:7:::\n"),
    ("/var/log/syslog", "kernel: boot complete\nsshd: listening on port 22\n"),
    ("/var/log/auth.log", "session opened for user root\n"),
    ("/usr/share/dict/words", "apple\nbanana\ncherry\n"),
    ("/tmp/scratch", "remember to rotate keys\n"),
];

const HOME_FILES: &[(&str, &str)] = &[
    ("Documents/notes.txt", "Meeting moved to Thursday.\n"),
    ("Documents/todo.txt", "- buy milk\n- fix the printer\n- call mom\n"),
    ("Documents/essay.md", "# On Trash\nNothing is ever truly deleted.\n"),
    ("Pictures/cat.png", "\u{89}PNG\r\n\u{1a}\n"),
    ("Pictures/beach.jpg", "JFIF beach 2019"),
    ("Music/song.mp3", "ID3 track 01"),
    (".config/settings.ini", "[ui]\ntheme=dark\n"),
    (".bash_history", "ls\ncd Documents\ncat notes.txt\n"),
];

// A small home with one lesson per directory. The tutorial keeps its own
// detached trash bin, so only the player's directories are laid out here.
const TUTORIAL_FILES: &[(&str, &str)] = &[
    ("readme.txt", "Use ls to look around and cd to move between directories.\n"),
    ("lesson1/notes.txt", "rm sends a file to the Trash. cd Trash, then restore it.\n"),
    ("lesson1/draft.txt", "Try removing me, then bring me back.\n"),
    ("lesson2/notes.txt", "cat a suspicious file: bytes 5 to 8 hold its virus number.\n"),
    ("lesson2/photo.jpg", "JFIF tutorial"),
];

pub const TUTORIAL_VIRUS_COUNT: u32 = 2;

/// Lay out the default world. Returns the player's home directory and the
/// trash bin inside it.
pub fn populate(fs: &mut FileSystem, username: &str) -> Result<(NodeId, NodeId)> {
    for (path, contents) in SYSTEM_FILES {
        add_file_at(fs, path, contents.as_bytes())?;
    }
    let home_path = format!("/usr/{}", username);
    let home = fs.make_dirs(&home_path)?;
    for (path, contents) in HOME_FILES {
        add_file_at(fs, &format!("{}/{}", home_path, path), contents.as_bytes())?;
    }
    fs.make_dirs(&format!("{}/Downloads", home_path))?;
    let trash = fs.add_dir(home, "Trash")?;
    tracing::debug!(home = %fs.path_of(home), "World populated");
    Ok((home, trash))
}

/// Lay out the tutorial world. Returns the player's home directory and the
/// play trash bin inside it.
pub fn populate_tutorial(fs: &mut FileSystem, username: &str) -> Result<(NodeId, NodeId)> {
    let home_path = format!("/usr/{}", username);
    let home = fs.make_dirs(&home_path)?;
    for (path, contents) in TUTORIAL_FILES {
        add_file_at(fs, &format!("{}/{}", home_path, path), contents.as_bytes())?;
    }
    let trash = fs.add_dir(home, "Trash")?;
    tracing::debug!(home = %fs.path_of(home), "Tutorial world populated");
    Ok((home, trash))
}

fn add_file_at(fs: &mut FileSystem, path: &str, contents: &[u8]) -> Result<NodeId> {
    let (dir, name) = path.rsplit_once('/').unwrap_or(("", path));
    let dir = fs.make_dirs(dir)?;
    fs.add_file(dir, name, contents.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsystem::path::resolve;

    #[test]
    fn test_populate() {
        let mut fs = FileSystem::new();
        let (home, trash) = populate(&mut fs, "bob").unwrap();
        assert_eq!(fs.path_of(home), "/usr/bob");
        assert_eq!(fs.path_of(trash), "/usr/bob/Trash");
        let notes = resolve(&fs, home, "Documents/notes.txt").unwrap();
        assert_eq!(fs.get(notes).unwrap().bytes().unwrap(), b"Meeting moved to Thursday.\n");
        assert!(resolve(&fs, fs.root(), "etc/.shadow").is_some());
        assert!(fs.children(trash).is_empty());
    }

    #[test]
    fn test_populate_tutorial() {
        let mut fs = FileSystem::new();
        let (home, trash) = populate_tutorial(&mut fs, "bob").unwrap();
        assert_eq!(fs.path_of(home), "/usr/bob");
        assert_eq!(fs.path_of(trash), "/usr/bob/Trash");
        assert!(resolve(&fs, home, "lesson1/draft.txt").is_some());
        assert!(resolve(&fs, fs.root(), "etc").is_none());
        let files = fs.ids().filter(|&id| fs.get(id).unwrap().is_normal_file()).count();
        assert_eq!(files, 5);
    }
}
