use virus_hunt::fsystem::path::resolve;
use virus_hunt::fsystem::{FileSystem, NodeId};
use virus_hunt::{Console, GameConfig, GameStatus, Mode};

fn config() -> GameConfig {
    GameConfig {
        username: "alice".to_string(),
        seed: Some(42),
        ..GameConfig::default()
    }
}

struct Game {
    console: Console,
    home: NodeId,
    docs: NodeId,
    trash: NodeId,
}

fn game() -> Game {
    let mut fs = FileSystem::new();
    let home = fs.make_dirs("/usr/alice").unwrap();
    let trash = fs.add_dir(home, "Trash").unwrap();
    let docs = fs.add_dir(home, "docs").unwrap();
    fs.make_dirs("/var/log").unwrap();
    let etc = fs.make_dirs("/etc").unwrap();
    fs.add_file(etc, "notes.txt", b"hosts".to_vec()).unwrap();
    fs.add_file(docs, "notes.txt", b"meeting at noon".to_vec()).unwrap();
    fs.add_file(docs, "todo.txt", b"milk".to_vec()).unwrap();
    fs.add_file(home, "big.bin", (0u8..17).collect()).unwrap();
    fs.add_virus(docs, "virus_1.dat", vec![1], 1).unwrap();
    fs.add_virus(docs, "virus_7.dat", vec![7], 7).unwrap();
    let console = Console::from_parts(fs, config(), trash, home);
    Game {
        console,
        home,
        docs,
        trash,
    }
}

fn virus_indices(console: &Console) -> Vec<u32> {
    let mut indices: Vec<u32> = console
        .fs()
        .ids()
        .filter_map(|id| console.fs().get(id).and_then(|e| e.virus_index()))
        .collect();
    indices.sort();
    indices
}

#[test]
fn test_rm_sends_file_to_trash() {
    let mut g = game();
    g.console.run("cd", &["docs"]);
    let notes = g.console.fs().child(g.docs, "notes.txt").unwrap();
    assert!(g.console.run("rm", &["notes.txt"]).is_none());
    assert!(g.console.fs().child(g.docs, "notes.txt").is_none());
    assert_eq!(g.console.fs().child(g.trash, "notes.txt"), Some(notes));
    let log = g.console.save().deletion_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].path, "/usr/alice/docs/notes.txt");
}

#[test]
fn test_wrong_virus_relocates_and_spawns() {
    let mut g = game();
    g.console.run("cd", &["docs"]);
    let virus = g.console.fs().child(g.docs, "virus_7.dat").unwrap();
    let speed = g.console.save().speed();

    let reply = g.console.run("rm", &["virus_7.dat"]).unwrap();

    assert_eq!(
        reply,
        "rm: Incorrect virus file deleted: File moved to new location; New file spawned"
    );
    assert!(g.console.fs().contains(virus));
    assert_ne!(g.console.fs().parent(virus), Some(g.docs));
    assert_eq!(virus_indices(&g.console), vec![1, 7, 8]);
    assert!(g.console.save().speed() < speed);
    assert_eq!(g.console.save().virus_removed(), 0);
}

#[test]
fn test_right_virus_is_destroyed() {
    let mut g = game();
    g.console.run("cd", &["docs"]);
    let virus = g.console.fs().child(g.docs, "virus_1.dat").unwrap();

    let reply = g.console.run("rm", &["virus_1.dat"]).unwrap();

    assert_eq!(reply, "rm: Successful deletion: /usr/alice/docs/virus_1.dat removed");
    assert!(!g.console.fs().contains(virus));
    assert!(g.console.fs().children(g.trash).is_empty());
    assert_eq!(g.console.save().virus_removed(), 1);
    assert_eq!(virus_indices(&g.console), vec![7]);
}

#[test]
fn test_restore_everything() {
    let mut g = game();
    g.console.run("cd", &["docs"]);
    g.console.run("rm", &["notes.txt"]);
    g.console.run("rm", &["todo.txt"]);
    g.console.run("cd", &["Trash"]);
    assert_eq!(g.console.current_dir(), g.trash);

    let reply = g.console.run("restore", &["*"]).unwrap();

    assert_eq!(
        reply,
        "notes.txt restored to /usr/alice/docs/notes.txt\ntodo.txt restored to /usr/alice/docs/todo.txt"
    );
    assert!(g.console.fs().children(g.trash).is_empty());
    assert!(resolve(g.console.fs(), g.home, "docs/notes.txt").is_some());
    assert_eq!(g.console.save().files_restored(), 2);
    g.console.run("cd", &[".."]);
    assert_eq!(g.console.current_dir(), g.docs);
}

#[test]
fn test_same_name_twice_is_traced_twice() {
    let mut g = game();
    g.console.run("cd", &["docs"]);
    g.console.run("rm", &["notes.txt"]);
    g.console.run("cd", &["Trash"]);
    g.console.run("restore", &["notes.txt"]);
    g.console.run("cd", &[".."]);
    g.console.run("rm", &["notes.txt"]);
    g.console.run("cd", &["Trash"]);
    let out = g.console.run("trace", &["notes.txt"]).unwrap();
    assert_eq!(out.lines().count(), 2);
    assert!(out
        .lines()
        .all(|line| line.ends_with("/usr/alice/docs/notes.txt was removed by alice")));
}

#[test]
fn test_cat_seventeen_bytes() {
    let mut g = game();
    let out = g.console.run("cat", &["big.bin"]).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].split(' ').count(), 16);
    assert_eq!(lines[1], "10");
}

#[test]
fn test_trash_clash_keeps_both() {
    let mut g = game();
    g.console.run("cd", &["docs"]);
    g.console.run("rm", &["notes.txt"]);
    g.console.run("cd", &["/etc"]);
    g.console.run("rm", &["notes.txt"]);
    let names: Vec<&str> = g
        .console
        .fs()
        .children(g.trash)
        .into_iter()
        .map(|id| g.console.fs().name(id))
        .collect();
    assert_eq!(names, vec!["notes.txt", "notes.txt~1"]);

    g.console.run("cd", &["Trash"]);
    let out = g.console.run("trace", &["notes.txt~1"]).unwrap();
    assert_eq!(out.lines().count(), 2);
    assert_eq!(
        g.console.run("restore", &["notes.txt~1"]).unwrap(),
        "notes.txt restored to /etc/notes.txt"
    );
}

#[test]
fn test_play_until_won() {
    let mut console = Console::new(config(), Mode::Play).unwrap();
    let mut guard = 0;
    while console.status() == GameStatus::Playing {
        guard += 1;
        assert!(guard < 100, "game did not finish");
        let expected = console.save().expected_virus_index();
        let target = console
            .fs()
            .ids()
            .find(|&id| console.fs().get(id).and_then(|e| e.virus_index()) == Some(expected))
            .expect("expected virus is somewhere in the tree");
        let dir = console.fs().parent(target).unwrap();
        let dir_path = console.fs().path_of(dir);
        let name = console.fs().name(target).to_string();
        assert!(console.run("cd", &[dir_path.as_str()]).is_none());
        let reply = console.run("rm", &[name.as_str()]).unwrap();
        assert!(reply.starts_with("rm: Successful deletion: "));
    }
    assert_eq!(console.status(), GameStatus::Won);
    assert_eq!(console.save().virus_removed(), 5);
    let report = console.run("mntr", &[]).unwrap();
    assert!(report.contains("virus files deleted: 5"));
}

#[test]
fn test_recursive_rm_never_trashes_a_virus() {
    let mut g = game();
    assert!(g.console.run("rm", &["-r", "docs"]).is_none());
    assert_eq!(virus_indices(&g.console), vec![1, 7]);
    for id in g.console.fs().ids() {
        if g.console.fs().get(id).and_then(|e| e.virus_index()).is_some() {
            assert!(g.console.is_live(id));
            assert_eq!(g.console.fs().parent(id), Some(g.home));
        }
    }
    assert_eq!(
        g.console.run("rm", &["virus_1.dat"]).unwrap(),
        "rm: Successful deletion: /usr/alice/virus_1.dat removed"
    );
}
