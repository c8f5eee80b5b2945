use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::commands;
use crate::config::GameConfig;
use crate::errors::Result;
use crate::fsystem::{errors, FileSystem, NodeId};
use crate::save::Save;
use crate::{virus, world};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Menu,
    Play,
    Tutorial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Everything a command can see or change. One console per game.
pub struct Console {
    pub(crate) fs: FileSystem,
    pub(crate) save: Save,
    pub(crate) rng: StdRng,
    current: NodeId,
    previous: Option<NodeId>,
    mode: Mode,
    tutorial_trash: NodeId,
}

impl Console {
    /// Build the world for `mode`, scatter its viruses through it and start in
    /// the player's home directory. The tutorial gets a small fixed layout and
    /// only a couple of viruses.
    pub fn new(config: GameConfig, mode: Mode) -> Result<Console> {
        let mut fs = FileSystem::new();
        let ((home, trash), viruses) = match mode {
            Mode::Tutorial => (
                world::populate_tutorial(&mut fs, &config.username)?,
                world::TUTORIAL_VIRUS_COUNT,
            ),
            Mode::Play | Mode::Menu => (
                world::populate(&mut fs, &config.username)?,
                config.virus_count,
            ),
        };
        let mut console = Console::from_parts(fs, config, trash, home);
        console.mode = mode;
        for _ in 0..viruses {
            virus::spawn(&mut console)?;
        }
        tracing::info!(game = %console.save.id(), "Started new game");
        Ok(console)
    }

    /// Wrap an already built tree. Virus indices found in it are reserved so
    /// new spawns always get a higher one.
    pub fn from_parts(mut fs: FileSystem, config: GameConfig, trash: NodeId, start: NodeId) -> Console {
        let tutorial_trash = fs.add_detached_dir("Trash");
        let mut save = Save::new(&config, trash);
        let indices: Vec<u32> = fs
            .ids()
            .filter_map(|id| fs.get(id).and_then(|e| e.virus_index()))
            .collect();
        for index in indices {
            save.reserve_virus_index(index);
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Console {
            fs,
            save,
            rng,
            current: start,
            previous: None,
            mode: Mode::Play,
            tutorial_trash,
        }
    }

    /// Run one line of player input.
    pub fn execute(&mut self, line: &str) -> Option<String> {
        let mut words = line.split_whitespace();
        let name = words.next()?;
        let args: Vec<&str> = words.collect();
        self.run(name, &args)
    }

    pub fn run(&mut self, name: &str, args: &[&str]) -> Option<String> {
        commands::run(self, name, args)
    }

    /// One autonomous virus action. Driven by the caller every `speed` seconds.
    pub fn tick(&mut self) -> Option<String> {
        match virus::tick(self) {
            Ok(notice) => notice,
            Err(e) => {
                tracing::error!("Virus tick failed: {}", e);
                None
            }
        }
    }

    pub fn fs(&self) -> &FileSystem {
        &self.fs
    }

    pub fn save(&self) -> &Save {
        &self.save
    }

    pub fn save_mut(&mut self) -> &mut Save {
        &mut self.save
    }

    pub fn current_dir(&self) -> NodeId {
        self.current
    }

    pub fn set_current_dir(&mut self, dir: NodeId) {
        self.current = dir;
    }

    pub fn previous_dir(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn set_previous_dir(&mut self, dir: Option<NodeId>) {
        self.previous = dir;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        tracing::info!(?mode, "Switching mode");
        self.mode = mode;
    }

    pub fn is_in_play(&self) -> bool {
        self.mode == Mode::Play
    }

    pub fn is_in_tutorial(&self) -> bool {
        self.mode == Mode::Tutorial
    }

    pub fn is_in_game(&self) -> bool {
        self.is_in_play() || self.is_in_tutorial()
    }

    /// The trash bin removals go to in the current mode.
    pub fn trash(&self) -> NodeId {
        if self.is_in_tutorial() {
            self.tutorial_trash
        } else {
            self.save.trash()
        }
    }

    pub fn tutorial_trash(&self) -> NodeId {
        self.tutorial_trash
    }

    pub fn home(&self) -> Option<NodeId> {
        let usr = self.fs.child(self.fs.root(), "usr")?;
        self.fs
            .child(usr, self.save.username())
            .filter(|&home| self.fs.is_dir(home))
    }

    pub fn in_any_trash(&self, id: NodeId) -> bool {
        self.fs.is_within(id, self.save.trash()) || self.fs.is_within(id, self.tutorial_trash)
    }

    /// Reachable from the root and not sitting in a trash bin.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.fs.contains(id) && self.fs.is_within(id, self.fs.root()) && !self.in_any_trash(id)
    }

    pub fn status(&self) -> GameStatus {
        let mut viruses = 0;
        let mut files = 0;
        for id in self.fs.ids() {
            let Some(entry) = self.fs.get(id) else { continue };
            if entry.virus_index().is_some() {
                viruses += 1;
            } else if entry.is_normal_file() && self.is_live(id) {
                files += 1;
            }
        }
        if viruses == 0 {
            GameStatus::Won
        } else if files == 0 {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        }
    }

    /// Move `id` into `trash`. The absolute path of `id` and of every normal
    /// file beneath it is stored on the node and in the deletion log, since
    /// the trash does not keep the old structure. Virus files never enter a
    /// trash bin: any found beneath `id` stay behind in its parent directory.
    /// Nothing is changed when the move is not possible.
    pub(crate) fn move_to_trash(
        &mut self,
        id: NodeId,
        trash: NodeId,
        cause: &str,
    ) -> errors::Result<()> {
        let Some(parent) = self.fs.parent(id) else {
            return Err(errors::FileSystemError::new(
                errors::FSErrorType::InvalidPath,
                format!("{} has no parent directory", self.fs.path_of(id)),
            ));
        };
        if self.holds_a_trash(id) || !self.fs.is_dir(trash) {
            return Err(errors::FileSystemError::new(
                errors::FSErrorType::InvalidPath,
                format!("Cannot move {} into the trash", self.fs.path_of(id)),
            ));
        }

        let mut captured = Vec::new();
        let mut viruses = Vec::new();
        for node in self.fs.descendants(id) {
            let entry = self.fs.entry(node)?;
            if entry.virus_index().is_some() {
                viruses.push(node);
            } else if node == id || entry.is_normal_file() {
                captured.push((node, self.fs.path_of(node)));
            }
        }
        for virus in viruses {
            let name = self.fs.relocate(virus, parent)?;
            tracing::info!(%name, dir = %self.fs.path_of(parent), "Virus file left out of the trash");
        }
        self.fs.relocate(id, trash)?;
        for (node, path) in captured {
            self.fs.set_origin(node, Some(path.clone()))?;
            let message = format!("{} {}", path, cause);
            self.save.log_deletion(path, &message);
        }
        Ok(())
    }

    // True if either trash bin sits at or beneath `id`.
    pub(crate) fn holds_a_trash(&self, id: NodeId) -> bool {
        self.fs.is_within(self.save.trash(), id) || self.fs.is_within(self.tutorial_trash, id)
    }
}
