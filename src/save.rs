use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::fsystem::NodeId;

/// One removal of a non-virus file, kept so `trace` can tell the player where
/// a file came from and who removed it.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub message: String,
}

/// Progress of a single game.
#[derive(Debug)]
pub struct Save {
    id: Uuid,
    username: String,
    trash: NodeId,
    virus_removed: u32,
    next_virus_index: u32,
    speed: f64,
    min_speed: f64,
    speed_factor: f64,
    deletion_log: Vec<LogEntry>,
    tracked: BTreeMap<usize, NodeId>,
    files_destroyed: u32,
    files_restored: u32,
}

impl Save {
    pub fn new(config: &GameConfig, trash: NodeId) -> Save {
        Save {
            id: Uuid::new_v4(),
            username: config.username.clone(),
            trash,
            virus_removed: 0,
            next_virus_index: 1,
            speed: config.initial_speed,
            min_speed: config.min_speed,
            speed_factor: config.speed_factor,
            deletion_log: Vec::new(),
            tracked: BTreeMap::new(),
            files_destroyed: 0,
            files_restored: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn trash(&self) -> NodeId {
        self.trash
    }

    pub fn virus_removed(&self) -> u32 {
        self.virus_removed
    }

    /// The only virus index that may be deleted next.
    pub fn expected_virus_index(&self) -> u32 {
        self.virus_removed + 1
    }

    pub fn record_virus_removed(&mut self) {
        self.virus_removed += 1;
    }

    /// Hand out the index for a newly spawned virus file.
    pub fn issue_virus_index(&mut self) -> u32 {
        let index = self.next_virus_index;
        self.next_virus_index += 1;
        index
    }

    /// Make sure `index` is never handed out again.
    pub fn reserve_virus_index(&mut self, index: u32) {
        self.next_virus_index = self.next_virus_index.max(index + 1);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Shorten the interval between virus actions.
    pub fn increase_speed(&mut self) {
        self.speed = (self.speed * self.speed_factor).max(self.min_speed);
        tracing::info!(speed = self.speed, "Virus sped up");
    }

    pub fn log_deletion(&mut self, path: String, message: &str) -> &LogEntry {
        let timestamp = Utc::now();
        let entry = LogEntry {
            sequence: self.deletion_log.len() as u64,
            timestamp,
            message: format!("[{}] {}", timestamp.format("%H:%M:%S"), message),
            path,
        };
        self.deletion_log.push(entry);
        &self.deletion_log[self.deletion_log.len() - 1]
    }

    pub fn deletion_log(&self) -> &[LogEntry] {
        &self.deletion_log
    }

    // Slots are sparse; any number the player types is a valid key.
    pub fn track(&mut self, slot: usize, id: NodeId) {
        self.tracked.insert(slot, id);
    }

    pub fn tracked(&self) -> &BTreeMap<usize, NodeId> {
        &self.tracked
    }

    pub fn files_destroyed(&self) -> u32 {
        self.files_destroyed
    }

    pub fn file_destroyed(&mut self) {
        self.files_destroyed += 1;
    }

    pub fn files_restored(&self) -> u32 {
        self.files_restored
    }

    pub fn restored_file(&mut self) {
        self.files_restored += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsystem::FileSystem;

    fn save() -> Save {
        let mut fs = FileSystem::new();
        let trash = fs.add_detached_dir("Trash");
        Save::new(&GameConfig::default(), trash)
    }

    #[test]
    fn test_speed_has_a_floor() {
        let mut save = save();
        assert_eq!(save.speed(), 60.0);
        save.increase_speed();
        assert_eq!(save.speed(), 45.0);
        for _ in 0..50 {
            save.increase_speed();
        }
        assert_eq!(save.speed(), 5.0);
    }

    #[test]
    fn test_virus_indices() {
        let mut save = save();
        assert_eq!(save.expected_virus_index(), 1);
        assert_eq!(save.issue_virus_index(), 1);
        assert_eq!(save.issue_virus_index(), 2);
        save.record_virus_removed();
        assert_eq!(save.expected_virus_index(), 2);
    }

    #[test]
    fn test_log_is_append_only() {
        let mut save = save();
        save.log_deletion("/a".to_string(), "first");
        let entry = save.log_deletion("/b".to_string(), "second");
        assert_eq!(entry.sequence, 1);
        assert!(entry.message.ends_with("] second"));
        let paths: Vec<&str> = save.deletion_log().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
    }

    #[test]
    fn test_tracking_is_sparse() {
        let mut save = save();
        let mut fs = FileSystem::new();
        let dir = fs.add_dir(fs.root(), "d").unwrap();
        save.track(3, dir);
        save.track(usize::MAX, dir);
        save.track(0, dir);
        assert_eq!(save.tracked().len(), 3);
        let slots: Vec<usize> = save.tracked().keys().copied().collect();
        assert_eq!(slots, vec![0, 3, usize::MAX]);
        assert_eq!(save.tracked().get(&3), Some(&dir));
        assert!(save.tracked().get(&1).is_none());
    }
}
