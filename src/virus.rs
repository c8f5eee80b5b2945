use rand::seq::SliceRandom;
use rand::Rng;

use crate::console::Console;
use crate::errors::Result;
use crate::fsystem::NodeId;

const VIRUS_MAGIC: &[u8] = b"VIR!";

const DISGUISES: &[&str] = &[
    "update", "cache", "sysd", "kpatch", "tmp", "swap", "daemon", "index", "thumb", "session",
];

const EXTENSIONS: &[&str] = &["dat", "bin", "tmp", "log"];

pub(crate) const INCORRECT_DELETION: &str =
    "rm: Incorrect virus file deleted: File moved to new location; New file spawned";

// Marker, index as big endian u32, then noise. `cat` reveals the index.
pub fn virus_bytes<R: Rng>(rng: &mut R, index: u32) -> Vec<u8> {
    let mut bytes = VIRUS_MAGIC.to_vec();
    bytes.extend_from_slice(&index.to_be_bytes());
    let noise = rng.gen_range(8..24);
    bytes.extend((0..noise).map(|_| rng.gen::<u8>()));
    bytes
}

fn virus_name<R: Rng>(rng: &mut R) -> String {
    let stem = DISGUISES.choose(rng).copied().unwrap_or("update");
    let ext = EXTENSIONS.choose(rng).copied().unwrap_or("dat");
    format!("{}_{:04x}.{}", stem, rng.gen::<u16>(), ext)
}

fn live_directories(console: &Console) -> Vec<NodeId> {
    console
        .fs
        .ids()
        .filter(|&id| console.fs.is_dir(id) && console.is_live(id))
        .collect()
}

pub fn spawn(console: &mut Console) -> Result<NodeId> {
    let dirs = live_directories(console);
    let dir = dirs
        .choose(&mut console.rng)
        .copied()
        .unwrap_or_else(|| console.fs.root());
    let index = console.save.issue_virus_index();
    let name = virus_name(&mut console.rng);
    let name = console.fs.free_name(dir, &name);
    let bytes = virus_bytes(&mut console.rng, index);
    let id = console.fs.add_virus(dir, &name, bytes, index)?;
    tracing::info!(index, path = %console.fs.path_of(id), "Spawned virus file");
    Ok(id)
}

// Avoids the virus's own directory and the player's when there is anywhere else.
fn relocate(console: &mut Console, id: NodeId) -> Result<()> {
    let here = console.fs.parent(id);
    let current = console.current_dir();
    let dirs = live_directories(console);
    let away: Vec<NodeId> = dirs
        .iter()
        .copied()
        .filter(|&dir| Some(dir) != here && dir != current)
        .collect();
    let pool = if away.is_empty() { &dirs } else { &away };
    let dir = pool
        .choose(&mut console.rng)
        .copied()
        .unwrap_or_else(|| console.fs.root());
    console.fs.relocate(id, dir)?;
    tracing::info!(path = %console.fs.path_of(id), "Relocated virus file");
    Ok(())
}

pub(crate) fn delete_virus(console: &mut Console, id: NodeId) -> Result<String> {
    let entry = console.fs.entry(id)?;
    let index = entry.virus_index().unwrap_or_default();
    let expected = console.save.expected_virus_index();
    if index != expected {
        tracing::info!(index, expected, "Incorrect virus file deleted");
        relocate(console, id)?;
        spawn(console)?;
        console.save.increase_speed();
        return Ok(INCORRECT_DELETION.to_string());
    }
    let path = console.fs.path_of(id);
    console.fs.remove(id)?;
    console.save.record_virus_removed();
    tracing::info!(index, %path, "Virus file removed");
    Ok(format!("rm: Successful deletion: {} removed", path))
}

// The log entry names the directory the virus is hiding in, which is what
// `trace` leads the player to.
pub(crate) fn tick(console: &mut Console) -> Result<Option<String>> {
    let mut viruses = Vec::new();
    let mut victims = Vec::new();
    for id in console.fs.ids() {
        if !console.is_live(id) {
            continue;
        }
        let entry = console.fs.entry(id)?;
        if entry.virus_index().is_some() {
            viruses.push(id);
        } else if entry.is_normal_file() {
            victims.push(id);
        }
    }
    let Some(&virus) = viruses.choose(&mut console.rng) else {
        return Ok(None);
    };
    let lair = console.fs.parent(virus).unwrap_or_else(|| console.fs.root());
    let nearby: Vec<NodeId> = victims
        .iter()
        .copied()
        .filter(|&id| console.fs.parent(id) == Some(lair))
        .collect();
    let pool = if nearby.is_empty() { &victims } else { &nearby };
    let Some(&victim) = pool.choose(&mut console.rng) else {
        return Ok(None);
    };
    let path = console.fs.path_of(victim);
    let cause = format!("was deleted by a process in {}", console.fs.path_of(lair));
    let trash = console.save.trash();
    console.move_to_trash(victim, trash, &cause)?;
    console.save.file_destroyed();
    tracing::info!(%path, "Virus destroyed a file");
    Ok(Some(format!("{} was deleted by an unknown process", path)))
}
