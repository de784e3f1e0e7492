//! Save files on disk.
//!
//! The encoding follows the extension: `.ron` is text, anything else is
//! bincode.

use std::path::Path;

use dominion_core::game::Game;
use dominion_core::save::SaveGame;

use crate::error::{Result, ToolError};

fn is_ron(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ron"))
}

/// Write `game` to `path`.
pub fn save_to_file(game: &Game, path: &Path) -> Result<()> {
    let save = game.save();
    let bytes = if is_ron(path) {
        save.to_ron()?.into_bytes()
    } else {
        save.to_bytes()?
    };
    std::fs::write(path, bytes).map_err(|e| ToolError::io(path, e))?;
    tracing::info!(path = %path.display(), "Game saved");
    Ok(())
}

/// Read a save from `path` without rebuilding the game.
pub fn read_save(path: &Path) -> Result<SaveGame> {
    let bytes = std::fs::read(path).map_err(|e| ToolError::io(path, e))?;
    let save = if is_ron(path) {
        let text = String::from_utf8(bytes).map_err(|e| {
            ToolError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        SaveGame::from_ron(&text)?
    } else {
        SaveGame::from_bytes(&bytes)?
    };
    Ok(save)
}

/// Load a game from `path`.
pub fn load_from_file(path: &Path) -> Result<Game> {
    let game = Game::load(read_save(path)?)?;
    Ok(game)
}
