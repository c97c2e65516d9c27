//! ASCII map renderer for quick terminal review.
//!
//! Each cell is two characters wide; odd rows are shifted right by one
//! character so the offset hex layout reads correctly. Territory centers
//! show their dice count.

use std::fmt::Write;

use hexdice_core::map_generation::GeneratedMap;
use hexdice_core::player::PlayerId;
use hexdice_core::territory::TerritoryId;

/// ASCII visualization configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Use colored output (ANSI).
    pub use_color: bool,
    /// Show the per-player legend.
    pub show_legend: bool,
    /// Print dice counts on territory centers.
    pub show_dice: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            show_legend: true,
            show_dice: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const GRAY: &str = "\x1b[90m";

    pub const PLAYERS: [&str; 8] = [
        "\x1b[31m", // red
        "\x1b[34m", // blue
        "\x1b[32m", // green
        "\x1b[33m", // yellow
        "\x1b[35m", // magenta
        "\x1b[36m", // cyan
        "\x1b[37m", // white
        "\x1b[91m", // bright red
    ];
}

/// Glyph for a player's territory cells.
fn player_glyph(player: Option<PlayerId>) -> char {
    const GLYPHS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
    player
        .and_then(|p| GLYPHS.get(p.index()).copied())
        .unwrap_or('?')
}

fn player_color(player: Option<PlayerId>) -> &'static str {
    player
        .and_then(|p| colors::PLAYERS.get(p.index()).copied())
        .unwrap_or(colors::RESET)
}

/// Render a map as ASCII art.
pub fn render_map(map: &GeneratedMap, config: &AsciiConfig) -> String {
    let mut out = String::new();
    let width = map.grid.width();

    for y in 0..map.grid.height() {
        if y % 2 == 1 {
            out.push(' ');
        }
        for x in 0..width {
            let Some(cell) = map.grid.index(x, y) else {
                continue;
            };
            let id = map.cell_territory(cell);
            out.push_str(&render_cell(map, id, cell, config));
        }
        out.push('\n');
    }

    if config.show_legend {
        out.push('\n');
        out.push_str(&render_legend(map, config));
    }
    out
}

fn render_cell(map: &GeneratedMap, id: TerritoryId, cell: usize, config: &AsciiConfig) -> String {
    let Some(territory) = map.territories.get(id).filter(|t| t.exists()) else {
        return if config.use_color {
            format!("{}. {}", colors::GRAY, colors::RESET)
        } else {
            ". ".to_string()
        };
    };

    let glyph = if config.show_dice && territory.center == Some(cell) {
        char::from_digit(u32::from(territory.dice), 10).unwrap_or('#')
    } else {
        player_glyph(territory.owner)
    };

    if config.use_color {
        let bold = if territory.center == Some(cell) {
            colors::BOLD
        } else {
            ""
        };
        format!(
            "{}{bold}{glyph} {}",
            player_color(territory.owner),
            colors::RESET
        )
    } else {
        format!("{glyph} ")
    }
}

/// Per-player summary lines.
pub fn render_legend(map: &GeneratedMap, config: &AsciiConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} territories, {} players, seed {}",
        map.territory_count(),
        map.players.len(),
        map.seed.map_or_else(|| "-".to_string(), |s| s.to_string())
    );
    for player in map.players.iter() {
        let (color, reset) = if config.use_color {
            (player_color(Some(player.id)), colors::RESET)
        } else {
            ("", "")
        };
        let _ = writeln!(
            out,
            "{color}{}{reset} player {}: {} territories, {} dice, largest group {}",
            player_glyph(Some(player.id)),
            player.id,
            player.territory_count,
            player.dice_total,
            player.largest_connected_group
        );
    }
    let order: Vec<String> = map.turn_order.iter().map(ToString::to_string).collect();
    let _ = writeln!(out, "turn order: {}", order.join(" "));
    out
}
