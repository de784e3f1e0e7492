//! ASCII map rendering.
//!
//! Each hex prints as two characters, owner then resource, with rows offset
//! by half a cell so neighbors line up:
//!
//! ```text
//!     .f .w .g
//!    .m Hf .f .s
//!   ...
//! ```
//!
//! With `mark_homes`, home bases show `*` in the owner position. Strategic
//! points use an uppercase resource letter.

use std::fmt::Write;

use dominion_core::hex::HexCoord;
use dominion_core::players::PlayerId;
use dominion_core::resources::ResourceType;
use dominion_core::store::TerritoryStore;

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiConfig {
    /// Print `*` instead of the owner on home bases.
    pub mark_homes: bool,
    /// Append a legend.
    pub legend: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            mark_homes: true,
            legend: true,
        }
    }
}

/// Render every territory of `store`.
#[must_use]
pub fn render_ascii(store: &TerritoryStore, config: AsciiConfig) -> String {
    let radius = i32::try_from(store.grid().radius()).unwrap_or(0);
    let mut out = String::new();

    for r in -radius..=radius {
        let indent = usize::try_from(r.abs()).unwrap_or(0);
        out.push_str(&" ".repeat(indent));
        let q_min = (-radius).max(-r - radius);
        let q_max = radius.min(-r + radius);
        let cells: Vec<String> = (q_min..=q_max)
            .map(|q| match store.get_at(HexCoord::new(q, r)) {
                Some(t) => {
                    let owner = if config.mark_homes && t.is_home_base() {
                        '*'
                    } else {
                        owner_char(t.owner())
                    };
                    let kind = resource_char(t.resource_type());
                    let kind = if t.is_strategic() { kind.to_ascii_uppercase() } else { kind };
                    format!("{owner}{kind}")
                }
                None => "  ".to_string(),
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }

    if config.legend {
        let _ = writeln!(
            out,
            "\nowner: . neutral, H player, 1-3 opponents, * home base\n\
             resource: g gold, w wood, m metal, f food, s stone, - none (uppercase = strategic)"
        );
    }
    out
}

fn owner_char(owner: PlayerId) -> char {
    match owner {
        PlayerId::Neutral => '.',
        PlayerId::Human => 'H',
        PlayerId::Opponent(n) => char::from_digit(u32::from(n), 10).unwrap_or('?'),
    }
}

const fn resource_char(kind: ResourceType) -> char {
    match kind {
        ResourceType::Gold => 'g',
        ResourceType::Wood => 'w',
        ResourceType::Metal => 'm',
        ResourceType::Food => 'f',
        ResourceType::Stone => 's',
        ResourceType::None => '-',
    }
}
