use crate::{Grid, MoveInput, Player};
use tileworld_common::{Item, ItemKind};

/// The authoritative world state: terrain grid, items, and the player.
///
/// The player is mirrored into the item list as an [`ItemKind::Player`] item so
/// renderers see one uniform list. Items keep insertion order.
#[derive(Debug, Clone)]
pub struct World {
    grid: Grid,
    items: Vec<Item>,
    player: Player,
    /// Index of the player's mirror in `items`.
    player_item: usize,
}

impl World {
    /// Build a world. `items` must not contain a player; one is appended at
    /// the player's position.
    pub fn new(grid: Grid, items: Vec<Item>, player: Player) -> Self {
        let mut items: Vec<Item> = items
            .into_iter()
            .filter(|item| item.kind != ItemKind::Player)
            .collect();
        let player_item = items.len();
        items.push(Item {
            kind: ItemKind::Player,
            position: player.position,
        });
        Self {
            grid,
            items,
            player,
            player_item,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for terraforming between frames.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Read-only item list, including the player's mirror.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Add a non-player item. Player items are ignored.
    pub fn add_item(&mut self, item: Item) {
        if item.kind == ItemKind::Player {
            tracing::debug!("ignoring extra player item");
            return;
        }
        self.items.push(item);
    }

    /// Advance the player by one update step.
    pub fn update(&mut self, input: MoveInput, dt: f32) {
        self.player.update(input, dt);
        self.items[self.player_item].position = self.player.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tileworld_common::CellType;

    fn sample_world() -> World {
        World::new(
            Grid::new(4, 4, CellType::Grass),
            vec![Item::new(ItemKind::Tree, 1.0, 2.0)],
            Player::at(Vec2::new(0.5, 0.5)),
        )
    }

    #[test]
    fn player_is_mirrored_into_items() {
        let world = sample_world();
        assert_eq!(world.items().len(), 2);
        let player_items: Vec<_> = world
            .items()
            .iter()
            .filter(|i| i.kind == ItemKind::Player)
            .collect();
        assert_eq!(player_items.len(), 1);
        assert_eq!(player_items[0].position, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn update_moves_player_item() {
        let mut world = sample_world();
        world.update(
            MoveInput {
                right: true,
                ..MoveInput::default()
            },
            0.25,
        );
        let expected = Vec2::new(0.5 + world.player().speed * 0.25, 0.5);
        assert_eq!(world.player().position, expected);
        assert_eq!(world.items()[1].position, expected);
    }

    #[test]
    fn extra_players_are_dropped() {
        let mut world = World::new(
            Grid::new(1, 1, CellType::Grass),
            vec![Item::new(ItemKind::Player, 9.0, 9.0)],
            Player::default(),
        );
        world.add_item(Item::new(ItemKind::Player, 3.0, 3.0));
        world.add_item(Item::new(ItemKind::Box, 3.0, 3.0));
        assert_eq!(world.items().len(), 2);
        assert_eq!(world.items()[0].position, Vec2::ZERO);
    }

    #[test]
    fn terraform_through_grid_mut() {
        let mut world = sample_world();
        world.grid_mut().set_cell(0, 0, CellType::Sand).unwrap();
        assert_eq!(world.grid().cell(0, 0), Some(CellType::Sand));
    }
}
