//! Sprite spawners.
//!
//! Each spawner checks the entity ceiling from [`GameConfig`], builds the
//! [`Sprite`] in sub-grid units and registers it in the [`SpatialGrid`]
//! straight away so that it is visible to queries before the next tick.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::actor::Actor;
use crate::components::sprite::{Rgb, ShapeKind, SpawnOrder, SpawnSequence, Sprite, VirtRect, Visual};
use crate::components::stats::Stats;
use crate::components::tag::{SpriteName, Tag};
use crate::error::{EngineError, EngineResult};
use crate::resources::assetstore::AssetStore;
use crate::resources::gameconfig::GameConfig;
use crate::resources::grid::{Cell, SpatialGrid};
use crate::resources::inventory::InventoryRegistry;
use crate::resources::rng::SimRng;

/// Largest image size in cells.
pub const MAX_SIZE: f32 = 35.0;

/// Where a new sprite goes, in grid units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Placement {
    /// Top-left corner.
    At(f32, f32),
    Center(f32, f32),
    /// A random free cell that leaves room for the sprite's size.
    #[default]
    Random,
}

impl From<Cell> for Placement {
    fn from(cell: Cell) -> Self {
        Placement::At(cell.0 as f32, cell.1 as f32)
    }
}

#[derive(Clone, Debug)]
pub struct ImageSpec {
    pub name: String,
    pub placement: Placement,
    /// Longest side in cells.
    pub size: f32,
    pub tag: Option<String>,
}

impl ImageSpec {
    pub fn new(name: impl Into<String>) -> Self {
        ImageSpec {
            name: name.into(),
            placement: Placement::Random,
            size: 1.0,
            tag: None,
        }
    }

    pub fn at(mut self, placement: impl Into<Placement>) -> Self {
        self.placement = placement.into();
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct ShapeSpec {
    pub kind: ShapeKind,
    pub color: Rgb,
    pub placement: Placement,
    /// Width and height in cells.
    pub size: (f32, f32),
    pub outline: u32,
    pub tag: Option<String>,
}

impl ShapeSpec {
    pub fn new(kind: ShapeKind, color: Rgb) -> Self {
        ShapeSpec {
            kind,
            color,
            placement: Placement::Random,
            size: (1.0, 1.0),
            outline: 0,
            tag: None,
        }
    }

    pub fn at(mut self, placement: impl Into<Placement>) -> Self {
        self.placement = placement.into();
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_outline(mut self, outline: u32) -> Self {
        self.outline = outline;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct ActorSpec {
    pub name: String,
    pub placement: Placement,
    pub size: f32,
    pub abortable: bool,
    pub tag: Option<String>,
}

impl ActorSpec {
    pub fn new(name: impl Into<String>) -> Self {
        ActorSpec {
            name: name.into(),
            placement: Placement::Random,
            size: 1.0,
            abortable: false,
            tag: None,
        }
    }

    pub fn at(mut self, placement: impl Into<Placement>) -> Self {
        self.placement = placement.into();
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_abortable(mut self, abortable: bool) -> Self {
        self.abortable = abortable;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct TextSpec {
    pub text: String,
    pub color: Rgb,
    /// Top-left in grid units; `None` centres the text.
    pub pos: Option<(f32, f32)>,
    /// Font height in cells.
    pub size: f32,
    pub tag: Option<String>,
}

impl TextSpec {
    pub fn new(text: impl Into<String>, color: Rgb) -> Self {
        TextSpec {
            text: text.into(),
            color,
            pos: None,
            size: 1.0,
            tag: None,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.pos = Some((x, y));
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Number of live sprites.
pub fn sprite_count(world: &mut World) -> usize {
    world.query::<&Sprite>().iter(world).count()
}

fn check_ceiling(world: &mut World) -> EngineResult<()> {
    let limit = world.get_resource::<GameConfig>().map_or(9000, |c| c.max_entities);
    if sprite_count(world) >= limit {
        return Err(EngineError::TooManyEntities { limit });
    }
    Ok(())
}

fn grid_size(world: &World) -> f32 {
    world.get_resource::<SpatialGrid>().map_or(50.0, |g| g.grid_size)
}

/// Top-left corner in pixels for a `w` x `h` pixel sprite.
fn resolve_placement(world: &mut World, placement: Placement, cells: (f32, f32), w: f32, h: f32) -> (f32, f32) {
    let grid = grid_size(world);
    match placement {
        Placement::At(x, y) => (x * grid, y * grid),
        Placement::Center(x, y) => (x * grid - w / 2.0, y * grid - h / 2.0),
        Placement::Random => {
            let count = sprite_count(world);
            let cell = world.resource_scope(|world, mut rng: Mut<SimRng>| {
                world.resource::<SpatialGrid>().random_free_position(
                    &mut rng,
                    cells.0 - 1.0,
                    cells.1 - 1.0,
                    count,
                )
            });
            (cell.0 as f32 * grid, cell.1 as f32 * grid)
        }
    }
}

/// Scale `(w, h)` pixels so the longer side spans `size` cells.
fn fit(size: f32, w: u32, h: u32, grid: f32) -> (f32, f32) {
    let (w, h) = (w.max(1) as f32, h.max(1) as f32);
    if w >= h {
        let nw = size * grid;
        (nw, h * (nw / w))
    } else {
        let nh = size * grid;
        (w * (nh / h), nh)
    }
}

fn insert_sprite(world: &mut World, sprite: Sprite, tag: Option<String>, name: Option<String>) -> Entity {
    let origin = sprite.pos();
    let (w, h) = (sprite.width(), sprite.height());
    let order = world.get_resource_or_init::<SpawnSequence>().next();
    let mut entity = world.spawn((sprite, order));
    if let Some(name) = name {
        entity.insert(SpriteName(name));
    }
    let tag = tag.filter(|t| !t.is_empty()).map(Tag);
    if let Some(t) = &tag {
        entity.insert(t.clone());
    }
    let id = entity.id();
    if let Some(mut grid) = world.get_resource_mut::<SpatialGrid>() {
        grid.register(id, tag.as_ref(), origin, w, h);
    }
    id
}

pub fn image(world: &mut World, spec: ImageSpec) -> EngineResult<Entity> {
    check_ceiling(world)?;
    let grid = grid_size(world);
    let info = world.resource_mut::<AssetStore>().image(&spec.name);
    let size = spec.size.min(MAX_SIZE);
    let (w, h) = fit(size, info.width, info.height, grid);
    let (x, y) = resolve_placement(world, spec.placement, (size, size), w, h);
    let sprite = Sprite::new(Visual::Image(info.key), VirtRect::new(x, y, w, h), grid);
    let id = insert_sprite(world, sprite, spec.tag, Some(spec.name));
    debug!("spawned image {:?}", id);
    Ok(id)
}

pub fn shape(world: &mut World, spec: ShapeSpec) -> EngineResult<Entity> {
    check_ceiling(world)?;
    let grid = grid_size(world);
    let (cw, ch) = match spec.kind {
        ShapeKind::Circle => (spec.size.0, spec.size.0),
        _ => spec.size,
    };
    let (w, h) = (cw * grid, ch * grid);
    let (x, y) = resolve_placement(world, spec.placement, (cw, ch), w, h);
    let visual = Visual::Shape {
        kind: spec.kind,
        color: spec.color,
        outline: spec.outline,
    };
    let sprite = Sprite::new(visual, VirtRect::new(x, y, w, h), grid);
    Ok(insert_sprite(world, sprite, spec.tag, None))
}

/// Spawn an actor. Fails with [`EngineError::MalformedActor`] when its
/// sheet cannot be used.
pub fn actor(world: &mut World, spec: ActorSpec) -> EngineResult<Entity> {
    check_ceiling(world)?;
    let grid = grid_size(world);
    let frames = world.resource_mut::<AssetStore>().actor(&spec.name)?;
    let actor = Actor::new(spec.name.clone(), frames, String::new());
    let first = actor.current_frame().cloned().ok_or_else(|| EngineError::MalformedActor {
        name: spec.name.clone(),
        reason: "no idle frame".into(),
    })?;
    let (w, h) = fit(spec.size, first.width, first.height, grid);
    let (x, y) = resolve_placement(world, spec.placement, (spec.size, spec.size), w, h);
    let sprite = Sprite::new(Visual::Image(first.key), VirtRect::new(x, y, w, h), grid).with_abortable(spec.abortable);

    let tag = spec.tag.clone();
    let id = insert_sprite(world, sprite, spec.tag, Some(spec.name));
    let key = InventoryRegistry::key_for(tag.as_deref(), id);
    world.resource_mut::<InventoryRegistry>().get_or_create(&key);
    let mut actor = actor;
    actor.inventory = key;
    world.entity_mut(id).insert((actor, Stats::default()));
    debug!("spawned actor {:?}", id);
    Ok(id)
}

pub fn text(world: &mut World, spec: TextSpec) -> EngineResult<Entity> {
    check_ceiling(world)?;
    let grid = grid_size(world);
    let font = (spec.size * grid).max(1.0);
    // No font metrics here: assume half-square glyphs.
    let w = font * 0.5 * spec.text.chars().count().max(1) as f32;
    let h = font;
    let (x, y) = match spec.pos {
        Some((x, y)) => (x * grid, y * grid),
        None => {
            let (pw, ph) = world
                .get_resource::<GameConfig>()
                .map_or((800.0, 800.0), |c| (c.width as f32, c.height as f32));
            (pw / 2.0 - w / 2.0, ph / 2.0 - h / 2.0)
        }
    };
    let visual = Visual::Text {
        text: spec.text,
        color: spec.color,
    };
    let sprite = Sprite::new(visual, VirtRect::new(x, y, w, h), grid);
    Ok(insert_sprite(world, sprite, spec.tag, None))
}

/// Remove a sprite. Its grid entries disappear on the next registration.
pub fn destroy(world: &mut World, entity: Entity) -> bool {
    if world.get::<Sprite>(entity).is_none() {
        return false;
    }
    debug!("destroying {:?}", entity);
    world.despawn(entity)
}

/// Sprites carrying `tag`, in spawn order.
pub fn entities_with_tag(world: &mut World, tag: &str) -> Vec<Entity> {
    let mut out: Vec<(u64, Entity)> = world
        .query_filtered::<(Entity, &Tag, Option<&SpawnOrder>), With<Sprite>>()
        .iter(world)
        .filter(|(_, t, _)| t.as_str() == tag)
        .map(|(e, _, order)| SpawnOrder::key(order, e))
        .collect();
    out.sort();
    out.into_iter().map(|(_, e)| e).collect()
}

/// Whether any of `entities` carries `tag`.
pub fn has_tag(world: &World, entities: &[Entity], tag: &str) -> bool {
    entities
        .iter()
        .any(|&e| world.get::<Tag>(e).is_some_and(|t| t.as_str() == tag))
}

/// Spawn into free in-bounds cells, each with probability `prob`.
pub fn fill(
    world: &mut World,
    prob: f32,
    mut spawner: impl FnMut(&mut World, Cell) -> EngineResult<Entity>,
) -> EngineResult<Vec<Entity>> {
    let cells = world.resource::<SpatialGrid>().free_cells();
    let mut out = Vec::new();
    for cell in cells {
        let roll = world.resource_mut::<SimRng>().f32();
        if roll > prob {
            continue;
        }
        if !world.resource::<SpatialGrid>().is_empty_at(cell) {
            continue;
        }
        out.push(spawner(world, cell)?);
    }
    Ok(out)
}
