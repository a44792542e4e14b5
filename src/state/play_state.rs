use anyhow::{Context, Result};
use cgmath::*;

use crate::{
    audio::Sfx,
    constants::{key, GRAVITY, LEVEL_COUNT, WORLD_HEIGHT, WORLD_WIDTH},
    entities::{Hero, Spider},
    entity::Entity,
    event_dispatch::Dispatcher,
    geom::Bounds,
    input::Controls,
    level::{LevelCache, LevelData, PlatformData, Position},
    sprite::{
        animation::Animation,
        collision::{self, World},
        rendering::{DrawList, Layer},
        Sprite,
    },
    tween::{Easing, Tween},
};

use super::{events::Event, hud::Hud};

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

fn spawn_platform(platform: &PlatformData) -> Result<(Sprite, [Sprite; 2])> {
    let mut sprite = Sprite::new(&platform.image, platform.x, platform.y)?;
    let body = sprite.enable_body();
    body.allow_gravity = false;
    body.immovable = true;

    let walls = [
        spawn_enemy_wall(platform.x, platform.y, Side::Left)?,
        spawn_enemy_wall(platform.x + sprite.width(), platform.y, Side::Right)?,
    ];
    Ok((sprite, walls))
}

/// Invisible walls stand on the ends of each platform, keeping spiders from walking off.
fn spawn_enemy_wall(x: f32, y: f32, side: Side) -> Result<Sprite> {
    let anchor_x = match side {
        Side::Left => 1.0,
        Side::Right => 0.0,
    };
    let mut sprite = Sprite::new("invisible-wall", x, y)?.with_anchor(anchor_x, 1.0);
    sprite.visible = false;
    let body = sprite.enable_body();
    body.immovable = true;
    body.allow_gravity = false;
    Ok(sprite)
}

fn spawn_coin(coin: &Position) -> Result<Sprite> {
    let mut sprite = Sprite::new("coin", coin.x, coin.y)?.with_anchor(0.5, 0.5);
    sprite.enable_body().allow_gravity = false;
    sprite.animations.add(
        "rotate",
        Animation::new(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9], 10.0, true),
    );
    sprite.animations.play("rotate")?;
    Ok(sprite)
}

fn spawn_door(door: &Position) -> Result<Sprite> {
    let mut sprite = Sprite::new("door", door.x, door.y)?.with_anchor(0.5, 1.0);
    sprite.enable_body().allow_gravity = false;
    Ok(sprite)
}

/// The key floats a little above its spawn point and bobs up and down.
fn spawn_key(position: &Position) -> Result<(Sprite, Tween)> {
    let mut sprite = Sprite::new("key", position.x, position.y)?.with_anchor(0.5, 0.5);
    sprite.enable_body().allow_gravity = false;

    sprite.position.y -= key::BOB_LIFT;
    sprite.sync_body();
    let y = sprite.position.y;
    let tween = Tween::new(y, y + key::BOB_DISTANCE, key::BOB_DURATION, Easing::SineInOut)
        .yoyo(true)
        .looping(true);
    Ok((sprite, tween))
}

fn collide_sprites(a: &mut Sprite, b: &mut Sprite) -> bool {
    match (a.body.as_mut(), b.body.as_mut()) {
        (Some(a), Some(b)) => collision::collide(a, b),
        _ => false,
    }
}

fn overlap_sprites(a: &Sprite, b: &Sprite) -> bool {
    match (a.body(), b.body()) {
        (Some(a), Some(b)) => collision::overlap(a, b),
        _ => false,
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Everything spawned from a level file, in draw order.
#[derive(Debug, Clone)]
struct Stage {
    door: Sprite,
    key: Sprite,
    key_tween: Tween,
    platforms: Vec<Sprite>,
    coins: Vec<Sprite>,
    spiders: Vec<Spider>,
    enemy_walls: Vec<Sprite>,
    hero: Hero,
}

fn load_level(data: &LevelData) -> Result<Stage> {
    let mut platforms = Vec::with_capacity(data.platforms.len());
    let mut enemy_walls = Vec::with_capacity(data.platforms.len() * 2);
    for platform in &data.platforms {
        let (sprite, walls) = spawn_platform(platform)?;
        platforms.push(sprite);
        enemy_walls.extend(walls);
    }

    let spiders = data
        .spiders
        .iter()
        .map(|s| Spider::new(s.x, s.y))
        .collect::<Result<Vec<_>>>()?;
    let hero = Hero::new(data.hero.x, data.hero.y)?;

    let coins = data.coins.iter().map(spawn_coin).collect::<Result<Vec<_>>>()?;
    let door = spawn_door(&data.door)?;
    let (key, key_tween) = spawn_key(&data.key)?;

    Ok(Stage {
        door,
        key,
        key_tween,
        platforms,
        coins,
        spiders,
        enemy_walls,
        hero,
    })
}

// ---------------------------------------------------------------------------------------------------------------------

/// A single play-through of one level. Restarting, dying and advancing all build a fresh
/// PlayState; outcomes are reported through the Dispatcher.
#[derive(Debug, Clone)]
pub struct PlayState {
    level: u32,
    coin_pickup_count: u32,
    has_key: bool,
    world: World,
    background: Sprite,
    stage: Stage,
    hud: Hud,
}

impl PlayState {
    /// Wraps `level` into range and builds it from the cached level data.
    pub fn new(level: u32, levels: &LevelCache) -> Result<Self> {
        let level = Self::init(level);
        let data = levels.get(level);
        Self::create(level, data).with_context(|| format!("Unable to create level {}", level))
    }

    fn init(level: u32) -> u32 {
        level % LEVEL_COUNT
    }

    fn create(level: u32, data: &LevelData) -> Result<Self> {
        let background = Sprite::new("background", 0.0, 0.0)?;
        let stage = load_level(data)?;
        let hud = Hud::new()?;

        log::info!(
            "Level {}: {} platforms, {} spiders, {} coins",
            level,
            stage.platforms.len(),
            stage.spiders.len(),
            stage.coins.len()
        );

        Ok(Self {
            level,
            coin_pickup_count: 0,
            has_key: false,
            world: World::new(
                Bounds::from_xywh(0.0, 0.0, WORLD_WIDTH, WORLD_HEIGHT),
                vec2(0.0, GRAVITY),
            ),
            background,
            stage,
            hud,
        })
    }

    /// Advances the level by one frame.
    pub fn update(&mut self, dt: f32, controls: Controls, dispatcher: &mut Dispatcher) {
        // jump is decided on last frame's contacts, before they're reset
        if controls.jump {
            self.request_jump(dispatcher);
        }

        self.integrate(dt);

        self.stage.hero.animate(dt);
        for spider in &mut self.stage.spiders {
            spider.animate(dt);
        }
        for coin in &mut self.stage.coins {
            coin.animations.update(dt);
        }

        self.handle_collisions(dispatcher);
        self.handle_input(controls);

        self.hud.update(self.coin_pickup_count, self.has_key);

        self.stage.hero.update(dt);
        for spider in self.stage.spiders.iter_mut().filter(|s| s.is_alive()) {
            spider.update(dt);
        }

        let key_y = self.stage.key_tween.update(dt);
        self.stage.key.position.y = key_y;
        self.stage.key.sync_body();
    }

    fn integrate(&mut self, dt: f32) {
        let world = self.world;
        let stage = &mut self.stage;
        let sprites = std::iter::once(stage.hero.sprite_mut())
            .chain(stage.spiders.iter_mut().map(|s| s.sprite_mut()))
            .chain(stage.coins.iter_mut())
            .chain(stage.platforms.iter_mut())
            .chain(stage.enemy_walls.iter_mut())
            .chain([&mut stage.door, &mut stage.key]);

        for sprite in sprites {
            if let Some(body) = sprite.body_mut() {
                body.pre_update(dt, &world);
            }
            sprite.sync_from_body();
        }
    }

    /// Asks the hero to jump; plays the jump sound if it did.
    pub fn request_jump(&mut self, dispatcher: &mut Dispatcher) -> bool {
        let did_jump = self.stage.hero.jump();
        if did_jump {
            dispatcher.broadcast(Event::PlaySound(Sfx::Jump));
        }
        did_jump
    }

    fn handle_collisions(&mut self, dispatcher: &mut Dispatcher) {
        {
            let Stage {
                hero,
                platforms,
                spiders,
                enemy_walls,
                ..
            } = &mut self.stage;

            for spider in spiders.iter_mut() {
                let sprite = spider.sprite_mut();
                for platform in platforms.iter_mut() {
                    collide_sprites(sprite, platform);
                }
                for wall in enemy_walls.iter_mut() {
                    collide_sprites(sprite, wall);
                }
                sprite.sync_from_body();
            }

            let sprite = hero.sprite_mut();
            for platform in platforms.iter_mut() {
                collide_sprites(sprite, platform);
            }
            sprite.sync_from_body();
        }

        for i in 0..self.stage.coins.len() {
            if overlap_sprites(self.stage.hero.sprite(), &self.stage.coins[i]) {
                self.on_hero_vs_coin(i, dispatcher);
            }
        }

        for i in 0..self.stage.spiders.len() {
            if overlap_sprites(self.stage.hero.sprite(), self.stage.spiders[i].sprite()) {
                self.on_hero_vs_enemy(i, dispatcher);
            }
        }

        if overlap_sprites(self.stage.hero.sprite(), &self.stage.key) {
            self.on_hero_vs_key(dispatcher);
        }

        // the door only opens with the key, and not in mid-air
        if self.has_key
            && self.stage.hero.is_on_ground()
            && overlap_sprites(self.stage.hero.sprite(), &self.stage.door)
        {
            self.on_hero_vs_door(dispatcher);
        }
    }

    fn handle_input(&mut self, controls: Controls) {
        let direction = if controls.left {
            -1.0
        } else if controls.right {
            1.0
        } else {
            0.0
        };
        self.stage.hero.move_dir(direction);
    }

    fn on_hero_vs_coin(&mut self, index: usize, dispatcher: &mut Dispatcher) {
        dispatcher.broadcast(Event::PlaySound(Sfx::Coin));
        self.stage.coins[index].kill();
        self.coin_pickup_count += 1;
        log::debug!("Coin collected, total: {}", self.coin_pickup_count);
        dispatcher.broadcast(Event::CoinCollected {
            total: self.coin_pickup_count,
        });
    }

    fn on_hero_vs_enemy(&mut self, index: usize, dispatcher: &mut Dispatcher) {
        if self.stage.hero.is_falling() {
            self.stage.hero.bounce();
            self.stage.spiders[index].die();
            dispatcher.broadcast(Event::PlaySound(Sfx::Stomp));
            dispatcher.broadcast(Event::SpiderStomped);
        } else {
            log::info!("Hero killed on level {}", self.level);
            dispatcher.broadcast(Event::PlaySound(Sfx::Stomp));
            dispatcher.broadcast(Event::RestartLevel { level: self.level });
        }
    }

    fn on_hero_vs_key(&mut self, dispatcher: &mut Dispatcher) {
        dispatcher.broadcast(Event::PlaySound(Sfx::Key));
        self.stage.key.kill();
        self.has_key = true;
        dispatcher.broadcast(Event::KeyCollected);
    }

    fn on_hero_vs_door(&mut self, dispatcher: &mut Dispatcher) {
        log::info!("Level {} complete", self.level);
        dispatcher.broadcast(Event::PlaySound(Sfx::Door));
        dispatcher.broadcast(Event::RestartLevel {
            level: self.level + 1,
        });
    }

    pub fn draw(&self, draw_list: &mut DrawList) {
        let origin = vec2(0.0, 0.0);
        let stage = &self.stage;
        draw_list.sprite(Layer::World, &self.background, origin);
        draw_list.sprite(Layer::World, &stage.door, origin);
        draw_list.sprite(Layer::World, &stage.key, origin);
        for platform in &stage.platforms {
            draw_list.sprite(Layer::World, platform, origin);
        }
        for coin in &stage.coins {
            draw_list.sprite(Layer::World, coin, origin);
        }
        for spider in &stage.spiders {
            spider.draw(draw_list);
        }
        for wall in &stage.enemy_walls {
            draw_list.sprite(Layer::World, wall, origin);
        }
        stage.hero.draw(draw_list);
        self.hud.draw(draw_list);
    }
}

// Read access for tests.
#[cfg(test)]
impl PlayState {
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn coin_pickup_count(&self) -> u32 {
        self.coin_pickup_count
    }

    pub fn has_key(&self) -> bool {
        self.has_key
    }

    pub fn hero(&self) -> &Hero {
        &self.stage.hero
    }

    pub fn spiders(&self) -> &[Spider] {
        &self.stage.spiders
    }

    pub fn coins(&self) -> &[Sprite] {
        &self.stage.coins
    }

    pub fn platforms(&self) -> &[Sprite] {
        &self.stage.platforms
    }

    pub fn enemy_walls(&self) -> &[Sprite] {
        &self.stage.enemy_walls
    }

    pub fn key(&self) -> &Sprite {
        &self.stage.key
    }

    pub fn door(&self) -> &Sprite {
        &self.stage.door
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }
}

#[cfg(test)]
mod play_state_tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    const GROUND_Y: f32 = 558.0;
    // hero is 54px tall, anchored at its center
    const STANDING_Y: f32 = GROUND_Y - 27.0;

    fn level_data(hero: (f32, f32)) -> LevelData {
        LevelData {
            platforms: vec![
                PlatformData {
                    image: "ground".to_string(),
                    x: 0.0,
                    y: GROUND_Y,
                },
                PlatformData {
                    image: "grass:4x1".to_string(),
                    x: 600.0,
                    y: 300.0,
                },
            ],
            hero: Position {
                x: hero.0,
                y: hero.1,
            },
            spiders: vec![],
            coins: vec![],
            door: Position { x: 900.0, y: GROUND_Y },
            key: Position { x: 700.0, y: 200.0 },
        }
    }

    fn play_state(data: LevelData) -> PlayState {
        PlayState::create(0, &data).unwrap()
    }

    fn run(state: &mut PlayState, frames: usize, controls: Controls) -> Vec<Event> {
        let mut dispatcher = Dispatcher::default();
        for _ in 0..frames {
            state.update(DT, controls, &mut dispatcher);
        }
        dispatcher.drain().into_iter().map(|m| m.event).collect()
    }

    fn settle(state: &mut PlayState) {
        run(state, 2, Controls::default());
        assert!(state.hero().is_on_ground());
    }

    #[test]
    fn level_index_wraps() {
        let cache = LevelCache::from_levels(vec![
            level_data((100.0, STANDING_Y)),
            level_data((200.0, STANDING_Y)),
        ])
        .unwrap();
        let state = PlayState::new(LEVEL_COUNT + 1, &cache).unwrap();
        assert_eq!(state.level(), 1);
        assert_eq!(state.hero().position(), point2(200.0, STANDING_Y));
        assert_eq!(state.coin_pickup_count(), 0);
        assert!(!state.has_key());
    }

    #[test]
    fn platforms_get_invisible_enemy_walls() {
        let state = play_state(level_data((100.0, STANDING_Y)));
        assert_eq!(state.platforms().len(), 2);
        assert_eq!(state.enemy_walls().len(), 4);

        let walls = state.enemy_walls();
        // grass:4x1 at (600, 300) is 168px wide; walls stand on its top corners
        assert_eq!(walls[2].bounds(), Bounds::from_xywh(558.0, 258.0, 42.0, 42.0));
        assert_eq!(walls[3].bounds(), Bounds::from_xywh(768.0, 258.0, 42.0, 42.0));
        assert!(walls.iter().all(|w| !w.visible));

        let platform = state.platforms()[1].body().unwrap();
        assert!(platform.immovable && !platform.allow_gravity);
    }

    #[test]
    fn key_floats_and_bobs() {
        let mut state = play_state(level_data((100.0, STANDING_Y)));
        assert_eq!(state.key().position.y, 197.0);
        run(&mut state, 24, Controls::default());
        let y = state.key().position.y;
        assert!(y > 197.0 && y < 203.0);
        assert_eq!(state.key().body().unwrap().position.y, y - 17.0);
    }

    #[test]
    fn hero_lands_on_ground() {
        let mut state = play_state(level_data((100.0, 400.0)));
        run(&mut state, 120, Controls::default());
        assert!(state.hero().is_on_ground());
        assert!((state.hero().position().y - STANDING_Y).abs() < 1e-3);
        assert_eq!(state.hero().sprite().animations.name(), Some("stop"));
    }

    #[test]
    fn input_moves_hero() {
        let mut state = play_state(level_data((100.0, STANDING_Y)));
        settle(&mut state);
        let x = state.hero().position().x;
        let controls = Controls {
            left: false,
            right: true,
            jump: false,
        };
        run(&mut state, 3, controls);
        assert!(state.hero().position().x > x);
        assert_eq!(state.hero().sprite().animations.name(), Some("run"));

        run(&mut state, 1, Controls::default());
        assert_eq!(state.hero().velocity().x, 0.0);
    }

    #[test]
    fn jump_only_from_ground() {
        let mut state = play_state(level_data((100.0, STANDING_Y)));
        settle(&mut state);
        let jump = Controls {
            jump: true,
            ..Default::default()
        };
        let events = run(&mut state, 1, jump);
        assert_eq!(events, vec![Event::PlaySound(Sfx::Jump)]);
        assert!(state.hero().velocity().y < 0.0);

        // in the air now
        let events = run(&mut state, 1, jump);
        assert!(events.is_empty());
    }

    #[test]
    fn collecting_coins() {
        let mut data = level_data((100.0, STANDING_Y));
        data.coins = vec![Position { x: 100.0, y: STANDING_Y }, Position { x: 500.0, y: 100.0 }];
        let mut state = play_state(data);

        let events = run(&mut state, 1, Controls::default());
        assert_eq!(
            events,
            vec![
                Event::PlaySound(Sfx::Coin),
                Event::CoinCollected { total: 1 }
            ]
        );
        assert_eq!(state.coin_pickup_count(), 1);
        assert!(!state.coins()[0].alive);
        assert!(state.coins()[1].alive);
        assert_eq!(state.hud().coin_text(), "X1");

        // a collected coin can't be collected again
        assert!(run(&mut state, 1, Controls::default()).is_empty());
    }

    #[test]
    fn stomping_a_spider() {
        let mut data = level_data((300.0, 400.0));
        data.spiders = vec![Position { x: 300.0, y: STANDING_Y }];
        let mut state = play_state(data);
        // hold the spider still under the falling hero
        state.stage.spiders[0].sprite_mut().body_mut().unwrap().velocity.x = 0.0;
        state.stage.hero.sprite_mut().body_mut().unwrap().velocity.y = 300.0;

        let events = run(&mut state, 15, Controls::default());
        assert_eq!(
            events,
            vec![Event::PlaySound(Sfx::Stomp), Event::SpiderStomped]
        );
        assert!(state.spiders()[0].is_dying());
        assert!(state.hero().velocity().y < 0.0);

        // the death animation plays out, then the spider is gone
        run(&mut state, 60, Controls::default());
        assert!(!state.spiders()[0].is_alive());
    }

    #[test]
    fn touching_a_spider_restarts_level() {
        let mut data = level_data((100.0, STANDING_Y));
        data.spiders = vec![Position { x: 120.0, y: STANDING_Y }];
        let mut state = play_state(data);
        settle(&mut state);

        let events = run(&mut state, 1, Controls::default());
        assert_eq!(
            events,
            vec![
                Event::PlaySound(Sfx::Stomp),
                Event::RestartLevel { level: 0 }
            ]
        );
    }

    #[test]
    fn spiders_patrol_between_walls() {
        let mut data = level_data((100.0, STANDING_Y));
        // on the grass platform, spanning x 600..768
        data.spiders = vec![Position { x: 700.0, y: 273.0 }];
        let mut state = play_state(data);
        // long enough to reach the right wall and turn back, not long enough to cross
        run(&mut state, 60, Controls::default());

        let spider = &state.spiders()[0];
        let bounds = spider.bounds();
        assert!(bounds.left() >= 600.0 && bounds.right() <= 768.0);
        assert_eq!(spider.sprite().body().unwrap().velocity.x, -100.0);
    }

    #[test]
    fn key_then_door() {
        let mut data = level_data((100.0, STANDING_Y));
        data.door = Position { x: 100.0, y: GROUND_Y };
        let mut state = play_state(data);

        // no key: standing in the doorway does nothing
        assert!(run(&mut state, 5, Controls::default()).is_empty());

        // pick up the key by moving it onto the hero
        let hero = state.hero().position();
        state.stage.key_tween = Tween::new(hero.y, hero.y, 1.0, Easing::Linear);
        state.stage.key.position = hero;
        state.stage.key.sync_body();

        let events = run(&mut state, 1, Controls::default());
        assert_eq!(
            events,
            vec![
                Event::PlaySound(Sfx::Key),
                Event::KeyCollected,
                Event::PlaySound(Sfx::Door),
                Event::RestartLevel { level: 1 },
            ]
        );
        assert!(state.has_key());
        assert_eq!(state.hud().key_frame(), 1);
    }

    #[test]
    fn door_ignored_in_mid_air() {
        let mut data = level_data((100.0, 490.0));
        data.door = Position { x: 100.0, y: GROUND_Y };
        let mut state = play_state(data);
        state.has_key = true;
        state.stage.hero.sprite_mut().body_mut().unwrap().velocity.y = -600.0;

        // rising through the doorway
        assert!(run(&mut state, 3, Controls::default()).is_empty());
    }

    #[test]
    fn draw_order_and_hidden_walls() {
        let state = play_state(level_data((100.0, STANDING_Y)));
        let mut list = DrawList::default();
        state.draw(&mut list);

        let world = list.layer(Layer::World);
        // background, door, key, 2 platforms, hero
        assert_eq!(world.len(), 6);
        assert_eq!(
            world[0].texture,
            crate::sprite::rendering::TextureKey::Image("background".to_string())
        );
        assert_eq!(
            world[5].texture,
            crate::sprite::rendering::TextureKey::Image("hero".to_string())
        );
        assert!(!list.layer(Layer::Overlay).is_empty());
    }
}
