use std::time::Duration;

use anyhow::Result;
use cgmath::*;
use winit::{
    event::{KeyEvent, WindowEvent},
    keyboard::PhysicalKey,
};

use crate::{
    audio::Audio,
    camera::Camera,
    constants::{scoreboard::COIN_ROW_PREFIX, MAX_FRAME_DT_MILLIS},
    event_dispatch::{Dispatcher, Message, MessageHandler},
    gamepad::Gamepad,
    input::{Action, Controls, InputState},
    level::LevelCache,
    sprite::rendering::{DrawList, SpriteRenderer},
    Options,
};

use super::{
    events::Event,
    gpu_state::GpuState,
    play_state::PlayState,
    scoreboard::{ScoreBoard, ScoreBoardConfig},
};

// --------------------------------------------------------------------------------------------------------------------

/// The game proper, independent of window and GPU: the current PlayState, the scoreboard which
/// outlives it, and the plumbing that turns PlayState's events into sound and level changes.
pub struct GameSession {
    levels: LevelCache,
    play_state: PlayState,
    scoreboard: ScoreBoard,
    scoreboard_rows: Vec<String>,
    audio: Audio,
    dispatcher: Dispatcher,
    pending_restart: Option<u32>,
}

impl GameSession {
    pub fn new(levels: LevelCache, start_level: u32, audio: Audio) -> Result<Self> {
        let play_state = PlayState::new(start_level, &levels)?;
        Ok(Self {
            levels,
            play_state,
            scoreboard: ScoreBoard::new(ScoreBoardConfig::default()),
            scoreboard_rows: Vec::new(),
            audio,
            dispatcher: Dispatcher::default(),
            pending_restart: None,
        })
    }

    #[cfg(test)]
    pub fn play_state(&self) -> &PlayState {
        &self.play_state
    }

    #[cfg(test)]
    pub fn scoreboard(&self) -> &ScoreBoard {
        &self.scoreboard
    }

    pub fn update(&mut self, dt: f32, controls: Controls) {
        self.play_state.update(dt, controls, &mut self.dispatcher);

        let messages = self.dispatcher.drain();
        Dispatcher::dispatch(&messages, self);

        // of several restarts requested in one frame, the last wins
        if let Some(level) = self.pending_restart.take() {
            self.restart(level);
        }

        self.audio.update();
    }

    fn restart(&mut self, level: u32) {
        log::info!("Starting level {}", level);
        match PlayState::new(level, &self.levels) {
            Ok(play_state) => self.play_state = play_state,
            Err(e) => log::error!("{:#}", e),
        }
    }

    fn on_coin_collected(&mut self, total: u32) {
        let row = format!("{}{}", COIN_ROW_PREFIX, total);
        match self.scoreboard_rows.first_mut() {
            Some(first) => *first = row,
            None => self.scoreboard_rows.push(row),
        }
        self.scoreboard.redraw(&self.scoreboard_rows);
    }

    pub fn pointer_moved(&mut self, pointer: Option<Point2<f32>>) {
        self.scoreboard.pointer_moved(pointer);
    }

    pub fn draw(&self, draw_list: &mut DrawList) {
        self.play_state.draw(draw_list);
        self.scoreboard.draw_into(draw_list);
    }
}

impl MessageHandler for GameSession {
    fn handle_message(&mut self, message: &Message) {
        match &message.event {
            Event::PlaySound(sfx) => self.audio.play(*sfx),
            Event::CoinCollected { total } => self.on_coin_collected(*total),
            Event::RestartLevel { level } => self.pending_restart = Some(*level),
            Event::KeyCollected => log::debug!("Key collected"),
            Event::SpiderStomped => log::debug!("Spider stomped"),
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------

pub struct AppState {
    gpu: GpuState,
    renderer: SpriteRenderer,
    camera: Camera,
    input: InputState,
    gamepad: Gamepad,
    session: GameSession,
    draw_list: DrawList,
}

impl AppState {
    pub fn new(gpu: GpuState, options: &Options) -> Result<Self> {
        let levels = LevelCache::load(&options.data_dir)?;
        let audio = Audio::new(&options.res_dir, options.mute);
        let session = GameSession::new(levels, options.level, audio)?;

        let renderer =
            SpriteRenderer::new(&gpu.device, &gpu.queue, gpu.config.format, &options.res_dir);
        let mut camera = Camera::default();
        camera.resize(gpu.config.width, gpu.config.height);

        let mut draw_list = DrawList::default();
        for (key, size) in renderer.sheet_sizes() {
            draw_list.set_sheet_size(key, size);
        }

        Ok(Self {
            gpu,
            renderer,
            camera,
            input: InputState::for_actions(&Action::ALL),
            gamepad: Gamepad::new(),
            session,
            draw_list,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        let size = self.gpu.size();
        self.camera.resize(size.width, size.height);
    }

    /// Reconfigures the surface after it was lost.
    pub fn reconfigure(&mut self) {
        self.gpu.reconfigure();
    }

    /// Handles input events, returning true if the event was consumed.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => self.input.process_keyboard(*key, *state),
            WindowEvent::CursorMoved { position, .. } => {
                let pointer = self
                    .camera
                    .window_to_world(point2(position.x as f32, position.y as f32));
                self.session.pointer_moved(Some(pointer));
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.session.pointer_moved(None);
                true
            }
            _ => false,
        }
    }

    pub fn update(&mut self, dt: Duration) {
        // Set a max timestep - this is crude, but prevents explosions when stopping
        // execution in the debugger, and we get a HUGE timestep after resuming.
        let dt = dt.min(Duration::from_millis(MAX_FRAME_DT_MILLIS));

        self.gamepad.poll();
        let controls = self.input.controls().merge(self.gamepad.controls());
        self.session.update(dt.as_secs_f32(), controls);

        self.input.update();
        self.gamepad.update();
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gpu.encoder();

        self.draw_list.clear();
        self.session.draw(&mut self.draw_list);
        self.renderer.render(
            &self.gpu.device,
            &self.gpu.queue,
            &self.camera,
            &self.draw_list,
            &view,
            &mut encoder,
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use crate::level::{LevelData, PlatformData, Position};

    fn level(hero_x: f32, coins: Vec<Position>) -> LevelData {
        LevelData {
            platforms: vec![PlatformData {
                image: "ground".to_string(),
                x: 0.0,
                y: 558.0,
            }],
            hero: Position { x: hero_x, y: 531.0 },
            spiders: vec![],
            coins,
            door: Position { x: 900.0, y: 558.0 },
            key: Position { x: 500.0, y: 100.0 },
        }
    }

    fn session() -> GameSession {
        let levels = LevelCache::from_levels(vec![
            level(100.0, vec![Position { x: 100.0, y: 531.0 }]),
            level(200.0, vec![]),
        ])
        .unwrap();
        GameSession::new(levels, 0, Audio::silent()).unwrap()
    }

    #[test]
    fn coin_pickup_writes_first_scoreboard_row() {
        let mut session = session();
        assert!(!session.scoreboard().is_visible());

        session.update(1.0 / 60.0, Controls::default());
        assert!(session.scoreboard().is_visible());
        assert_eq!(session.scoreboard().rows(), vec![" VORTEX 50000000 - 1"]);
    }

    #[test]
    fn last_restart_in_a_frame_wins() {
        let mut session = session();
        let messages = vec![
            Message {
                event: Event::RestartLevel { level: 0 },
            },
            Message {
                event: Event::RestartLevel { level: 1 },
            },
        ];
        Dispatcher::dispatch(&messages, &mut session);
        session.update(0.0, Controls::default());
        assert_eq!(session.play_state().level(), 1);
    }

    #[test]
    fn scoreboard_survives_restart() {
        let mut session = session();
        session.update(1.0 / 60.0, Controls::default());
        session.handle_message(&Message {
            event: Event::RestartLevel { level: 1 },
        });
        session.update(1.0 / 60.0, Controls::default());
        assert_eq!(session.play_state().level(), 1);
        assert_eq!(session.play_state().coin_pickup_count(), 0);
        assert_eq!(session.scoreboard().rows(), vec![" VORTEX 50000000 - 1"]);
    }
}
