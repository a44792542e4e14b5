use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sfx {
    Jump,
    Coin,
    Stomp,
    Key,
    Door,
}

impl Sfx {
    pub const ALL: [Sfx; 5] = [Sfx::Jump, Sfx::Coin, Sfx::Stomp, Sfx::Key, Sfx::Door];

    pub fn file_name(&self) -> &'static str {
        use Sfx::*;
        match self {
            Jump => "audio/jump.wav",
            Coin => "audio/coin.wav",
            Stomp => "audio/stomp.wav",
            Key => "audio/key.wav",
            Door => "audio/door.wav",
        }
    }

    fn path(&self, res_dir: &Path) -> PathBuf {
        res_dir.join(self.file_name())
    }
}

/// Reads every sound effect into memory. Sounds which can't be read are skipped with a warning
/// and play as silence.
fn load_sounds(res_dir: &Path) -> HashMap<Sfx, Arc<[u8]>> {
    let mut sounds = HashMap::new();
    for sfx in Sfx::ALL {
        match read_sound(&sfx.path(res_dir)) {
            Ok(bytes) => {
                sounds.insert(sfx, bytes);
            }
            Err(e) => log::warn!("{:#}", e),
        }
    }
    sounds
}

fn read_sound(path: &Path) -> Result<Arc<[u8]>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Unable to read sound effect {}", path.display()))?;
    Ok(bytes.into())
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(feature = "audio")]
struct Output {
    _stream: rodio::OutputStream,
    stream_handle: rodio::OutputStreamHandle,
    sinks: Vec<rodio::Sink>,
}

#[cfg(feature = "audio")]
impl Output {
    fn open() -> Result<Self> {
        let (stream, stream_handle) =
            rodio::OutputStream::try_default().context("Unable to open audio output")?;
        Ok(Self {
            _stream: stream,
            stream_handle,
            sinks: Vec::new(),
        })
    }

    fn play(&mut self, bytes: Arc<[u8]>) -> Result<()> {
        let source = rodio::Decoder::new(std::io::Cursor::new(bytes))
            .context("Unable to decode sound effect")?;
        let sink = rodio::Sink::try_new(&self.stream_handle).context("Unable to create sink")?;
        sink.append(source);
        self.sinks.push(sink);
        Ok(())
    }
}

/// Plays the game's sound effects. Runs silently when muted, when built without the `audio`
/// feature, or when no output device is available.
pub struct Audio {
    #[cfg(feature = "audio")]
    output: Option<Output>,
    sounds: HashMap<Sfx, Arc<[u8]>>,
    muted: bool,
}

impl Audio {
    pub fn new(res_dir: &Path, muted: bool) -> Self {
        if muted {
            log::info!("Audio muted");
            return Self::silent();
        }

        #[cfg(feature = "audio")]
        let output = match Output::open() {
            Ok(output) => Some(output),
            Err(e) => {
                log::warn!("{:#}; continuing without sound", e);
                None
            }
        };

        Self {
            #[cfg(feature = "audio")]
            output,
            sounds: load_sounds(res_dir),
            muted,
        }
    }

    pub fn silent() -> Self {
        Self {
            #[cfg(feature = "audio")]
            output: None,
            sounds: HashMap::new(),
            muted: true,
        }
    }

    pub fn play(&mut self, sfx: Sfx) {
        if self.muted {
            return;
        }
        log::debug!("Audio::play {:?}", sfx);

        #[cfg(feature = "audio")]
        if let (Some(output), Some(bytes)) = (&mut self.output, self.sounds.get(&sfx)) {
            if let Err(e) = output.play(bytes.clone()) {
                log::warn!("{:#} ({:?})", e, sfx);
            }
        }
    }

    pub fn update(&mut self) {
        // prune sinks
        #[cfg(feature = "audio")]
        if let Some(output) = &mut self.output {
            output.sinks.retain(|s| !s.empty());
        }
    }
}
