use crate::core::effects::{Sound, Sounds};
use crate::core::synth;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

// --- Engine Commands ---
enum AudioCommand {
    Play(Sound),
    Resume,
    Shutdown,
}

enum EngineState {
    /// Not created yet, or disposed.
    Idle,
    Running {
        commands: Sender<AudioCommand>,
        thread: thread::JoinHandle<()>,
    },
    /// No usable output device. Every call is a no-op.
    Unavailable,
}

/// Owned handle to the output stream. The cpal stream lives on a dedicated
/// manager thread; this side only sends commands to it.
pub struct AudioEngine {
    enabled: bool,
    volume: f32,
    state: EngineState,
}

impl AudioEngine {
    pub fn new(enabled: bool, volume: f32) -> Self {
        Self { enabled, volume: volume.clamp(0.0, 1.0), state: EngineState::Idle }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, EngineState::Running { .. })
    }

    /// Opens the default output device. Safe to call repeatedly.
    pub fn create(&mut self) -> Result<(), String> {
        if !self.enabled || !matches!(self.state, EngineState::Idle) {
            return Ok(());
        }
        let (command_sender, command_receiver) = channel();
        let (ready_sender, ready_receiver) = channel();
        let volume = self.volume;

        let thread = thread::Builder::new()
            .name("audio".into())
            .spawn(move || audio_manager_thread(command_receiver, ready_sender, volume))
            .map_err(|e| format!("failed to spawn audio thread: {e}"))?;

        match ready_receiver.recv() {
            Ok(Ok((rate, channels))) => {
                info!("Audio engine initialized ({} Hz, {} ch).", rate, channels);
                self.state = EngineState::Running { commands: command_sender, thread };
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                self.state = EngineState::Unavailable;
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                self.state = EngineState::Unavailable;
                Err("audio thread exited during startup".to_string())
            }
        }
    }

    /// Starts playback on the stream.
    pub fn resume(&self) {
        self.send(AudioCommand::Resume);
    }

    /// Stops the stream and joins the manager thread. A later `init` opens
    /// a fresh stream.
    pub fn dispose(&mut self) {
        if let EngineState::Running { commands, thread } =
            std::mem::replace(&mut self.state, EngineState::Idle)
        {
            let _ = commands.send(AudioCommand::Shutdown);
            if thread.join().is_err() {
                error!("Audio thread panicked.");
            }
            info!("Audio engine disposed.");
        }
    }

    fn send(&self, command: AudioCommand) {
        if let EngineState::Running { commands, .. } = &self.state {
            let _ = commands.send(command);
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Sounds for AudioEngine {
    fn init(&mut self) {
        if let Err(e) = self.create() {
            warn!("Audio disabled: {}", e);
            return;
        }
        self.resume();
    }

    fn play(&mut self, sound: Sound) {
        self.send(AudioCommand::Play(sound));
    }
}

// --- Engine Implementation ---

type Voice = (Arc<Vec<f32>>, usize);

/// Owns the cpal stream, renders requested sounds and forwards them to the
/// callback. Exits on `Shutdown` or when the engine handle goes away.
fn audio_manager_thread(
    command_receiver: Receiver<AudioCommand>,
    ready: Sender<Result<(u32, usize), String>>,
    volume: f32,
) {
    let host = cpal::default_host();
    let Some(device) = host.default_output_device() else {
        let _ = ready.send(Err("no audio output device".to_string()));
        return;
    };
    let config = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready.send(Err(format!("no default audio config: {e}")));
            return;
        }
    };
    if config.sample_format() != SampleFormat::F32 {
        let _ = ready.send(Err(format!("unsupported sample format {:?}", config.sample_format())));
        return;
    }
    let stream_config: StreamConfig = config.into();
    let device_sample_rate = stream_config.sample_rate.0;
    let device_channels = stream_config.channels as usize;

    let (voice_sender, voice_receiver) = channel::<Arc<Vec<f32>>>();
    let mut active_voices: Vec<Voice> = Vec::new();

    let stream = match device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _| {
            for voice in voice_receiver.try_iter() {
                active_voices.push((voice, 0));
            }
            audio_callback_mixer(data, device_channels, volume, &mut active_voices);
        },
        |err| error!("Audio stream error: {}", err),
        None,
    ) {
        Ok(s) => s,
        Err(e) => {
            let _ = ready.send(Err(format!("failed to build audio stream: {e}")));
            return;
        }
    };
    let _ = ready.send(Ok((device_sample_rate, device_channels)));

    let mut rng = SmallRng::from_os_rng();
    let mut cache: HashMap<Sound, Arc<Vec<f32>>> = HashMap::new();
    loop {
        match command_receiver.recv() {
            Ok(AudioCommand::Play(sound)) => {
                let samples = if is_varied(sound) {
                    Arc::new(synth::render(sound, device_sample_rate, &mut rng))
                } else {
                    cache
                        .entry(sound)
                        .or_insert_with(|| {
                            debug!("Rendered {:?} at {} Hz.", sound, device_sample_rate);
                            Arc::new(synth::render(sound, device_sample_rate, &mut rng))
                        })
                        .clone()
                };
                let _ = voice_sender.send(samples);
            }
            Ok(AudioCommand::Resume) => {
                if let Err(e) = stream.play() {
                    warn!("Failed to resume audio stream: {}", e);
                }
            }
            Ok(AudioCommand::Shutdown) | Err(_) => break,
        }
    }
    if let Err(e) = stream.pause() {
        debug!("Audio stream pause on shutdown failed: {}", e);
    }
}

/// Sounds with random pitch or timing are rendered fresh on every play.
fn is_varied(sound: Sound) -> bool {
    matches!(sound, Sound::Carillon | Sound::FireworkExplosion | Sound::CelebrationCrowd)
}

/// Sums mono voices into every output channel and drops finished voices.
fn audio_callback_mixer(out_buffer: &mut [f32], channels: usize, volume: f32, active: &mut Vec<Voice>) {
    out_buffer.iter_mut().for_each(|s| *s = 0.0);
    let channels = channels.max(1);
    let frames = out_buffer.len() / channels;

    active.retain_mut(|(data, cursor)| {
        let to_mix = (data.len() - *cursor).min(frames);
        for i in 0..to_mix {
            let sample = data[*cursor + i] * volume;
            for out in &mut out_buffer[i * channels..(i + 1) * channels] {
                *out += sample;
            }
        }
        *cursor += to_mix;
        *cursor < data.len()
    });

    for s in out_buffer.iter_mut() {
        *s = s.clamp(-1.0, 1.0);
    }
}
