use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use lewton::inside_ogg::OggStreamReader;
use log::{error, info, warn};
use once_cell::sync::OnceCell;
use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

type OggReader = OggStreamReader<BufReader<File>>;

/// About two seconds of stereo audio at 48 kHz.
const QUEUE_CAP_SAMPLES: usize = 1 << 18;

#[derive(Debug)]
pub enum AudioError {
    NoDevice,
    Unsupported(String),
    Stream(String),
    Unavailable,
    Open(std::io::Error),
    Decode(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoDevice => write!(f, "no audio output device"),
            AudioError::Unsupported(s) => write!(f, "unsupported output format: {}", s),
            AudioError::Stream(s) => write!(f, "audio stream error: {}", s),
            AudioError::Unavailable => write!(f, "audio engine is not running"),
            AudioError::Open(e) => write!(f, "cannot open music file: {}", e),
            AudioError::Decode(s) => write!(f, "cannot decode music file: {}", s),
        }
    }
}

impl std::error::Error for AudioError {}

// --- Engine Commands ---
enum AudioCommand {
    PlayMusic(Box<OggReader>),
    StopMusic,
}

/// Busy state shared between callers, the manager thread and the decoder.
/// A play request counts as busy from the moment it is queued, so a stop
/// still waiting in the channel cannot report the new track as finished.
#[derive(Default)]
struct PlaybackFlags {
    pending_plays: AtomicUsize,
    decoding: AtomicBool,
}

impl PlaybackFlags {
    fn queue_play(&self) {
        self.pending_plays.fetch_add(1, Ordering::AcqRel);
    }

    fn cancel_play(&self) {
        let _ = self.pending_plays.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    /// Manager picked up a play request.
    fn begin_play(&self) {
        self.decoding.store(true, Ordering::Release);
        self.cancel_play();
    }

    /// Manager picked up a stop request.
    fn stop(&self) {
        if self.pending_plays.load(Ordering::Acquire) == 0 {
            self.decoding.store(false, Ordering::Release);
        }
    }

    fn finished_decoding(&self) {
        self.decoding.store(false, Ordering::Release);
    }

    fn is_busy(&self) -> bool {
        self.pending_plays.load(Ordering::Acquire) > 0 || self.decoding.load(Ordering::Acquire)
    }
}

struct AudioEngine {
    command_sender: Mutex<Sender<AudioCommand>>,
    queue: Arc<Mutex<VecDeque<f32>>>,
    flags: Arc<PlaybackFlags>,
}

static ENGINE: OnceCell<AudioEngine> = OnceCell::new();

/// Starts the audio manager thread and opens the default output device.
pub fn init() -> Result<(), AudioError> {
    ENGINE.get_or_try_init(start_engine).map(|_| ())
}

/// Starts playing an Ogg Vorbis track, replacing whatever was playing.
pub fn play_music(path: &Path) -> Result<(), AudioError> {
    let engine = ENGINE.get().ok_or(AudioError::Unavailable)?;
    let file = File::open(path).map_err(AudioError::Open)?;
    let reader = OggStreamReader::new(BufReader::new(file)).map_err(|e| AudioError::Decode(e.to_string()))?;
    info!(
        "Playing '{}' ({} Hz, {} ch).",
        path.display(),
        reader.ident_hdr.audio_sample_rate,
        reader.ident_hdr.audio_channels
    );
    engine.flags.queue_play();
    let sent = send(engine, AudioCommand::PlayMusic(Box::new(reader)));
    if sent.is_err() {
        engine.flags.cancel_play();
    }
    sent
}

pub fn stop_music() {
    if let Some(engine) = ENGINE.get() {
        let _ = send(engine, AudioCommand::StopMusic);
    }
}

/// True while the track is still decoding or has samples left to output.
/// Always false when the engine failed to start.
pub fn is_music_playing() -> bool {
    let Some(engine) = ENGINE.get() else { return false; };
    if engine.flags.is_busy() {
        return true;
    }
    engine.queue.lock().map(|q| !q.is_empty()).unwrap_or(false)
}

fn send(engine: &AudioEngine, cmd: AudioCommand) -> Result<(), AudioError> {
    let sender = engine.command_sender.lock().map_err(|_| AudioError::Unavailable)?;
    sender.send(cmd).map_err(|_| AudioError::Unavailable)
}

// --- Engine Implementation ---

fn start_engine() -> Result<AudioEngine, AudioError> {
    let (command_sender, command_receiver) = channel();
    let (ready_sender, ready_receiver) = channel();
    let queue = Arc::new(Mutex::new(VecDeque::with_capacity(QUEUE_CAP_SAMPLES)));
    let flags = Arc::new(PlaybackFlags::default());

    let thread_queue = queue.clone();
    let thread_flags = flags.clone();
    thread::Builder::new()
        .name("audio-manager".into())
        .spawn(move || audio_manager_thread(command_receiver, ready_sender, thread_queue, thread_flags))
        .map_err(|e| AudioError::Stream(e.to_string()))?;

    // The cpal stream lives on the manager thread; wait for it to report in.
    let (rate, channels) = ready_receiver.recv().map_err(|_| AudioError::Unavailable)??;
    info!("Audio engine initialized ({} Hz, {} ch).", rate, channels);

    Ok(AudioEngine { command_sender: Mutex::new(command_sender), queue, flags })
}

fn build_stream(queue: Arc<Mutex<VecDeque<f32>>>) -> Result<(cpal::Stream, u32, usize), AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    let supported = device.default_output_config().map_err(|e| AudioError::Stream(e.to_string()))?;
    if supported.sample_format() != SampleFormat::F32 {
        return Err(AudioError::Unsupported(format!("{:?}", supported.sample_format())));
    }
    let config: StreamConfig = supported.into();
    let rate = config.sample_rate.0;
    let channels = config.channels as usize;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _| fill_from_queue(&queue, data),
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Stream(e.to_string()))?;
    stream.play().map_err(|e| AudioError::Stream(e.to_string()))?;
    Ok((stream, rate, channels))
}

/// Real-time callback: drain what is queued, pad the rest with silence.
fn fill_from_queue(queue: &Mutex<VecDeque<f32>>, out: &mut [f32]) {
    let mut filled = 0;
    if let Ok(mut q) = queue.try_lock() {
        let n = out.len().min(q.len());
        for (dst, src) in out.iter_mut().zip(q.drain(..n)) {
            *dst = src;
            filled += 1;
        }
    }
    out[filled..].iter_mut().for_each(|s| *s = 0.0);
}

struct DecoderHandle {
    thread: thread::JoinHandle<()>,
    stop: Arc<AtomicBool>,
}

impl DecoderHandle {
    fn stop_and_join(self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.thread.join();
    }
}

fn audio_manager_thread(
    command_receiver: Receiver<AudioCommand>,
    ready: Sender<Result<(u32, usize), AudioError>>,
    queue: Arc<Mutex<VecDeque<f32>>>,
    flags: Arc<PlaybackFlags>,
) {
    let (_stream, rate, channels) = match build_stream(queue.clone()) {
        Ok(built) => built,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok((rate, channels)));

    let mut decoder: Option<DecoderHandle> = None;
    while let Ok(cmd) = command_receiver.recv() {
        if let Some(old) = decoder.take() {
            old.stop_and_join();
        }
        if let Ok(mut q) = queue.lock() {
            q.clear();
        }
        match cmd {
            AudioCommand::PlayMusic(reader) => {
                flags.begin_play();
                decoder = Some(spawn_decoder(*reader, rate, channels, queue.clone(), flags.clone()));
            }
            AudioCommand::StopMusic => flags.stop(),
        }
    }
}

fn spawn_decoder(
    reader: OggReader,
    out_hz: u32,
    out_ch: usize,
    queue: Arc<Mutex<VecDeque<f32>>>,
    flags: Arc<PlaybackFlags>,
) -> DecoderHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    let thread = thread::spawn(move || {
        if let Err(e) = decode_loop(reader, out_hz, out_ch, &queue, &stop_flag) {
            warn!("Music decoder stopped: {}", e);
        }
        if !stop_flag.load(Ordering::Relaxed) {
            flags.finished_decoding();
        }
    });
    DecoderHandle { thread, stop }
}

fn decode_loop(
    mut reader: OggReader,
    out_hz: u32,
    out_ch: usize,
    queue: &Mutex<VecDeque<f32>>,
    stop: &AtomicBool,
) -> Result<(), AudioError> {
    let in_hz = reader.ident_hdr.audio_sample_rate;
    let in_ch = reader.ident_hdr.audio_channels as usize;
    let mut resampler = LinearResampler::new(in_hz, out_hz, in_ch, out_ch);
    let mut out = Vec::with_capacity(1 << 14);

    while let Some(packet) = reader.read_dec_packet_itl().map_err(|e| AudioError::Decode(e.to_string()))? {
        if stop.load(Ordering::Relaxed) {
            return Ok(());
        }
        out.clear();
        resampler.process(&packet, &mut out);

        let mut written = 0;
        while written < out.len() {
            if stop.load(Ordering::Relaxed) {
                return Ok(());
            }
            let pushed = match queue.lock() {
                Ok(mut q) => {
                    let n = (QUEUE_CAP_SAMPLES - q.len().min(QUEUE_CAP_SAMPLES)).min(out.len() - written);
                    q.extend(&out[written..written + n]);
                    n
                }
                Err(_) => return Err(AudioError::Unavailable),
            };
            if pushed == 0 {
                thread::sleep(Duration::from_millis(2));
            }
            written += pushed;
        }
    }
    Ok(())
}

/// Linear-interpolating rate converter with a simple channel map (`c % in_ch`).
struct LinearResampler {
    step: f64,
    pos: f64,
    in_ch: usize,
    out_ch: usize,
    prev: Vec<f32>,
    have_prev: bool,
}

impl LinearResampler {
    fn new(in_hz: u32, out_hz: u32, in_ch: usize, out_ch: usize) -> Self {
        let in_ch = in_ch.max(1);
        Self {
            step: in_hz as f64 / out_hz.max(1) as f64,
            pos: 0.0,
            in_ch,
            out_ch: out_ch.max(1),
            prev: vec![0.0; in_ch],
            have_prev: false,
        }
    }

    /// Consumes interleaved i16 input and appends interleaved f32 output.
    fn process(&mut self, input: &[i16], out: &mut Vec<f32>) {
        let frames = input.len() / self.in_ch;
        if frames == 0 {
            return;
        }
        let sample = |frame: usize, c: usize| input[frame * self.in_ch + c] as f32 / 32768.0;

        // Position is measured from the previous packet's last frame (index -1).
        let start = if self.have_prev { -1.0 } else { 0.0 };
        let mut t = self.pos + start;
        while t <= (frames - 1) as f64 {
            let i0 = t.floor();
            let frac = (t - i0) as f32;
            for c in 0..self.out_ch {
                let ic = c % self.in_ch;
                let a = if i0 < 0.0 { self.prev[ic] } else { sample(i0 as usize, ic) };
                let b_idx = (i0 + 1.0) as usize;
                let b = if b_idx < frames { sample(b_idx, ic) } else { a };
                out.push(a + (b - a) * frac);
            }
            t += self.step;
        }

        self.pos = t - (frames - 1) as f64;
        for c in 0..self.in_ch {
            self.prev[c] = sample(frames - 1, c);
        }
        self.have_prev = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_passes_samples_through() {
        let mut r = LinearResampler::new(48_000, 48_000, 1, 1);
        let mut out = Vec::new();
        r.process(&[0, 16384, -16384], &mut out);
        assert_eq!(out, vec![0.0, 0.5, -0.5]);
        out.clear();
        r.process(&[8192], &mut out);
        assert_eq!(out, vec![0.25]);
    }

    #[test]
    fn mono_is_duplicated_to_stereo() {
        let mut r = LinearResampler::new(44_100, 44_100, 1, 2);
        let mut out = Vec::new();
        r.process(&[16384], &mut out);
        assert_eq!(out, vec![0.5, 0.5]);
    }

    #[test]
    fn upsampling_doubles_frames_and_interpolates() {
        let mut r = LinearResampler::new(24_000, 48_000, 1, 1);
        let mut out = Vec::new();
        r.process(&[0, 16384], &mut out);
        assert_eq!(out, vec![0.0, 0.25, 0.5]);
        out.clear();
        r.process(&[0], &mut out);
        assert_eq!(out, vec![0.25, 0.0]);
    }

    #[test]
    fn queued_stop_does_not_clear_a_newer_play() {
        let flags = PlaybackFlags::default();
        // Restart: stop then play are both queued before the manager runs.
        flags.queue_play();
        flags.stop();
        assert!(flags.is_busy());
        flags.begin_play();
        assert!(flags.is_busy());

        flags.finished_decoding();
        assert!(!flags.is_busy());
    }

    #[test]
    fn stop_with_nothing_pending_clears_busy() {
        let flags = PlaybackFlags::default();
        flags.queue_play();
        flags.begin_play();
        flags.stop();
        assert!(!flags.is_busy());
        flags.cancel_play();
        assert_eq!(flags.pending_plays.load(Ordering::Acquire), 0);
    }

    #[test]
    fn callback_pads_with_silence() {
        let queue = Mutex::new(VecDeque::from(vec![0.1, 0.2]));
        let mut out = [1.0f32; 4];
        fill_from_queue(&queue, &mut out);
        assert_eq!(out, [0.1, 0.2, 0.0, 0.0]);
        assert!(queue.lock().unwrap().is_empty());
    }
}
