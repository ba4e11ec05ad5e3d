/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// Fixed effects are generated as in-memory WAV buffers at init time;
/// merge blips are pitched by rank and cached on first use.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_spawn: Arc<Vec<u8>>,
        sfx_slide: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
        merge_cache: RefCell<HashMap<u32, Arc<Vec<u8>>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("[Sound] No audio output: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_spawn: Arc::new(make_wav(&gen_blip(220.0, 0.03, 0.15))),
                sfx_slide: Arc::new(make_wav(&gen_slide())),
                sfx_win: Arc::new(make_wav(&gen_win())),
                sfx_game_over: Arc::new(make_wav(&gen_game_over())),
                merge_cache: RefCell::new(HashMap::new()),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        /// Short blip, pitch rising with the merged rank.
        pub fn play_merge(&self, value: u32) {
            let buf = self
                .merge_cache
                .borrow_mut()
                .entry(value)
                .or_insert_with(|| Arc::new(make_wav(&gen_blip(merge_freq(value), 0.05, 0.25))))
                .clone();
            self.play(&buf);
        }

        pub fn play_spawn(&self) { self.play(&self.sfx_spawn); }
        pub fn play_slide(&self) { self.play(&self.sfx_slide); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
        pub fn play_game_over(&self) { self.play(&self.sfx_game_over); }
    }

    /// 2 → 330 Hz, each rank a whole tone higher.
    fn merge_freq(value: u32) -> f32 {
        let steps = value.max(2).trailing_zeros() as f32 - 1.0;
        330.0 * 2f32.powf(steps * 2.0 / 12.0)
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * 2.0 * std::f32::consts::PI).sin() * env * volume
            })
            .collect()
    }

    /// Short downward sweep.
    fn gen_slide() -> Vec<f32> {
        let duration = 0.04;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0f32;
        (0..n)
            .map(|i| {
                let progress = i as f32 / n as f32;
                let freq = 180.0 - 80.0 * progress;
                phase += freq / SAMPLE_RATE as f32;
                (phase * 2.0 * std::f32::consts::PI).sin() * (1.0 - progress) * 0.12
            })
            .collect()
    }

    /// Ascending arpeggio with the top note held.
    fn gen_win() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[523.0_f32, 659.0, 784.0] {
            samples.extend(gen_blip(freq, 0.09, 0.3));
        }
        samples.extend(gen_blip(1047.0, 0.3, 0.3));
        samples
    }

    /// Falling tones.
    fn gen_game_over() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[440.0_f32, 370.0, 311.0, 261.0] {
            samples.extend(gen_blip(freq, 0.14, 0.3));
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_merge(&self, _value: u32) {}
    pub fn play_spawn(&self) {}
    pub fn play_slide(&self) {}
    pub fn play_win(&self) {}
    pub fn play_game_over(&self) {}
}
