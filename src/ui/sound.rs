/// Sound engine: procedural chiptune-style effects via rodio.
///
/// Each effect is synthesized once at init into an in-memory WAV
/// buffer; playback is fire-and-forget through a detached Sink.
///
/// Build without the "sound" feature to strip audio entirely (the stub
/// SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_key: Arc<Vec<u8>>,
        sfx_hit: Arc<Vec<u8>>,
        sfx_victory: Arc<Vec<u8>>,
        sfx_defeat: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_key: Arc::new(make_wav(&gen_key_pickup())),
                sfx_hit: Arc::new(make_wav(&gen_hit())),
                sfx_victory: Arc::new(make_wav(&gen_victory())),
                sfx_defeat: Arc::new(make_wav(&gen_defeat())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_key(&self) { self.play(&self.sfx_key); }
        pub fn play_hit(&self) { self.play(&self.sfx_hit); }
        pub fn play_victory(&self) { self.play(&self.sfx_victory); }
        pub fn play_defeat(&self) { self.play(&self.sfx_defeat); }
    }

    // ── Waveform generators: mono f32 samples ──

    /// Key pickup: bright ascending arpeggio E6→G6→B6.
    fn gen_key_pickup() -> Vec<f32> {
        let notes = [1319.0_f32, 1568.0, 1976.0];
        let note_dur = 0.05;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                samples.push(wave * env * 0.28);
            }
        }
        samples
    }

    /// Life lost: harsh low thud with a noise tail.
    fn gen_hit() -> Vec<f32> {
        let duration = 0.18;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 987654321;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 160.0 - t * 80.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * 2.0 * std::f32::consts::PI).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(1.2);
                (tone * 0.6 + noise * 0.4) * env * 0.35
            })
            .collect()
    }

    /// Win: ascending fanfare C5→E5→G5→C6 with a sustained top note.
    fn gen_victory() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0];
        let note_dur = 0.11;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.6
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.1;
                samples.push(wave * env * 0.3);
            }
        }
        let top = 1047.0_f32;
        let n = (SAMPLE_RATE as f32 * 0.3) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            samples.push((t * top * 2.0 * std::f32::consts::PI).sin() * env * 0.3);
        }
        samples
    }

    /// Loss: slow descending minor walk A4→F4→D4→A3.
    fn gen_defeat() -> Vec<f32> {
        let notes = [440.0_f32, 349.0, 294.0, 220.0];
        let note_dur = 0.16;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push((t * freq * 2.0 * std::f32::consts::PI).sin() * env * 0.3);
            }
        }
        // Fade the tail so the last note doesn't click.
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for i in (total - fade_len)..total {
            let ratio = (total - i) as f32 / fade_len as f32;
            samples[i] *= ratio;
        }
        samples
    }

    // ── WAV encoder ──

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
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
            let clamped = s.max(-1.0).min(1.0);
            let val = (clamped * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_key(&self) {}
    pub fn play_hit(&self) {}
    pub fn play_victory(&self) {}
    pub fn play_defeat(&self) {}
}
