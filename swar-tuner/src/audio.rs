//! # Audio Source Module
//!
//! Feeds fixed-size frames to the tuner loop over a crossbeam channel. Two
//! sources are available:
//! - raw little-endian f32 mono PCM on stdin, read on a helper thread
//! - the default input device through CPAL (with the `live` feature)

use crossbeam_channel::Sender;
use std::io::Read;
use std::thread::{self, JoinHandle};

/// Default number of samples per analysis frame (~46 ms at 44.1 kHz).
pub const DEFAULT_FRAME_SIZE: usize = 2048;

/// Splits a growing sample buffer into whole frames and sends them.
///
/// Leftover samples stay in `buffer` for the next call.
///
/// # Returns
/// * `false` - If the receiving side has gone away
fn drain_frames(buffer: &mut Vec<f32>, frame_size: usize, sender: &Sender<Vec<f32>>) -> bool {
    while buffer.len() >= frame_size {
        let frame: Vec<f32> = buffer.drain(..frame_size).collect();
        if sender.send(frame).is_err() {
            return false;
        }
    }
    true
}

/// Decodes little-endian f32 samples. A trailing partial sample is ignored.
pub fn decode_f32le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Starts reading raw f32 PCM from a reader on its own thread.
///
/// The channel closes when the reader hits end of input or fails; a failure
/// is logged.
pub fn spawn_reader<R>(
    mut reader: R,
    frame_size: usize,
    sender: Sender<Vec<f32>>,
) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        log::debug!("[READER] Reading f32le PCM, {} samples per frame", frame_size);
        let mut bytes = vec![0_u8; frame_size * 4];
        let mut pending_bytes: Vec<u8> = Vec::with_capacity(4);
        let mut samples = Vec::with_capacity(frame_size * 2);

        loop {
            let read = match reader.read(&mut bytes) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::error!("[READER] Read failed: {}", e);
                    break;
                }
            };

            // Reads are not sample-aligned; carry split samples over.
            pending_bytes.extend_from_slice(&bytes[..read]);
            let whole = pending_bytes.len() / 4 * 4;
            samples.extend(decode_f32le(&pending_bytes[..whole]));
            pending_bytes.drain(..whole);

            if !drain_frames(&mut samples, frame_size, &sender) {
                log::debug!("[READER] Receiver closed");
                return;
            }
        }

        if !samples.is_empty() {
            log::debug!("[READER] Dropping {} trailing samples", samples.len());
        }
        log::debug!("[READER] End of input");
    })
}

/// Live capture from the default input device.
#[cfg(feature = "live")]
pub mod live {
    use super::drain_frames;
    use anyhow::{Result, anyhow};
    use cpal::SupportedStreamConfigRange;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use crossbeam_channel::Sender;

    /// Target capture rate.
    const TARGET_SAMPLE_RATE: u32 = 44100;

    /// Starts audio capture from the default input device.
    ///
    /// Frames of `frame_size` samples are sent on `sender`; frames are dropped
    /// if the tuner loop falls behind.
    ///
    /// # Returns
    /// * `Ok((stream, sample_rate))` - Audio stream handle and sample rate
    /// * `Err(e)` - Error if audio setup fails
    pub fn start_audio_capture(
        frame_size: usize,
        sender: Sender<Vec<f32>>,
    ) -> Result<(cpal::Stream, u32)> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("No input device available"))?;

        log::info!("Using audio input device: {}", device.name()?);

        let configs = device.supported_input_configs()?.collect::<Vec<_>>();
        let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
            .ok_or_else(|| anyhow!("No suitable mono f32 input format found"))?;

        let rate = TARGET_SAMPLE_RATE
            .clamp(supported_config.min_sample_rate().0, supported_config.max_sample_rate().0);
        let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
        let sample_rate = config.sample_rate().0;
        let config: cpal::StreamConfig = config.into();

        log::info!("Selected sample rate: {} Hz", sample_rate);

        let err_fn = |err| log::error!("An error occurred on the audio stream: {}", err);

        let mut audio_buffer = Vec::with_capacity(frame_size * 2);

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                audio_buffer.extend_from_slice(data);
                // The loop exits on its own when the receiver is gone.
                let _ = drain_frames(&mut audio_buffer, frame_size, &sender);
            },
            err_fn,
            None,
        )?;

        stream.play()?;

        Ok((stream, sample_rate))
    }

    /// Picks a mono f32 configuration whose rate range is closest to the target.
    fn find_supported_config(
        configs: Vec<SupportedStreamConfigRange>,
        target_rate: u32,
    ) -> Option<SupportedStreamConfigRange> {
        configs
            .into_iter()
            .filter(|c| c.channels() == 1 && c.sample_format() == cpal::SampleFormat::F32)
            .min_by_key(|c| {
                let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
                let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
                if (c.min_sample_rate().0..=c.max_sample_rate().0).contains(&target_rate) {
                    0
                } else {
                    min_diff.min(max_diff)
                }
            })
    }
}
