use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};

use crate::{error::HostError, host::AudioHost, synth::renderer::Renderer, MAX_BLOCK_SIZE};

/// Default output device through `cpal`.
///
/// The renderer produces mono; every output channel gets the same sample.
#[derive(Default)]
pub struct CpalHost {
    device: Option<cpal::Device>,
    config: Option<cpal::StreamConfig>,
    stream: Option<cpal::Stream>,
}

impl CpalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> Option<u16> {
        self.config.as_ref().map(|config| config.channels)
    }
}

impl AudioHost for CpalHost {
    fn open(&mut self) -> Result<f32, HostError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(HostError::NoDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| HostError::DefaultConfig(e.to_string()))?;

        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(HostError::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }

        let sample_rate = supported.sample_rate().0 as f32;
        let config: cpal::StreamConfig = supported.into();
        info!(
            "output device ready: {} Hz, {} channels",
            config.sample_rate.0, config.channels
        );

        self.device = Some(device);
        self.config = Some(config);
        Ok(sample_rate)
    }

    fn launch(&mut self, mut renderer: Renderer) -> Result<(), HostError> {
        let (Some(device), Some(config)) = (self.device.as_ref(), self.config.as_ref()) else {
            return Err(HostError::NotOpened);
        };
        let channels = usize::from(config.channels.max(1));

        // Reused by the callback, never reallocated.
        let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                        let frames = chunk.len() / channels;
                        let mono = &mut block[..frames];
                        renderer.render(mono);

                        // Duplicate mono to all channels
                        for (frame, &sample) in chunk.chunks_mut(channels).zip(mono.iter()) {
                            frame.fill(sample);
                        }
                    }
                },
                |err| error!("stream error: {err}"),
                None,
            )
            .map_err(|e| HostError::BuildStream(e.to_string()))?;

        stream.play().map_err(|e| HostError::Play(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), HostError> {
        let stream = self.stream.as_ref().ok_or(HostError::NotLaunched)?;
        stream.pause().map_err(|e| HostError::Pause(e.to_string()))
    }

    fn resume(&mut self) -> Result<(), HostError> {
        let stream = self.stream.as_ref().ok_or(HostError::NotLaunched)?;
        stream.play().map_err(|e| HostError::Play(e.to_string()))
    }
}
