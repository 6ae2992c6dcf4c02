//! Mono WAV output for rendered effects

use std::path::Path;

use anyhow::{Context, Result};

/// Sample encoding of the written file
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WavFormat {
    /// 16-bit PCM
    Pcm16,
    /// 32-bit float
    Float32,
}

pub fn write_mono(path: &Path, samples: &[f32], sample_rate: u32, format: WavFormat) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: match format {
            WavFormat::Pcm16 => 16,
            WavFormat::Float32 => 32,
        },
        sample_format: match format {
            WavFormat::Pcm16 => hound::SampleFormat::Int,
            WavFormat::Float32 => hound::SampleFormat::Float,
        },
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    match format {
        WavFormat::Pcm16 => {
            for &sample in samples {
                let s = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                writer.write_sample(s).context("Failed to write sample")?;
            }
        }
        WavFormat::Float32 => {
            for &sample in samples {
                writer.write_sample(sample).context("Failed to write sample")?;
            }
        }
    }

    writer.finalize().context("Failed to finalize WAV")?;
    Ok(())
}
