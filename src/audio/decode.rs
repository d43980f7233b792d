use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Raw audio could not be turned into a usable sample buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("audio input is empty")]
    Empty,
    #[error("failed to read audio: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("no audio tracks found")]
    NoTrack,
    #[error("unknown sample rate")]
    UnknownSampleRate,
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),
    #[error("malformed audio stream: {0}")]
    Malformed(String),
    #[error("decoded stream contains no samples")]
    NoSamples,
    #[error("channel {0} is not present in the signal")]
    MissingChannel(usize),
}

impl From<SymphoniaError> for DecodeError {
    fn from(err: SymphoniaError) -> Self {
        match err {
            SymphoniaError::IoError(e) => DecodeError::Io(e),
            SymphoniaError::Unsupported(what) => DecodeError::UnsupportedCodec(what.to_string()),
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

/// Decoded audio, kept planar. Immutable once built.
#[derive(Clone, Debug)]
pub struct AudioSignal {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioSignal {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(vec![samples], sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Result<&[f32], DecodeError> {
        self.channels
            .get(index)
            .map(Vec::as_slice)
            .ok_or(DecodeError::MissingChannel(index))
    }

    /// Sample frames per channel (length of channel 0).
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Length in seconds; 0 when the sample rate is unknown.
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }
}

pub fn decode_file(path: &Path) -> Result<AudioSignal, DecodeError> {
    let file = std::fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(DecodeError::Empty);
    }

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    log::debug!("Decoding {}", path.display());
    decode_source(Box::new(file), &hint)
}

/// Decode an in-memory encoded blob, e.g. a finished recording.
///
/// `extension` is only a hint for the format probe; the container is still
/// detected from its content.
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioSignal, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    decode_source(Box::new(Cursor::new(bytes)), &hint)
}

fn decode_source(source: Box<dyn MediaSource>, hint: &Hint) -> Result<AudioSignal, DecodeError> {
    let mss = MediaSourceStream::new(source, Default::default());

    let probed = symphonia::default::get_probe()
        .format(hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;

    let track_id = track.id;
    let track_channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedCodec(e.to_string()))?;

    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); track_channels];
    let mut skipped = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping corrupt packet: {}", msg);
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let count = spec.channels.count().max(1);
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        if channels.len() < count {
            channels.resize(count, Vec::new());
        }
        for frame in sample_buf.samples().chunks(count) {
            for (ch, &sample) in frame.iter().enumerate() {
                channels[ch].push(sample);
            }
        }
    }

    if channels.first().map_or(true, Vec::is_empty) {
        return Err(DecodeError::NoSamples);
    }

    let signal = AudioSignal::new(channels, sample_rate);

    if skipped > 0 {
        log::warn!("Skipped {} undecodable packets", skipped);
    }
    log::info!(
        "Decoded audio: {} frames x {} channels, {}Hz, {:.2}s",
        signal.frames(),
        signal.channel_count(),
        sample_rate,
        signal.duration()
    );

    Ok(signal)
}
