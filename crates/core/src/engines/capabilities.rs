//! FFmpeg capability probing.
//!
//! Computed once at startup and consulted by pipeline resolution; never
//! re-probed per request.

use std::collections::HashSet;
use std::process::Stdio;

use serde::Serialize;
use tokio::process::Command;
use tracing::warn;

use crate::pipeline::AudioOutputFormat;

use super::set::{EngineKind, EngineSet};

/// Which audio output formats the installed ffmpeg can actually produce:
/// each needs both its encoder and its muxer compiled in.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AudioSupport {
    pub mp3: bool,
    pub m4a: bool,
    pub aac: bool,
    pub ogg: bool,
    pub opus: bool,
    pub wav: bool,
    pub flac: bool,
}

impl AudioSupport {
    /// Probes `ffmpeg -encoders` and `ffmpeg -muxers` once.
    pub async fn detect(engines: &EngineSet) -> Self {
        let path = match engines.require(EngineKind::Ffmpeg) {
            Ok(path) => path,
            Err(e) => {
                warn!("cannot probe audio capabilities: {}", e);
                return Self::default();
            }
        };

        let encoders = listing(path, "-encoders").await;
        let muxers = listing(path, "-muxers").await;

        match (encoders, muxers) {
            (Some(encoders), Some(muxers)) => Self::from_probe_output(&encoders, &muxers),
            // The probe itself failed; assume the baseline build.
            _ => Self::assume_baseline(),
        }
    }

    /// Parses the two ffmpeg listings into a support map.
    pub fn from_probe_output(encoders: &str, muxers: &str) -> Self {
        let encoders = parse_names(encoders);
        let muxers = parse_names(muxers);
        let has = |encoder: &str, muxer: &str| {
            encoders.contains(encoder) && muxers.contains(muxer)
        };

        Self {
            mp3: has("libmp3lame", "mp3"),
            m4a: has("aac", "ipod"),
            aac: has("aac", "adts"),
            ogg: has("libvorbis", "ogg"),
            opus: has("libopus", "ogg"),
            wav: has("pcm_s16le", "wav"),
            flac: has("flac", "flac"),
        }
    }

    /// What any stock ffmpeg build ships with; used when probing fails
    /// even though the binary runs.
    pub fn assume_baseline() -> Self {
        Self {
            mp3: true,
            m4a: true,
            aac: true,
            ogg: false,
            opus: false,
            wav: true,
            flac: true,
        }
    }

    pub fn supports(&self, format: AudioOutputFormat) -> bool {
        match format {
            AudioOutputFormat::Mp3 => self.mp3,
            AudioOutputFormat::M4a => self.m4a,
            AudioOutputFormat::Aac => self.aac,
            AudioOutputFormat::Ogg => self.ogg,
            AudioOutputFormat::Opus => self.opus,
            AudioOutputFormat::Wav => self.wav,
            AudioOutputFormat::Flac => self.flac,
        }
    }
}

async fn listing(path: &std::path::Path, flag: &str) -> Option<String> {
    let output = Command::new(path)
        .args(["-hide_banner", flag])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Extracts the name column from an ffmpeg `-encoders`/`-muxers` listing.
/// Names appear after a dashed separator line, one entry per line, with a
/// flag column first; muxer names may be comma-grouped.
fn parse_names(listing: &str) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut past_separator = false;

    for line in listing.lines() {
        let trimmed = line.trim();
        if !past_separator {
            if !trimmed.is_empty() && trimmed.chars().all(|c| c == '-') {
                past_separator = true;
            }
            continue;
        }
        let mut columns = trimmed.split_whitespace();
        let (Some(_flags), Some(name)) = (columns.next(), columns.next()) else {
            continue;
        };
        for part in name.split(',') {
            names.insert(part.to_string());
        }
    }

    names
}
