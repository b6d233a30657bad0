//! Offline capture replay.
//!
//! Two formats exist in the wild: line-oriented hexdumps written by the
//! dump scripts that accompanied the protocol reverse engineering, and
//! raw byte dumps saved by the vendor's own race software (`.nxb`).
//! Both are re-framed exactly like live data.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use log::warn;

use crate::error::TransportError;
use crate::message::TRAILER;
use crate::source::{ByteSource, Chunk};

/// Line-oriented hexdump capture.
///
/// `#`-prefixed comment lines are ignored. Data lines carry
/// whitespace-separated `timestamp length hex-payload`, where the
/// payload hex may itself contain spaces. A single read may have
/// captured several frames; they are split on the trailer byte and the
/// line's timestamp belongs to the first, the rest arriving with 0.
pub struct HexdumpSource {
    lines: io::Lines<BufReader<File>>,
    queue: VecDeque<(f64, Vec<u8>)>,
}

impl HexdumpSource {
    pub fn open(path: &str, seek: u64) -> Result<HexdumpSource, TransportError> {
        let mut file = File::open(path).map_err(|e| TransportError::Open {
            path: path.to_string(),
            source: e,
        })?;
        if seek > 0 {
            file.seek(SeekFrom::Start(seek))?;
        }
        Ok(HexdumpSource {
            lines: BufReader::new(file).lines(),
            queue: VecDeque::new(),
        })
    }

    fn parse_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        let mut fields = line.split_whitespace();
        let ts = fields.next().and_then(|f| f.parse::<f64>().ok());
        let mlen = fields.next().and_then(|f| f.parse::<u64>().ok());
        let payload: String = fields.collect();

        let ts = match (ts, mlen) {
            (Some(ts), Some(_)) if !payload.is_empty() => ts,
            _ => {
                warn!("malformed capture line: {:?}", line);
                return;
            }
        };

        let bytes = match hex::decode(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("bad hex in capture line ({}): {:?}", e, line);
                return;
            }
        };

        // Split multi-frame reads so each piece carries its timestamp.
        let mut start = 0;
        let mut first = true;
        for (i, &b) in bytes.iter().enumerate() {
            if b == TRAILER {
                self.queue
                    .push_back((if first { ts } else { 0.0 }, bytes[start..=i].to_vec()));
                first = false;
                start = i + 1;
            }
        }
        if start < bytes.len() {
            // Trailing bytes without a trailer; let the framer buffer
            // them against the next line.
            self.queue
                .push_back((if first { ts } else { 0.0 }, bytes[start..].to_vec()));
        }
    }
}

impl ByteSource for HexdumpSource {
    fn pull(&mut self) -> Result<Option<Chunk>, TransportError> {
        loop {
            if let Some((ts, data)) = self.queue.pop_front() {
                return Ok(Some(Chunk::Bytes { ts, data }));
            }
            match self.lines.next() {
                None => return Ok(None),
                Some(line) => self.parse_line(&line?),
            }
        }
    }
}

/// Raw byte dump (`.nxb`), identical to live serial in framing.
pub struct RawDumpSource {
    file: File,
}

impl RawDumpSource {
    pub fn open(path: &str, seek: u64) -> Result<RawDumpSource, TransportError> {
        let mut file = File::open(path).map_err(|e| TransportError::Open {
            path: path.to_string(),
            source: e,
        })?;
        if seek > 0 {
            file.seek(SeekFrom::Start(seek))?;
        }
        Ok(RawDumpSource { file })
    }
}

impl ByteSource for RawDumpSource {
    fn pull(&mut self) -> Result<Option<Chunk>, TransportError> {
        let mut buf = [0u8; 512];
        match self.file.read(&mut buf)? {
            0 => Ok(None),
            n => Ok(Some(Chunk::Bytes {
                ts: 0.0,
                data: buf[..n].to_vec(),
            })),
        }
    }
}
