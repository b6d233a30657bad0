//! Live serial input with reconnect.
//!
//! The gateway enumerates as a USB CDC device and is documented to be
//! insensitive to line settings, so the port is opened at its defaults
//! with only the read timeout adjusted.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::{info, warn};
use serialport::{self, SerialPort};

use crate::error::TransportError;
use crate::source::{ByteSource, Chunk};

/// Blocking read timeout on the port.
pub const READ_TIMEOUT: Duration = Duration::from_millis(300);

/// How long to wait before retrying a failed open.
pub const REOPEN_BACKOFF: Duration = Duration::from_secs(2);

/// Pacing of the `Idle` sentinel while the port is gone, so the caller
/// stays responsive without spinning.
const IDLE_PACE: Duration = Duration::from_millis(50);

/// Consecutive empty reads tolerated before the port is proactively
/// reset.
const EMPTY_READ_LIMIT: u32 = 4;

/// One-shot mode change some gateway firmwares want before they start
/// talking.
pub const MODE_CHANGE: &[u8] = b"$PSILFDX,,R\r\n";

/// A serial port as a byte source, reopening on errors and device
/// disappearance. The handle is released on drop.
pub struct SerialSource {
    path: String,
    send_init: bool,
    stream: Option<Box<dyn SerialPort>>,
    empty_reads: u32,
    retry_at: Option<Instant>,
}

impl SerialSource {
    pub fn new(path: &str, send_init: bool) -> SerialSource {
        SerialSource {
            path: path.to_string(),
            send_init,
            stream: None,
            empty_reads: 0,
            retry_at: None,
        }
    }

    /// Try to open the port once. A device-absent failure arms the
    /// reopen backoff and returns `Ok`; only unrecoverable failures
    /// (permissions, nonsense paths) become errors.
    fn open(&mut self) -> Result<(), TransportError> {
        match serialport::open(&self.path) {
            Ok(mut stream) => {
                if let Err(e) = stream.set_timeout(READ_TIMEOUT) {
                    warn!("{}: cannot set read timeout: {}", self.path, e);
                }
                if self.send_init {
                    if let Err(e) = stream.write_all(MODE_CHANGE) {
                        warn!("{}: mode change write failed: {}", self.path, e);
                        self.retry_at = Some(Instant::now() + REOPEN_BACKOFF);
                        return Ok(());
                    }
                }
                info!("{} open", self.path);
                self.stream = Some(stream);
                self.empty_reads = 0;
                Ok(())
            }
            Err(e) if device_absent(&e) => {
                warn!("{}: {}", self.path, e);
                self.retry_at = Some(Instant::now() + REOPEN_BACKOFF);
                Ok(())
            }
            Err(e) => Err(TransportError::Port {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn close(&mut self) {
        // Dropping the boxed port closes the descriptor.
        self.stream = None;
    }
}

impl ByteSource for SerialSource {
    fn pull(&mut self) -> Result<Option<Chunk>, TransportError> {
        if self.stream.is_none() {
            if let Some(at) = self.retry_at {
                if Instant::now() < at {
                    thread::sleep(IDLE_PACE);
                    return Ok(Some(Chunk::Idle));
                }
                self.retry_at = None;
            }
            self.open()?;
            if self.stream.is_none() {
                thread::sleep(IDLE_PACE);
                return Ok(Some(Chunk::Idle));
            }
        }

        let mut buf = [0u8; 256];
        let result = match self.stream.as_mut() {
            Some(stream) => stream.read(&mut buf),
            None => return Ok(Some(Chunk::Idle)),
        };

        match result {
            Ok(0) => Ok(Some(self.empty_read())),
            Ok(n) => {
                self.empty_reads = 0;
                Ok(Some(Chunk::Bytes {
                    ts: unix_now(),
                    data: buf[..n].to_vec(),
                }))
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => Ok(Some(self.empty_read())),
            Err(e) => {
                warn!("{}: read failed: {}", self.path, e);
                self.close();
                // No extra sleep here; the reopen backoff paces us.
                self.retry_at = Some(Instant::now() + REOPEN_BACKOFF);
                Ok(Some(Chunk::Idle))
            }
        }
    }
}

impl SerialSource {
    fn empty_read(&mut self) -> Chunk {
        self.empty_reads += 1;
        info!(
            "serial read timeout after {:.3} seconds",
            READ_TIMEOUT.as_secs_f64()
        );
        if self.empty_reads > EMPTY_READ_LIMIT {
            info!("excessive empty reads, resetting port");
            self.close();
            self.empty_reads = 0;
        }
        Chunk::Idle
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn device_absent(e: &serialport::Error) -> bool {
    use serialport::ErrorKind;
    match e.kind() {
        ErrorKind::NoDevice => true,
        ErrorKind::Io(kind) => !matches!(kind, io::ErrorKind::PermissionDenied),
        _ => false,
    }
}
