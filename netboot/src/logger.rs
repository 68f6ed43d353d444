//! Serial-Backed Logging
//!
//! Routes the `log` facade to the boot serial port. The sink is a byte
//! closure injected at startup (normally a cloned port handle); until one
//! is installed every record is dropped, so early code can call `info!`
//! and friends unconditionally.
//!
//! Records are framed as `[LEVEL] target: message` with a CRLF ending,
//! one line each, which is what serial consoles expect. The sink lock is
//! held for the whole line, keeping lines whole even if a second context
//! ever logs.

use core::fmt::{self, Write};

use alloc::boxed::Box;
use log::{LevelFilter, Metadata, Record};

type Sink = Box<dyn FnMut(u8) + Send>;

static SINK: spin::Mutex<Option<Sink>> = spin::Mutex::new(None);
static REGISTER: spin::Once<()> = spin::Once::new();

struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

struct SinkWriter<'a> {
    sink: &'a mut Sink,
}

impl fmt::Write for SinkWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            (self.sink)(byte);
        }
        Ok(())
    }
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut slot = SINK.lock();
        if let Some(sink) = slot.as_mut() {
            let mut out = SinkWriter { sink };
            let _ = write!(
                out,
                "[{}] {}: {}\r\n",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

/// Route the `log` facade to `sink` at the given level.
///
/// The first call registers the logger; later calls just swap the sink
/// and adjust the level, so a better port can take over mid-boot.
pub fn init(sink: impl FnMut(u8) + Send + 'static, level: LevelFilter) {
    *SINK.lock() = Some(Box::new(sink));
    REGISTER.call_once(|| {
        // Failure only means another logger won the race; keep it.
        let _ = log::set_logger(&LOGGER);
    });
    log::set_max_level(level);
}
