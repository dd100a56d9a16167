//! Cycle trace formatting and emission.
//!
//! This module renders the two deterministic trace streams and defines the
//! seam through which the driver emits them:
//! 1. **Core trace:** One line per non-halted core cycle: the global cycle,
//!    the PC resident in each of the five stages (`---` for bubbles), and
//!    registers R2..R15.
//! 2. **Bus trace:** One line per cycle with an active command: cycle,
//!    origin id, command code, address, data, and the shared flag.
//! 3. **Sinks:** File-backed writers for the CLI and an in-memory collector
//!    for tests, behind the [`TraceSink`] trait so the engine never owns
//!    file handles.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::common::SimError;
use crate::common::constants::NUM_CORES;
use crate::core::Core;
use crate::sim::files::FileSet;
use crate::soc::Bus;

/// Destination for trace lines. Lines arrive fully formatted, without
/// trailing newline.
pub trait TraceSink {
    /// Records one bus transaction line.
    fn bus_line(&mut self, line: &str) -> io::Result<()>;
    /// Records one pipeline trace line for the given core.
    fn core_line(&mut self, core: usize, line: &str) -> io::Result<()>;
}

/// Formats a bus trace line: cycle, origin, command, address, data, shared.
pub fn format_bus_line(cycle: u32, bus: &Bus) -> String {
    format!(
        "{} {:X} {:X} {:06X} {:08X} {:X}",
        cycle,
        bus.origin,
        bus.cmd.code(),
        bus.addr.val(),
        bus.data,
        u32::from(bus.shared)
    )
}

/// Formats a core trace line for the current cycle.
///
/// Emitted before the clock edge, so the stage columns show the instructions
/// resident in each latch this cycle and the register values are
/// pre-writeback. The Fetch column shows the PC about to be fetched, or `---`
/// once HALT has been observed in Decode.
pub fn format_core_line(cycle: u32, core: &Core) -> String {
    let mut line = format!("{cycle}");

    if core.halt_seen {
        line.push_str(" ---");
    } else {
        line.push_str(&format!(" {:03X}", core.pc));
    }

    let stage = |valid: bool, pc: u32| {
        if valid {
            format!(" {pc:03X}")
        } else {
            " ---".to_string()
        }
    };
    line.push_str(&stage(core.if_id.valid, core.if_id.pc));
    line.push_str(&stage(core.id_ex.valid, core.id_ex.pc));
    line.push_str(&stage(core.ex_mem.valid, core.ex_mem.pc));
    line.push_str(&stage(core.mem_wb.valid, core.mem_wb.pc));

    for reg in 2..16 {
        line.push_str(&format!(" {:08X}", core.regs.read(reg)));
    }
    line
}

/// Sink that discards every line; for runs where only dumps matter.
#[derive(Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn bus_line(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }
    fn core_line(&mut self, _core: usize, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that collects lines in memory; used by tests to assert on traces.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Collected bus trace lines.
    pub bus: Vec<String>,
    /// Collected per-core trace lines.
    pub cores: [Vec<String>; NUM_CORES],
}

impl TraceSink for MemorySink {
    fn bus_line(&mut self, line: &str) -> io::Result<()> {
        self.bus.push(line.to_string());
        Ok(())
    }
    fn core_line(&mut self, core: usize, line: &str) -> io::Result<()> {
        self.cores[core].push(line.to_string());
        Ok(())
    }
}

/// Sink that streams lines to the bus and core trace files.
pub struct FileSink {
    bus: BufWriter<File>,
    cores: Vec<BufWriter<File>>,
}

impl FileSink {
    /// Creates the trace files named in `files`, truncating existing ones.
    pub fn create(files: &FileSet) -> Result<Self, SimError> {
        let bus = BufWriter::new(
            File::create(&files.bustrace).map_err(|e| SimError::file(&files.bustrace, e))?,
        );
        let mut cores = Vec::with_capacity(NUM_CORES);
        for path in &files.coretrace {
            cores.push(BufWriter::new(
                File::create(path).map_err(|e| SimError::file(path, e))?,
            ));
        }
        Ok(Self { bus, cores })
    }

    /// Flushes all writers; call once after the run completes.
    pub fn finish(mut self) -> io::Result<()> {
        self.bus.flush()?;
        for writer in &mut self.cores {
            writer.flush()?;
        }
        Ok(())
    }
}

impl TraceSink for FileSink {
    fn bus_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.bus, "{line}")
    }
    fn core_line(&mut self, core: usize, line: &str) -> io::Result<()> {
        writeln!(self.cores[core], "{line}")
    }
}
