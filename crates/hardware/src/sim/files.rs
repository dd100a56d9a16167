//! Simulation file-path container.
//!
//! Maps the command line onto the full set of input and output paths. Two
//! layouts are accepted: no arguments (the default file names in the working
//! directory) or exactly 27 positional paths in the fixed order
//! `imem0..3 memin memout regout0..3 coretrace0..3 bustrace dsram0..3
//! tsram0..3 stats0..3`. Anything else is a configuration error.

use crate::common::SimError;
use crate::common::constants::NUM_CORES;

/// Paths of every file a simulation reads or writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSet {
    /// Per-core instruction memory images.
    pub imem: [String; NUM_CORES],
    /// Main memory initialization image.
    pub memin: String,
    /// Final main memory dump.
    pub memout: String,
    /// Per-core final register dumps.
    pub regout: [String; NUM_CORES],
    /// Per-core pipeline traces.
    pub coretrace: [String; NUM_CORES],
    /// Bus transaction trace.
    pub bustrace: String,
    /// Per-core data SRAM dumps.
    pub dsram: [String; NUM_CORES],
    /// Per-core tag SRAM dumps.
    pub tsram: [String; NUM_CORES],
    /// Per-core statistics files.
    pub stats: [String; NUM_CORES],
}

fn per_core(prefix: &str, suffix: &str) -> [String; NUM_CORES] {
    std::array::from_fn(|i| format!("{prefix}{i}{suffix}"))
}

impl Default for FileSet {
    fn default() -> Self {
        Self {
            imem: per_core("imem", ".txt"),
            memin: "memin.txt".into(),
            memout: "memout.txt".into(),
            regout: per_core("regout", ".txt"),
            coretrace: std::array::from_fn(|i| format!("core{i}trace.txt")),
            bustrace: "bustrace.txt".into(),
            dsram: per_core("dsram", ".txt"),
            tsram: per_core("tsram", ".txt"),
            stats: per_core("stats", ".txt"),
        }
    }
}

impl FileSet {
    /// Number of positional arguments in the explicit layout.
    pub const ARG_COUNT: usize = 27;

    /// Builds a file set from the positional arguments (program name
    /// excluded). Zero arguments selects the defaults.
    pub fn from_args(args: &[String]) -> Result<Self, SimError> {
        if args.is_empty() {
            return Ok(Self::default());
        }
        if args.len() != Self::ARG_COUNT {
            return Err(SimError::ArgumentCount(args.len()));
        }

        fn one(iter: &mut impl Iterator<Item = String>) -> String {
            iter.next().unwrap_or_default()
        }
        fn four(iter: &mut impl Iterator<Item = String>) -> [String; NUM_CORES] {
            std::array::from_fn(|_| one(iter))
        }

        // Field order mirrors the command-line order, not the struct order.
        let mut iter = args.iter().cloned();
        let imem = four(&mut iter);
        let memin = one(&mut iter);
        let memout = one(&mut iter);
        let regout = four(&mut iter);
        let coretrace = four(&mut iter);
        let bustrace = one(&mut iter);
        let dsram = four(&mut iter);
        let tsram = four(&mut iter);
        let stats = four(&mut iter);

        Ok(Self {
            imem,
            memin,
            memout,
            regout,
            coretrace,
            bustrace,
            dsram,
            tsram,
            stats,
        })
    }
}
