//! Progressive-loss logging.

/// How much training output to emit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Progressive loss at power-of-two example counts.
    Info,
    /// Info plus per-call detail.
    Debug,
}

/// Reports average progressive loss as examples stream through learn().
///
/// Constructed per model from its configured verbosity; never global.
/// Reports fire at power-of-two example counts so a long-running stream
/// produces logarithmically many lines.
#[derive(Debug, Clone)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    next_report: u64,
}

impl TrainingLogger {
    /// Create a logger with the given verbosity.
    pub fn new(verbosity: Verbosity) -> Self {
        TrainingLogger {
            verbosity,
            next_report: 1,
        }
    }

    /// Record that `examples` have been learned with the given running
    /// average loss; emits a line when a report boundary is crossed.
    pub fn log_progress(&mut self, examples: u64, average_loss: f64) {
        if self.verbosity < Verbosity::Info {
            return;
        }
        if examples >= self.next_report {
            eprintln!("examples {examples:>10}  average loss {average_loss:.6}");
            while self.next_report <= examples {
                self.next_report *= 2;
            }
        }
    }

    /// Emit the final summary line.
    pub fn finish(&self, examples: u64, average_loss: f64) {
        if self.verbosity >= Verbosity::Info {
            eprintln!("finished after {examples} examples, average loss {average_loss:.6}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_orders() {
        assert!(Verbosity::Silent < Verbosity::Info);
        assert!(Verbosity::Info < Verbosity::Debug);
        assert_eq!(Verbosity::default(), Verbosity::Silent);
    }

    #[test]
    fn report_boundary_doubles() {
        let mut logger = TrainingLogger::new(Verbosity::Silent);
        // Silent never advances the boundary through output, but the
        // bookkeeping must not panic or loop.
        for n in 1..100 {
            logger.log_progress(n, 0.1);
        }
    }
}
