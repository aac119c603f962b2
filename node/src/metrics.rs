use protocol::Module;

/// Per-connection instruction counters, logged when the connection closes.
#[derive(Debug, Default, Clone)]
pub struct ConnectionMetrics {
    pub received: u64,
    pub errors: u64,

    pub model: u64,
    pub accelerator: u64,
    pub quantum: u64,
}

impl ConnectionMetrics {
    #[inline]
    pub fn bump(&mut self, module: Module) {
        self.received += 1;
        match module {
            Module::Model => self.model += 1,
            Module::Accelerator => self.accelerator += 1,
            Module::Quantum => self.quantum += 1,
        }
    }

    #[inline]
    pub fn bump_rejected(&mut self) {
        self.received += 1;
    }

    #[inline]
    pub fn bump_error(&mut self) {
        self.errors += 1;
    }
}
