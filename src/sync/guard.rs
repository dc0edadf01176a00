/// Kind of self-caused transition whose echo must be swallowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EchoKind {
    /// A stack push issued while reconciling a history traversal; the stack's
    /// `Pushed`/`StepPushed` event must not be written back to history.
    Push,
    /// A `back()` issued on the host; its traversal notification must not be
    /// reconciled into a stack pop.
    Pop,
}

/// Echo suppression for the two directions of the sync.
///
/// Each `expect` announces exactly one upcoming echo; `try_consume` swallows
/// it when it arrives. This is not mutual exclusion: unexpected events pass
/// straight through.
#[derive(Debug, Default, Clone)]
pub struct EchoGuard {
    pushes: usize,
    pops: usize,
}

impl EchoGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&mut self, kind: EchoKind) {
        self.expect_many(kind, 1);
    }

    pub fn expect_many(&mut self, kind: EchoKind, count: usize) {
        *self.counter(kind) += count;
    }

    /// Swallow one expected echo. Returns `false` when none was expected.
    pub fn try_consume(&mut self, kind: EchoKind) -> bool {
        let counter = self.counter(kind);
        if *counter == 0 {
            return false;
        }
        *counter -= 1;
        true
    }

    /// Drop one expectation whose echo will never arrive.
    pub fn withdraw(&mut self, kind: EchoKind) {
        let counter = self.counter(kind);
        *counter = counter.saturating_sub(1);
    }

    pub fn pending(&self, kind: EchoKind) -> usize {
        match kind {
            EchoKind::Push => self.pushes,
            EchoKind::Pop => self.pops,
        }
    }

    fn counter(&mut self, kind: EchoKind) -> &mut usize {
        match kind {
            EchoKind::Push => &mut self.pushes,
            EchoKind::Pop => &mut self.pops,
        }
    }
}
