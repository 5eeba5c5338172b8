// Message purge planning.
//
// The Discord layer pages through channel history and feeds each message
// into a `PurgeScan`; the scan decides which messages to delete and when
// to stop fetching.

/// Messages the user filter is allowed to look back through.
pub const PURGE_LOOKBACK: usize = 1000;

/// Discord's bulk-delete ceiling, also the command's max count.
pub const MAX_PURGE_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Keep feeding messages.
    Continue,
    /// Stop fetching; either enough matches or the lookback is exhausted.
    Done,
}

#[derive(Debug, Clone)]
pub struct PurgeScan {
    requested: usize,
    author_filter: Option<u64>,
    lookback: usize,
    scanned: usize,
    selected: Vec<u64>,
}

impl PurgeScan {
    /// `requested` is clamped to `1..=MAX_PURGE_COUNT`.
    pub fn new(requested: usize, author_filter: Option<u64>) -> Self {
        Self {
            requested: requested.clamp(1, MAX_PURGE_COUNT),
            author_filter,
            lookback: PURGE_LOOKBACK,
            scanned: 0,
            selected: Vec::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        if self.selected.len() >= self.requested || self.remaining_lookback() == 0 {
            ScanState::Done
        } else {
            ScanState::Continue
        }
    }

    /// How many more messages the next history page may return.
    pub fn next_page_size(&self) -> u8 {
        let wanted = match self.author_filter {
            Some(_) => self.remaining_lookback(),
            None => self.requested - self.selected.len(),
        };
        wanted.min(MAX_PURGE_COUNT) as u8
    }

    fn remaining_lookback(&self) -> usize {
        match self.author_filter {
            Some(_) => self.lookback.saturating_sub(self.scanned),
            None => usize::MAX,
        }
    }

    /// Feed one message, newest first.
    pub fn push(&mut self, message_id: u64, author_id: u64) -> ScanState {
        if self.state() == ScanState::Done {
            return ScanState::Done;
        }

        self.scanned += 1;
        if self.author_filter.map_or(true, |target| target == author_id) {
            self.selected.push(message_id);
        }
        self.state()
    }

    pub fn finish(self) -> PurgePlan {
        PurgePlan {
            requested: self.requested,
            filtered: self.author_filter.is_some(),
            message_ids: self.selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurgePlan {
    pub requested: usize,
    pub filtered: bool,
    pub message_ids: Vec<u64>,
}

impl PurgePlan {
    pub fn found(&self) -> usize {
        self.message_ids.len()
    }

    /// A user-filtered purge that found fewer matches than asked for.
    pub fn has_shortfall(&self) -> bool {
        self.filtered && self.found() < self.requested
    }
}
