use std::{
    collections::HashMap,
    fmt::{self, Display},
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};
use tabula_core::{Error, Result};

/// Calls a memory database counts and can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Select,
    Exec,
    Begin,
    Commit,
    Rollback,
    TableExists,
    PrimaryKeys,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Insert,
        Operation::Select,
        Operation::Exec,
        Operation::Begin,
        Operation::Commit,
        Operation::Rollback,
        Operation::TableExists,
        Operation::PrimaryKeys,
    ];
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Insert => "insert",
            Operation::Select => "select",
            Operation::Exec => "exec",
            Operation::Begin => "begin",
            Operation::Commit => "commit",
            Operation::Rollback => "rollback",
            Operation::TableExists => "table exists",
            Operation::PrimaryKeys => "primary keys",
        })
    }
}

/// Snapshot of the call counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    counts: [u64; Operation::ALL.len()],
}

impl Stats {
    pub fn get(&self, operation: Operation) -> u64 {
        self.counts[operation as usize]
    }

    /// Calls of every kind.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Default)]
pub(crate) struct Instrumentation {
    counts: [AtomicU64; Operation::ALL.len()],
    failures: Mutex<HashMap<Operation, String>>,
}

impl Instrumentation {
    /// Counts the call, then fails it if a failure was scheduled.
    pub(crate) fn record(&self, operation: Operation) -> Result<()> {
        self.counts[operation as usize].fetch_add(1, Ordering::Relaxed);
        let scheduled = match self.failures.lock() {
            Ok(mut failures) => failures.remove(&operation),
            Err(..) => None,
        };
        if let Some(message) = scheduled {
            let error = Error::msg(message).context(format!("While running {}", operation));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }

    pub(crate) fn fail_next(&self, operation: Operation, message: String) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(operation, message);
        }
    }

    pub(crate) fn snapshot(&self) -> Stats {
        Stats {
            counts: self.counts.each_ref().map(|v| v.load(Ordering::Relaxed)),
        }
    }

    pub(crate) fn reset(&self) {
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }
}
