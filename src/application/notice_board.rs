use crate::domain::notice::{Severity, SystemNotice};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Owner of the process-wide [`SystemNotice`].
///
/// Reads are lock-free and never wait on a writer. A write swaps in a whole new
/// notice, so message and severity are always observed together. Concurrent
/// writers race and the last one wins.
#[derive(Debug)]
pub struct NoticeBoard {
    current: ArcSwap<SystemNotice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::with_notice(SystemNotice::operational())
    }

    pub fn with_notice(notice: SystemNotice) -> Self {
        Self {
            current: ArcSwap::from_pointee(notice),
        }
    }

    pub fn read(&self) -> Arc<SystemNotice> {
        self.current.load_full()
    }

    pub fn write(&self, message: impl Into<String>, severity: Severity) {
        self.publish(SystemNotice::new(message, severity));
    }

    pub fn publish(&self, notice: SystemNotice) {
        self.current.store(Arc::new(notice));
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notice::DEGRADED_MESSAGE;

    #[test]
    fn test_starts_ok() {
        let board = NoticeBoard::new();
        assert_eq!(board.read().severity, Severity::Ok);
    }

    #[test]
    fn test_last_writer_wins() {
        let board = NoticeBoard::new();
        board.write(DEGRADED_MESSAGE, Severity::Degraded);
        board.write("Scheduled maintenance", Severity::Info);

        let notice = board.read();
        assert_eq!(notice.severity, Severity::Info);
        assert_eq!(notice.message, "Scheduled maintenance");
    }

    #[test]
    fn test_reader_keeps_its_copy_across_writes() {
        let board = NoticeBoard::new();
        let before = board.read();
        board.publish(SystemNotice::degraded());
        assert_eq!(before.severity, Severity::Ok);
        assert_eq!(board.read().severity, Severity::Degraded);
    }

    #[test]
    fn test_concurrent_writers_never_tear() {
        let board = Arc::new(NoticeBoard::new());
        let writers: Vec<_> = (0..8)
            .map(|i| {
                let board = Arc::clone(&board);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        if i % 2 == 0 {
                            board.publish(SystemNotice::degraded());
                        } else {
                            board.publish(SystemNotice::operational());
                        }
                        let seen = board.read();
                        let paired = match seen.severity {
                            Severity::Degraded => seen.message == DEGRADED_MESSAGE,
                            _ => seen.message != DEGRADED_MESSAGE,
                        };
                        assert!(paired, "torn notice: {:?}", seen);
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }
    }
}
