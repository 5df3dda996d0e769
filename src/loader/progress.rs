use std::fmt;
use std::io::Read;

/// Bytes received so far. `total` is unknown when the source does not report
/// a length up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(100.0),
            Some(total) => Some(self.loaded as f64 / total as f64 * 100.0),
            None => None,
        }
    }
}

impl fmt::Display for LoadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(pct) => write!(f, "{pct:.1}% loaded"),
            None => write!(f, "{} bytes loaded", self.loaded),
        }
    }
}

/// Logs progress at `info`, at most once per whole percent.
#[derive(Debug, Default)]
pub struct ProgressLog {
    last_percent: Option<u32>,
}

impl ProgressLog {
    /// Returns whether a line was logged.
    pub fn report(&mut self, progress: LoadProgress) -> bool {
        let bucket = progress.percent().map(|p| p.floor() as u32);
        if bucket.is_some() && bucket == self.last_percent {
            return false;
        }
        self.last_percent = bucket;
        log::info!("{progress}");
        true
    }
}

pub(crate) const CHUNK_SIZE: usize = 64 * 1024;

/// Upper bound on the buffer reserved up front from a reported size. Larger
/// bodies still load, they just grow the buffer as chunks arrive.
pub(crate) const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

pub(crate) fn initial_capacity(total: Option<u64>) -> usize {
    usize::try_from(total.unwrap_or(0).min(MAX_PREALLOCATION)).unwrap_or(0)
}

/// Drains `reader`, reporting progress after every chunk.
pub fn read_with_progress<R: Read>(
    mut reader: R,
    total: Option<u64>,
    mut on_progress: impl FnMut(LoadProgress),
) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(initial_capacity(total));
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        bytes.extend_from_slice(&chunk[..n]);
        on_progress(LoadProgress {
            loaded: bytes.len() as u64,
            total,
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_percent_and_display() {
        let p = LoadProgress {
            loaded: 50,
            total: Some(200),
        };
        assert_eq!(p.percent(), Some(25.0));
        assert_eq!(p.to_string(), "25.0% loaded");

        let unknown = LoadProgress {
            loaded: 42,
            total: None,
        };
        assert_eq!(unknown.percent(), None);
        assert_eq!(unknown.to_string(), "42 bytes loaded");
    }

    #[test]
    fn test_read_with_progress_reports_every_chunk() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 10];
        let mut events = Vec::new();
        let bytes = read_with_progress(Cursor::new(&data), Some(data.len() as u64), |p| {
            events.push(p)
        })
        .unwrap();

        assert_eq!(bytes, data);
        assert!(!events.is_empty());
        assert!(events.windows(2).all(|w| w[0].loaded < w[1].loaded));
        let last = events.last().unwrap();
        assert_eq!(last.loaded, data.len() as u64);
        assert_eq!(last.percent(), Some(100.0));
    }

    #[test]
    fn test_progress_log_skips_same_percent() {
        let mut log = ProgressLog::default();
        let at = |loaded| LoadProgress {
            loaded,
            total: Some(1000),
        };
        assert!(log.report(at(1)));
        assert!(!log.report(at(5)));
        assert!(log.report(at(10)));
        assert!(log.report(at(1000)));
    }

    #[test]
    fn test_initial_capacity_is_capped() {
        assert_eq!(initial_capacity(None), 0);
        assert_eq!(initial_capacity(Some(4096)), 4096);
        assert_eq!(initial_capacity(Some(u64::MAX)), MAX_PREALLOCATION as usize);
    }

    #[test]
    fn test_oversized_content_length_still_reads() {
        let data = vec![1u8; 100];
        let bytes = read_with_progress(Cursor::new(&data), Some(u64::MAX), |_| {}).unwrap();
        assert_eq!(bytes, data);
    }
}
