//! LICH chunk collector.
//!
//! Every stream frame echoes 1/6th of the LSF through the Golay-protected
//! LICH. The collector accumulates chunks by their embedded counter and
//! hands out the LSF once all six slots hold data whose CRC verifies.
//!
//! One collector per in-progress incoming stream; reset on a new
//! stream id. This is the only mutable state in the core.

use crate::lsf::Lsf;
use m17_core::{FrameError, LICH_CHUNK_COUNT, LSF_SIZE_WITH_CRC};

#[derive(Debug, Clone, Copy)]
struct LichSlot {
    data: [u8; 5],
    metric: u32,
}

#[derive(Debug, Clone, Default)]
pub struct LichCollector {
    slots: [Option<LichSlot>; LICH_CHUNK_COUNT],
}

impl LichCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, e.g. when a new stream id appears.
    pub fn reset(&mut self) {
        self.slots = [None; LICH_CHUNK_COUNT];
    }

    /// Store a decoded 6-byte chunk. The counter lives in the top three
    /// bits of the last byte; `metric` is the Golay soft distance of the
    /// chunk (lower is better). An occupied slot is only overwritten by
    /// better-quality content; identical content refreshes the metric.
    pub fn accept(&mut self, chunk: &[u8; 6], metric: u32) -> Result<(), FrameError> {
        let counter = chunk[5] >> 5;
        if counter as usize >= LICH_CHUNK_COUNT {
            return Err(FrameError::InvalidValue {
                field: "lich_counter",
                value: counter as u64,
            });
        }

        let data: [u8; 5] = chunk[0..5].try_into().unwrap();
        let slot = &mut self.slots[counter as usize];
        match slot {
            Some(existing) if existing.data == data => {
                existing.metric = existing.metric.min(metric);
            }
            Some(existing) if metric < existing.metric => {
                *existing = LichSlot { data, metric };
            }
            Some(_) => {} // keep the better chunk already present
            None => *slot = Some(LichSlot { data, metric }),
        }
        Ok(())
    }

    pub fn chunks_received(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    /// Rebuild the LSF once all six slots are filled. Returns None while
    /// chunks are missing or while the assembled CRC does not verify.
    pub fn try_assemble(&self) -> Option<Lsf> {
        let mut bytes = [0u8; LSF_SIZE_WITH_CRC];
        for (i, slot) in self.slots.iter().enumerate() {
            let slot = slot.as_ref()?;
            bytes[i * 5..i * 5 + 5].copy_from_slice(&slot.data);
        }
        Lsf::from_bytes(&bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use m17_core::Address;

    fn test_lsf() -> Lsf {
        Lsf::new(
            Address::from_callsign("W2FBI").unwrap(),
            Address::from_callsign("N0CALL").unwrap(),
            0x0005,
        )
    }

    #[test]
    fn test_assemble_in_order() {
        let lsf = test_lsf();
        let mut collector = LichCollector::new();
        for chunk in lsf.lich_chunks().iter() {
            assert!(collector.try_assemble().is_none());
            collector.accept(chunk, 0).unwrap();
        }
        assert!(collector.is_complete());
        assert_eq!(collector.try_assemble().unwrap(), lsf);
    }

    #[test]
    fn test_assemble_out_of_order() {
        let lsf = test_lsf();
        let chunks = lsf.lich_chunks();
        let mut collector = LichCollector::new();
        for idx in [4, 0, 5, 2, 1, 3] {
            collector.accept(&chunks[idx], 10).unwrap();
        }
        assert_eq!(collector.try_assemble().unwrap(), lsf);
    }

    #[test]
    fn test_counter_out_of_range() {
        let mut collector = LichCollector::new();
        let mut chunk = [0u8; 6];
        chunk[5] = 6 << 5;
        assert!(collector.accept(&chunk, 0).is_err());
    }

    #[test]
    fn test_better_metric_wins() {
        let lsf = test_lsf();
        let chunks = lsf.lich_chunks();
        let mut collector = LichCollector::new();

        // a corrupted chunk 0 with a poor metric arrives first
        let mut bad = chunks[0];
        bad[0] ^= 0xFF;
        collector.accept(&bad, 500_000).unwrap();
        for chunk in &chunks[1..] {
            collector.accept(chunk, 0).unwrap();
        }
        assert!(collector.try_assemble().is_none(), "corrupt chunk must fail CRC");

        // the clean repeat with a better metric displaces it
        collector.accept(&chunks[0], 0).unwrap();
        assert_eq!(collector.try_assemble().unwrap(), lsf);
    }

    #[test]
    fn test_worse_metric_dropped() {
        let lsf = test_lsf();
        let chunks = lsf.lich_chunks();
        let mut collector = LichCollector::new();
        for chunk in chunks.iter() {
            collector.accept(chunk, 100).unwrap();
        }

        let mut bad = chunks[2];
        bad[1] ^= 0x55;
        collector.accept(&bad, 100_000).unwrap();
        assert_eq!(collector.try_assemble().unwrap(), lsf);
    }

    #[test]
    fn test_reset() {
        let lsf = test_lsf();
        let mut collector = LichCollector::new();
        for chunk in lsf.lich_chunks().iter() {
            collector.accept(chunk, 0).unwrap();
        }
        collector.reset();
        assert_eq!(collector.chunks_received(), 0);
        assert!(collector.try_assemble().is_none());
    }
}
