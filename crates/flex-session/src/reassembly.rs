//! FFT and waterfall frame reassembly.
//!
//! A panadapter stream arrives as several VITA packets that together
//! cover one `totalBinsInFrame`-wide spectrum; a waterfall stream arrives
//! as several tiles that together cover one row at a given `timecode`.
//! Neither is guaranteed to arrive in bin order, so this module buffers
//! fragments per stream id and only reports a frame complete once every
//! bin has been written.

use std::collections::HashMap;

use flex_vita::payload::fft::FftPacket;
use flex_vita::payload::waterfall::WaterfallTile;

/// A fully reassembled panadapter frame.
#[derive(Clone, PartialEq, Debug)]
pub struct CompleteFftFrame {
    pub stream_id: u32,
    pub frame_index: u32,
    pub bins: Vec<u16>,
}

/// One stream's in-progress FFT frame.
struct FftAssembly {
    frame_index: u32,
    total_bins: usize,
    bins: Vec<u16>,
    filled: Vec<bool>,
    remaining: usize,
}

impl FftAssembly {
    fn new(frame_index: u32, total_bins: usize) -> Self {
        Self {
            frame_index,
            total_bins,
            bins: vec![0; total_bins],
            filled: vec![false; total_bins],
            remaining: total_bins,
        }
    }
}

/// Reassembles panadapter FFT frames per stream id.
///
/// At most one frame is ever in progress per stream: a packet whose
/// `frame_index` doesn't match the frame already in progress drops that
/// frame (even if it was partially filled) and starts a new one, since
/// the radio never interleaves two frames on the same stream.
#[derive(Default)]
pub struct FftReassembler {
    streams: HashMap<u32, FftAssembly>,
}

impl FftReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one FFT packet onto its stream's in-progress frame. Returns
    /// `Some` exactly when this packet completed the frame.
    pub fn push(&mut self, stream_id: u32, packet: &FftPacket) -> Option<CompleteFftFrame> {
        let header = &packet.header;
        let total_bins = header.total_bins_in_frame as usize;

        let needs_fresh_start = match self.streams.get(&stream_id) {
            None => true,
            Some(existing) => existing.frame_index != header.frame_index || existing.total_bins != total_bins,
        };
        if needs_fresh_start {
            if self.streams.contains_key(&stream_id) {
                tracing::debug!(stream_id, frame_index = header.frame_index, "dropping incomplete frame for new frame_index or resize");
            }
            self.streams.insert(stream_id, FftAssembly::new(header.frame_index, total_bins));
        }

        let assembly = self.streams.get_mut(&stream_id).expect("just inserted");
        let start = header.start_bin_index as usize;
        for (i, &bin) in packet.bins.iter().enumerate() {
            let index = start + i;
            if index >= assembly.total_bins {
                break;
            }
            if !assembly.filled[index] {
                assembly.filled[index] = true;
                assembly.remaining -= 1;
            }
            assembly.bins[index] = bin;
        }

        if assembly.remaining == 0 {
            let assembly = self.streams.remove(&stream_id).expect("just matched");
            Some(CompleteFftFrame {
                stream_id,
                frame_index: assembly.frame_index,
                bins: assembly.bins,
            })
        } else {
            None
        }
    }

    /// Drop any in-progress frame for `stream_id`, e.g. on unsubscribe.
    pub fn clear(&mut self, stream_id: u32) {
        self.streams.remove(&stream_id);
    }
}

/// A fully reassembled waterfall row at one timecode.
#[derive(Clone, PartialEq, Debug)]
pub struct CompleteWaterfallRow {
    pub stream_id: u32,
    pub timecode: u32,
    pub bins: Vec<u16>,
}

/// One stream's in-progress waterfall row, keyed by timecode so
/// out-of-order timecodes don't corrupt each other.
struct WaterfallRow {
    total_bins: usize,
    bins: Vec<u16>,
    filled: Vec<bool>,
    remaining: usize,
}

impl WaterfallRow {
    fn new(total_bins: usize) -> Self {
        Self {
            total_bins,
            bins: vec![0; total_bins],
            filled: vec![false; total_bins],
            remaining: total_bins,
        }
    }
}

/// Reassembles waterfall rows per stream id, compositing tiles
/// left-to-right by `firstBinIndex` within a shared `timecode`.
///
/// Timecodes are monotonic but tiles for different timecodes can arrive
/// interleaved (a slow line catching up behind a fresher one); each
/// timecode gets its own assembly so the relative y-offset of a
/// late-arriving row is still derived correctly once it completes.
#[derive(Default)]
pub struct WaterfallReassembler {
    rows: HashMap<u32, HashMap<u32, WaterfallRow>>,
    latest_timecode: HashMap<u32, u32>,
}

impl WaterfallReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one waterfall tile onto its stream+timecode's in-progress
    /// row. Returns `Some` exactly when this tile completed the row.
    pub fn push(&mut self, stream_id: u32, tile: &WaterfallTile) -> Option<CompleteWaterfallRow> {
        let header = &tile.header;
        let total_bins = header.total_bins_in_frame as usize;

        self.latest_timecode
            .entry(stream_id)
            .and_modify(|t| *t = (*t).max(header.timecode))
            .or_insert(header.timecode);

        let per_stream = self.rows.entry(stream_id).or_default();
        let row = per_stream
            .entry(header.timecode)
            .or_insert_with(|| WaterfallRow::new(total_bins));

        let start = header.first_bin_index as usize;
        for (i, &sample) in tile.samples.iter().enumerate() {
            let index = start + i;
            if index >= row.total_bins {
                break;
            }
            if !row.filled[index] {
                row.filled[index] = true;
                row.remaining -= 1;
            }
            row.bins[index] = sample;
        }

        if row.remaining == 0 {
            let row = per_stream.remove(&header.timecode).expect("just matched");
            Some(CompleteWaterfallRow {
                stream_id,
                timecode: header.timecode,
                bins: row.bins,
            })
        } else {
            None
        }
    }

    /// Relative y-offset (in rows) of `timecode` against the most recent
    /// timecode seen for `stream_id`, for placing a late-completing row at
    /// its historical position instead of the bottom of the display.
    pub fn relative_row_offset(&self, stream_id: u32, timecode: u32) -> i64 {
        match self.latest_timecode.get(&stream_id) {
            Some(&latest) => latest as i64 - timecode as i64,
            None => 0,
        }
    }

    pub fn clear(&mut self, stream_id: u32) {
        self.rows.remove(&stream_id);
        self.latest_timecode.remove(&stream_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flex_vita::payload::fft::FftHeader;
    use flex_vita::timestamp::Q20;
    use flex_vita::payload::waterfall::WaterfallHeader;

    fn fft_packet(frame_index: u32, start: u16, bins: Vec<u16>) -> FftPacket {
        FftPacket {
            header: FftHeader {
                start_bin_index: start,
                num_bins: bins.len() as u16,
                bin_size: 2,
                total_bins_in_frame: 8192,
                frame_index,
            },
            bins,
        }
    }

    #[test]
    fn reassembles_out_of_order_fragments_into_one_complete_frame() {
        let mut reassembler = FftReassembler::new();
        assert!(reassembler.push(1, &fft_packet(42, 4096, vec![0; 2048])).is_none());
        assert!(reassembler.push(1, &fft_packet(42, 0, vec![0; 2048])).is_none());
        let complete = reassembler.push(1, &fft_packet(42, 6144, vec![0; 2048]));
        // still short 2048..4096 — three fragments of 2048 cover 6144 bins
        // out of 8192, not complete yet.
        assert!(complete.is_none());
        let complete = reassembler.push(1, &fft_packet(42, 2048, vec![0; 2048])).unwrap();
        assert_eq!(complete.stream_id, 1);
        assert_eq!(complete.frame_index, 42);
        assert_eq!(complete.bins.len(), 8192);
    }

    #[test]
    fn new_frame_index_drops_incomplete_frame() {
        let mut reassembler = FftReassembler::new();
        assert!(reassembler.push(1, &fft_packet(1, 0, vec![0; 100])).is_none());
        // frame 1 never completes; frame 2 starts clean.
        let small = FftPacket {
            header: FftHeader {
                start_bin_index: 0,
                num_bins: 4,
                bin_size: 2,
                total_bins_in_frame: 4,
                frame_index: 2,
            },
            bins: vec![1, 2, 3, 4],
        };
        let complete = reassembler.push(1, &small).unwrap();
        assert_eq!(complete.frame_index, 2);
        assert_eq!(complete.bins, vec![1, 2, 3, 4]);
    }

    fn waterfall_tile(timecode: u32, first_bin: u16, total: u16, samples: Vec<u16>) -> WaterfallTile {
        WaterfallTile {
            header: WaterfallHeader {
                frame_low_frequency: Q20::from_hz(14_000_000),
                bin_bandwidth: Q20::from_hz(100),
                line_duration_ms: 100,
                width: samples.len() as u16,
                height: 1,
                timecode,
                auto_black_level: 0,
                total_bins_in_frame: total,
                first_bin_index: first_bin,
            },
            samples,
        }
    }

    #[test]
    fn composites_tiles_left_to_right_within_one_timecode() {
        let mut reassembler = WaterfallReassembler::new();
        assert!(reassembler.push(9, &waterfall_tile(7, 0, 4, vec![1, 2])).is_none());
        let row = reassembler.push(9, &waterfall_tile(7, 2, 4, vec![3, 4])).unwrap();
        assert_eq!(row.bins, vec![1, 2, 3, 4]);
        assert_eq!(row.timecode, 7);
    }

    #[test]
    fn out_of_order_timecode_completes_at_its_own_historical_offset() {
        let mut reassembler = WaterfallReassembler::new();
        reassembler.push(9, &waterfall_tile(10, 0, 2, vec![1, 2])).unwrap();
        assert_eq!(reassembler.relative_row_offset(9, 10), 0);
        // timecode 8 arrives late, after 10 already completed.
        let row = reassembler.push(9, &waterfall_tile(8, 0, 2, vec![5, 6])).unwrap();
        assert_eq!(row.timecode, 8);
        assert_eq!(reassembler.relative_row_offset(9, 8), 2);
    }
}
