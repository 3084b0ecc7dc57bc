//! M17 frame types and the RF error-control pipeline
//!
//! Link Setup Frames with their META variants, stream frames with LICH
//! chunking, packet frames, the M17-over-IP encapsulation and BERT
//! frames, plus the per-frame-type FEC glue that turns them into
//! sync-prefixed 48-byte RF frames and back.

pub mod bert;
pub mod ip;
pub mod lich;
pub mod lsf;
pub mod meta;
pub mod packet;
pub mod rf;
pub mod stream;

pub use bert::{BertFrame, BertGenerator};
pub use ip::IpFrame;
pub use lich::LichCollector;
pub use lsf::{Lsf, Meta};
pub use packet::{Packet, PacketAssembler, ProtocolId, TlePacket};
pub use rf::StreamDecoded;
pub use stream::StreamFrame;
