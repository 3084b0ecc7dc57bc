//! End-to-end transmit/receive exercises over the full FEC chain.

use m17_core::bits::{soft_from_byte, SoftBit, SOFT_ONE};
use m17_core::crc16::crc_m17;
use m17_core::type_field::TYPE_VOICE_STREAM;
use m17_core::{Address, RF_FRAME_BYTES, SYNC_BERT, SYNC_LSF, SYNC_PACKET, SYNC_STREAM};
use m17_frames::rf::{self, soft_from_rf_frame};
use m17_frames::{
    BertFrame, IpFrame, LichCollector, Lsf, Packet, PacketAssembler, ProtocolId, StreamFrame,
};

fn test_lsf() -> Lsf {
    Lsf::new(
        Address::from_callsign("W2FBI").unwrap(),
        Address::from_callsign("N0CALL").unwrap(),
        TYPE_VOICE_STREAM,
    )
}

#[test]
fn lsf_air_roundtrip() {
    let lsf = test_lsf();
    let rf_frame = rf::encode_lsf(&lsf);
    assert_eq!(rf_frame.len(), RF_FRAME_BYTES);

    let soft = soft_from_rf_frame(&rf_frame, SYNC_LSF).unwrap();
    assert_eq!(rf::decode_lsf(&soft).unwrap(), lsf);
}

#[test]
fn lsf_survives_channel_errors() {
    let lsf = test_lsf();
    let rf_frame = rf::encode_lsf(&lsf);
    let mut soft = soft_from_rf_frame(&rf_frame, SYNC_LSF).unwrap();

    // a sprinkle of hard bit flips across the frame
    for pos in [10, 60, 111, 200, 290, 350] {
        soft[pos] = SOFT_ONE - soft[pos];
    }
    assert_eq!(rf::decode_lsf(&soft).unwrap(), lsf);
}

/// Scenario F: clean stream frame through TX and RX with byte-soft input.
#[test]
fn stream_frame_with_byte_soft_symbols() {
    let payload: [u8; 16] = core::array::from_fn(|i| i as u8);
    let lich_chunk = test_lsf().lich_chunks()[0];
    let frame = StreamFrame::new(lich_chunk, 0, payload, false);

    let rf_frame = frame.encode_rf();
    assert_eq!(u16::from_be_bytes([rf_frame[0], rf_frame[1]]), SYNC_STREAM);

    // the radio front end hands us 8-bit soft symbols: 0 or 255
    let soft: Vec<SoftBit> = m17_core::bits::bytes_to_bits(&rf_frame[2..], 368)
        .iter()
        .map(|&b| soft_from_byte(if b != 0 { 255 } else { 0 }))
        .collect();

    let decoded = StreamFrame::decode_rf(&soft).unwrap();
    assert_eq!(decoded.payload_bytes(), frame.payload_bytes());
    assert_eq!(decoded.lich_chunk, lich_chunk);
}

#[test]
fn stream_sequence_rebuilds_lsf_through_lich() {
    let lsf = test_lsf();
    let chunks = lsf.lich_chunks();
    let mut collector = LichCollector::new();
    let mut assembled = None;

    for fn_counter in 0..6u16 {
        let chunk = chunks[fn_counter as usize % 6];
        let frame = StreamFrame::new(chunk, fn_counter, [0xAA; 16], fn_counter == 5);
        let rf_frame = frame.encode_rf();

        let soft = soft_from_rf_frame(&rf_frame, SYNC_STREAM).unwrap();
        let decoded = rf::decode_stream(&soft).unwrap();
        assert_eq!(decoded.frame.sequence(), fn_counter);

        if let Some(metric) = decoded.lich_metric {
            collector.accept(&decoded.frame.lich_chunk, metric).unwrap();
        }
        if let Some(found) = collector.try_assemble() {
            assembled = Some(found);
        }
    }

    assert_eq!(assembled.expect("six good chunks must assemble"), lsf);
}

#[test]
fn packet_multi_chunk_over_air() {
    m17_core::debug::setup_logging_default();
    let message = b"The quick brown fox jumps over the lazy dog. \
                    Packet mode carries it in 25-byte chunks.";
    let packet = Packet::new(ProtocolId::Sms, message.to_vec()).unwrap();
    assert!(packet.chunk_count() > 1);

    let mut assembler = PacketAssembler::new();
    let mut received = None;
    for rf_frame in rf::encode_packet(&packet) {
        assert_eq!(u16::from_be_bytes([rf_frame[0], rf_frame[1]]), SYNC_PACKET);
        let soft = soft_from_rf_frame(&rf_frame, SYNC_PACKET).unwrap();
        let chunk = rf::decode_packet_chunk(&soft).unwrap();
        received = assembler.push(&chunk).unwrap();
    }

    let received = received.expect("last chunk completes the packet");
    assert_eq!(received.protocol, ProtocolId::Sms);
    assert_eq!(received.payload(), message);
}

#[test]
fn bert_loopback_measures_zero_ber() {
    let frame = BertFrame::generate(0x1FF);
    let rf_frame = frame.encode_rf();
    assert_eq!(u16::from_be_bytes([rf_frame[0], rf_frame[1]]), SYNC_BERT);

    let soft = soft_from_rf_frame(&rf_frame, SYNC_BERT).unwrap();
    let decoded = BertFrame::decode_rf(&soft).unwrap();

    let reference = BertFrame::generate(0x1FF);
    assert_eq!(decoded.ber(&reference), 0.0);
}

#[test]
fn bert_corrects_channel_then_counts_payload_errors() {
    let frame = BertFrame::generate(0x1FF);
    let rf_frame = frame.encode_rf();
    let mut soft = soft_from_rf_frame(&rf_frame, SYNC_BERT).unwrap();

    // light corruption: the FEC removes it entirely
    soft[33] = SOFT_ONE - soft[33];
    soft[277] = SOFT_ONE - soft[277];
    let decoded = BertFrame::decode_rf(&soft).unwrap();
    assert_eq!(decoded.ber(&BertFrame::generate(0x1FF)), 0.0);
}

/// Scenario A: the CRC reference vectors.
#[test]
fn crc_reference_vectors() {
    assert_eq!(crc_m17(b""), 0xFFFF);
    assert_eq!(crc_m17(b"A"), 0x206E);
    assert_eq!(crc_m17(b"123456789"), 0x772B);
}

/// Scenario B: address reference vector.
#[test]
fn address_reference_vector() {
    let addr = Address::from_callsign("W2FBI").unwrap();
    assert_eq!(addr.numeric(), 0x0161_AE1F);
    assert_eq!(
        Address::from_bytes(&addr.to_bytes()).callsign().unwrap(),
        "W2FBI"
    );
    assert!(Address::from_callsign("@ALL").unwrap().is_broadcast());
}

/// Scenario D: LSF serialization.
#[test]
fn lsf_serialization_vector() {
    let lsf = test_lsf();
    let bytes = lsf.to_bytes();
    assert_eq!(bytes.len(), 30);
    assert_eq!(&bytes[28..30], &crc_m17(&bytes[..28]).to_be_bytes());
}

/// Scenario E: the IP frame wire image.
#[test]
fn ip_frame_wire_image() {
    let frame = IpFrame::create("W2FBI", "N0CALL", 0x1234, b"voice_data_here!").unwrap();
    let bytes = frame.to_bytes();

    assert_eq!(bytes.len(), 54);
    assert_eq!(&bytes[0..4], b"M17 ");
    assert_eq!(bytes[4], 0x12);
    assert_eq!(bytes[5], 0x34);

    let parsed = IpFrame::parse(&bytes).unwrap();
    assert_eq!(parsed, frame);
    assert_eq!(parsed.lsf.src.callsign().unwrap(), "N0CALL");
    assert_eq!(parsed.lsf.dst.callsign().unwrap(), "W2FBI");
    assert_eq!(&parsed.payload, b"voice_data_here!");
}

#[test]
fn random_voice_stream_over_air() {
    let lsf = test_lsf();
    let chunks = lsf.lich_chunks();

    for fn_counter in 0..20u16 {
        let payload: [u8; 16] = core::array::from_fn(|_| rand::random_range(0..=255u8));
        let frame = StreamFrame::new(
            chunks[fn_counter as usize % 6],
            fn_counter,
            payload,
            fn_counter == 19,
        );
        let soft = soft_from_rf_frame(&frame.encode_rf(), SYNC_STREAM).unwrap();
        let decoded = StreamFrame::decode_rf(&soft).unwrap();
        assert_eq!(decoded, frame);
    }
}

#[test]
fn text_message_across_frames() {
    let text = "Greetings from the integration test, block by block.";
    let frames = Lsf::create_text_message_frames(
        Address::from_callsign("@ALL").unwrap(),
        Address::from_callsign("N0CALL").unwrap(),
        text,
    )
    .unwrap();

    // each LSF takes the full air pipeline, then the blocks reassemble
    let mut blocks = Vec::new();
    for lsf in &frames {
        let soft = soft_from_rf_frame(&rf::encode_lsf(lsf), SYNC_LSF).unwrap();
        let decoded = rf::decode_lsf(&soft).unwrap();
        match decoded.meta().unwrap() {
            m17_frames::Meta::Text(block) => blocks.push(block),
            other => panic!("expected text meta, got {:?}", other),
        }
    }
    assert_eq!(
        m17_frames::meta::MetaText::decode_blocks(&blocks).unwrap(),
        text
    );
}
