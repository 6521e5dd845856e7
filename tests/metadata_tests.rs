//! Metadata Tests
//!
//! Records written through one handle and read back through another, plus
//! the signal statistics and format-specific commands.

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use sndcore::metadata::instrument::MAX_LOOPS;
use sndcore::{
    Ambisonic, BroadcastInfo, ErrorCode, FixedText, InstrumentInfo, InstrumentLoop, LoopInfo,
    LoopMode, MajorFormat, MemoryEngine, OpenMode, SoundError, SoundFile, SoundInfo, SubFormat,
};

fn create(engine: &MemoryEngine, path: &str, major: MajorFormat, sub: SubFormat) -> SoundFile {
    SoundFile::create(engine, path, SoundInfo::new(44100, 2, major | sub)).unwrap()
}

fn sample_loop_info() -> LoopInfo {
    LoopInfo {
        time_sig_num: 3,
        time_sig_den: 4,
        mode: LoopMode::Alternating,
        beats: 12,
        bpm: 96.5,
        root_key: 60,
        future: [0; 6],
    }
}

fn sample_instrument() -> InstrumentInfo {
    InstrumentInfo {
        gain: -3,
        base_note: 57,
        detune: -12,
        velocity_lo: 1,
        velocity_hi: 127,
        key_lo: 40,
        key_hi: 80,
        loops: vec![
            InstrumentLoop {
                mode: LoopMode::Forward,
                start: 100,
                end: 2000,
                count: 0,
            },
            InstrumentLoop {
                mode: LoopMode::Backward,
                start: 2000,
                end: 4000,
                count: 3,
            },
        ],
    }
}

// === Persistence ===

#[test]
fn test_records_survive_reopen() {
    let engine = MemoryEngine::new();
    let mut file = create(&engine, "meta.wav", MajorFormat::Wav, SubFormat::Pcm24);

    let mut bext = BroadcastInfo {
        description: FixedText::from("Field recording, take 3"),
        originator: FixedText::from("sndcore"),
        version: 2,
        loudness_value: -2300,
        coding_history: FixedText::from("A=PCM,F=44100,W=24,M=stereo\r\n"),
        ..BroadcastInfo::default()
    };
    bext.set_time_reference(5_000_000_000);
    bext.set_origination(
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap(),
    );

    assert!(file.set_loop_info(&sample_loop_info()).unwrap());
    assert!(file.set_instrument(&sample_instrument()).unwrap());
    assert!(file.set_broadcast_info(&bext).unwrap());
    file.write_frames(&[0i32; 20]).unwrap();
    file.close().unwrap();

    let mut file = SoundFile::open_read(&engine, "meta.wav").unwrap();
    assert_eq!(file.loop_info().unwrap(), Some(sample_loop_info()));
    assert_eq!(file.instrument().unwrap(), Some(sample_instrument()));

    let back = file.broadcast_info().unwrap().unwrap();
    assert_eq!(back, bext);
    assert_eq!(back.time_reference(), 5_000_000_000);
    assert_eq!(
        back.origination().unwrap().to_string(),
        "2024-03-09 14:05:00"
    );
}

#[test]
fn test_missing_records_are_none() {
    let engine = MemoryEngine::new();
    create(&engine, "plain.aiff", MajorFormat::Aiff, SubFormat::Pcm16)
        .close()
        .unwrap();

    let mut file = SoundFile::open_read(&engine, "plain.aiff").unwrap();
    assert_eq!(file.loop_info().unwrap(), None);
    assert_eq!(file.instrument().unwrap(), None);
    assert_eq!(file.broadcast_info().unwrap(), None);
}

#[test]
fn test_unsupported_container_rejects_records() {
    let engine = MemoryEngine::new();
    let mut aiff = create(&engine, "r.aiff", MajorFormat::Aiff, SubFormat::Pcm16);
    assert!(!aiff.set_broadcast_info(&BroadcastInfo::default()).unwrap());
    assert!(aiff.set_loop_info(&sample_loop_info()).unwrap());

    let mut au = create(&engine, "r.au", MajorFormat::Au, SubFormat::Pcm16);
    assert!(!au.set_instrument(&sample_instrument()).unwrap());
    assert_eq!(au.instrument().unwrap(), None);
}

#[test]
fn test_records_need_write_access() {
    let engine = MemoryEngine::new();
    create(&engine, "ro.wav", MajorFormat::Wav, SubFormat::Pcm16)
        .close()
        .unwrap();

    let mut file = SoundFile::open_read(&engine, "ro.wav").unwrap();
    let err = file.set_loop_info(&sample_loop_info()).unwrap_err();
    assert!(matches!(err, SoundError::Mode { .. }));
}

// === Text Fields ===

#[test]
fn test_long_text_is_cut_to_capacity() {
    let engine = MemoryEngine::new();
    let mut file = create(&engine, "long.wav", MajorFormat::Wav, SubFormat::Pcm16);

    let long = "x".repeat(300);
    let bext = BroadcastInfo {
        description: FixedText::from(long.as_str()),
        originator: FixedText::from("an originator name well past thirty-two bytes"),
        coding_history: FixedText::from("h".repeat(400)),
        ..BroadcastInfo::default()
    };
    assert_eq!(bext.description.len(), 256);
    assert!(file.set_broadcast_info(&bext).unwrap());
    file.close().unwrap();

    let mut file = SoundFile::open_read(&engine, "long.wav").unwrap();
    let back = file.broadcast_info().unwrap().unwrap();
    assert_eq!(back.description.to_string_lossy(), "x".repeat(256));
    assert_eq!(
        back.originator.to_string_lossy(),
        "an originator name well past thi"
    );
    assert_eq!(back.coding_history.len(), 256);
}

#[test]
fn test_text_stops_at_nul() {
    let text: FixedText<32> = FixedText::new(b"abc\0def");
    assert_eq!(text.to_string_lossy(), "abc");
}

// === Instrument Limits ===

#[test]
fn test_too_many_loops_rejected_before_engine() {
    let engine = MemoryEngine::new();
    let mut file = create(&engine, "inst.wav", MajorFormat::Wav, SubFormat::Pcm16);

    let mut instrument = sample_instrument();
    instrument.loops = vec![InstrumentLoop::default(); MAX_LOOPS + 1];
    let err = file.set_instrument(&instrument).unwrap_err();
    assert!(matches!(err, SoundError::InvalidRecord { .. }));
    file.close().unwrap();

    let mut file = SoundFile::open_read(&engine, "inst.wav").unwrap();
    assert_eq!(file.instrument().unwrap(), None);
}

#[test]
fn test_full_loop_table() {
    let engine = MemoryEngine::new();
    let mut file = create(&engine, "full.wav", MajorFormat::WavEx, SubFormat::Float);

    let mut instrument = sample_instrument();
    instrument.loops = (0..MAX_LOOPS as u32)
        .map(|i| InstrumentLoop {
            mode: LoopMode::Forward,
            start: i * 10,
            end: i * 10 + 5,
            count: i,
        })
        .collect();
    assert!(file.set_instrument(&instrument).unwrap());
    file.close().unwrap();

    let mut file = SoundFile::open_read(&engine, "full.wav").unwrap();
    assert_eq!(file.instrument().unwrap(), Some(instrument));
}

// === Signal Statistics ===

#[test]
fn test_calculated_maxima() {
    let engine = MemoryEngine::new();
    let mut file = create(&engine, "max.wav", MajorFormat::Wav, SubFormat::Pcm16);
    file.write_frames(&[100i16, -200, -16384, 50, 300, 0]).unwrap();
    file.close().unwrap();

    let mut file = SoundFile::open_read(&engine, "max.wav").unwrap();
    assert_abs_diff_eq!(file.calc_signal_max().unwrap(), 16384.0);
    assert_abs_diff_eq!(file.calc_norm_signal_max().unwrap(), 0.5);
    assert_eq!(file.calc_max_all_channels().unwrap(), vec![16384.0, 200.0]);
    let norm = file.calc_norm_max_all_channels().unwrap();
    assert_abs_diff_eq!(norm[1], 200.0 / 32768.0, epsilon = 1e-12);
}

#[test]
fn test_peak_chunk_only_for_float_data() {
    let engine = MemoryEngine::new();

    let mut float = create(&engine, "peak.wav", MajorFormat::Wav, SubFormat::Float);
    assert!(float.set_add_peak_chunk(true).unwrap());
    float.write_frames(&[0.25f32, -0.75, 0.5, 0.1]).unwrap();
    float.close().unwrap();

    let mut float = SoundFile::open_read(&engine, "peak.wav").unwrap();
    assert_abs_diff_eq!(float.signal_max().unwrap().unwrap(), 0.75, epsilon = 1e-7);
    let peaks = float.max_all_channels().unwrap().unwrap();
    assert_abs_diff_eq!(peaks[0], 0.5, epsilon = 1e-7);
    assert_abs_diff_eq!(peaks[1], 0.75, epsilon = 1e-7);

    let mut pcm = create(&engine, "nopeak.wav", MajorFormat::Wav, SubFormat::Pcm16);
    assert!(!pcm.set_add_peak_chunk(true).unwrap());
    pcm.write_frames(&[1i16, 2]).unwrap();
    pcm.close().unwrap();

    let mut pcm = SoundFile::open_read(&engine, "nopeak.wav").unwrap();
    assert_eq!(pcm.signal_max().unwrap(), None);
    assert_eq!(pcm.max_all_channels().unwrap(), None);
}

// === Format-Specific Commands ===

#[test]
fn test_ambisonic_on_wavex_only() {
    let engine = MemoryEngine::new();

    let mut wavex = create(&engine, "amb.wav", MajorFormat::WavEx, SubFormat::Pcm16);
    assert_eq!(wavex.wavex_ambisonic().unwrap(), Some(Ambisonic::None));
    assert!(wavex.set_wavex_ambisonic(Ambisonic::BFormat).unwrap());
    assert_eq!(wavex.wavex_ambisonic().unwrap(), Some(Ambisonic::BFormat));

    let mut wav = create(&engine, "amb2.wav", MajorFormat::Wav, SubFormat::Pcm16);
    assert_eq!(wav.wavex_ambisonic().unwrap(), None);
    assert!(!wav.set_wavex_ambisonic(Ambisonic::BFormat).unwrap());
}

#[test]
fn test_raw_start_offset_and_embed_info() {
    let engine = MemoryEngine::new();
    let mut raw = create(&engine, "data.raw", MajorFormat::Raw, SubFormat::Pcm16);
    raw.set_raw_start_offset(512).unwrap();
    raw.write_frames(&[0i16; 8]).unwrap();

    let embedded = raw.embedded_file_info().unwrap();
    assert_eq!(embedded.offset, 512);
    assert_eq!(embedded.length, 16 * 2);

    let mut wav = create(&engine, "data.wav", MajorFormat::Wav, SubFormat::Pcm16);
    let err = wav.set_raw_start_offset(512).unwrap_err();
    assert_eq!(err.engine_code(), Some(ErrorCode::UNSUPPORTED_COMMAND));
}

#[test]
fn test_vbr_quality_range() {
    let engine = MemoryEngine::new();
    let mut flac = create(&engine, "q.flac", MajorFormat::Flac, SubFormat::Pcm16);
    flac.set_vbr_quality(0.4).unwrap();
    let err = flac.set_vbr_quality(1.5).unwrap_err();
    assert_eq!(err.engine_code(), Some(ErrorCode::BAD_COMMAND_PARAM));
}

#[test]
fn test_log_info_names_the_stream() {
    let engine = MemoryEngine::new();
    let mut file = SoundFile::open(
        &engine,
        "log.wav",
        OpenMode::ReadWrite,
        SoundInfo::new(8000, 1, MajorFormat::Wav | SubFormat::Pcm16),
    )
    .unwrap();
    assert!(file.log_info().unwrap().contains("log.wav"));
}
