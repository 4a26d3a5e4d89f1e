use super::probe::{estimate_seconds, whole_seconds};
use super::recorder::{frames_to_duration, to_i16};
use super::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn write_wav(dir: &Path, name: &str, seconds: u32) -> PathBuf {
    let path = dir.join(name);
    let spec = RecordFormat::Wav16.spec(1, 8_000);
    let mut w = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..(8_000 * seconds) {
        let v = ((i % 80) as f32 / 40.0) - 1.0;
        w.write_sample(to_i16(v * 0.5)).unwrap();
    }
    w.finalize().unwrap();
    path
}

#[test]
fn probe_measures_a_real_wav() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_wav(tmp.path(), "Night fan.wav", 2);

    let info = probe(&path, 10 * 1024 * 1024).unwrap();

    assert!(info.measured);
    assert_eq!(info.duration_seconds, 2);
    assert_eq!(info.suggested_name, "Night fan");
    assert_eq!(info.size_bytes, std::fs::metadata(&path).unwrap().len());
}

#[test]
fn probe_estimates_when_the_format_is_unknown() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("blob.bin");
    std::fs::write(&path, vec![0u8; 32_000]).unwrap();

    let info = probe(&path, 10 * 1024 * 1024).unwrap();

    assert!(!info.measured);
    assert_eq!(info.duration_seconds, 2);
    assert_eq!(info.suggested_name, "blob");
}

#[test]
fn probe_rejects_files_over_the_size_cap() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("big.wav");
    std::fs::write(&path, vec![0u8; 2048]).unwrap();

    let err = probe(&path, 1024).unwrap_err();
    assert!(matches!(
        err,
        ProbeError::TooLarge {
            size_bytes: 2048,
            max_bytes: 1024
        }
    ));
}

#[test]
fn probe_reports_missing_and_non_files() {
    let tmp = tempfile::tempdir().unwrap();

    let missing = probe(&tmp.path().join("nope.mp3"), 1024).unwrap_err();
    assert!(matches!(missing, ProbeError::Io { .. }));

    let dir = probe(tmp.path(), 1024).unwrap_err();
    assert!(matches!(dir, ProbeError::NotAFile(_)));
}

#[test]
fn too_large_message_names_the_limit_in_megabytes() {
    let err = ProbeError::TooLarge {
        size_bytes: 15 * 1024 * 1024,
        max_bytes: 10 * 1024 * 1024,
    };
    assert_eq!(
        err.to_string(),
        "file is 15 MB; imports are limited to 10 MB"
    );
}

#[test]
fn whole_seconds_rounds_to_nearest() {
    assert_eq!(whole_seconds(Duration::from_millis(1_499)), 1);
    assert_eq!(whole_seconds(Duration::from_millis(1_500)), 2);
    assert_eq!(whole_seconds(Duration::ZERO), 0);
}

#[test]
fn estimate_uses_128_kbit() {
    assert_eq!(estimate_seconds(0), 0);
    assert_eq!(estimate_seconds(16_000), 1);
    assert_eq!(estimate_seconds(16_000 * 300), 300);
}

#[test]
fn to_i16_clamps_out_of_range_samples() {
    assert_eq!(to_i16(0.0), 0);
    assert_eq!(to_i16(1.0), i16::MAX);
    assert_eq!(to_i16(4.0), i16::MAX);
    assert_eq!(to_i16(-4.0), -i16::MAX);
}

#[test]
fn frames_convert_to_elapsed_time() {
    assert_eq!(frames_to_duration(44_100, 44_100), Duration::from_secs(1));
    assert_eq!(frames_to_duration(22_050, 44_100), Duration::from_millis(500));
    assert_eq!(frames_to_duration(10, 0), Duration::ZERO);
}

#[test]
fn record_format_follows_the_setting() {
    use crate::config::RecordFormatSetting;

    let int = RecordFormat::from(RecordFormatSetting::Wav16).spec(2, 48_000);
    assert_eq!(int.bits_per_sample, 16);
    assert_eq!(int.sample_format, hound::SampleFormat::Int);

    let float = RecordFormat::from(RecordFormatSetting::WavFloat).spec(1, 44_100);
    assert_eq!(float.bits_per_sample, 32);
    assert_eq!(float.sample_format, hound::SampleFormat::Float);
    assert_eq!(float.channels, 1);
}

#[test]
fn player_without_a_loop_never_opens_the_device() {
    let mut player = AudioPlayer::new(3.0);
    assert!(matches!(player.stop(), Err(AudioError::NotLoaded)));
    player.quit_softly(Duration::from_millis(10));
    assert!(matches!(player.stop(), Err(AudioError::NotLoaded)));
}
