use proptest::prelude::*;
use rollfile_core::{NullDiagnostics, RotatingWriter, RotationPolicy};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn chunks(max_len: usize, max_count: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..max_len), 0..max_count)
}

proptest! {
    // Each case touches the real filesystem, so keep the case count modest.
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn below_budget_never_rotates(data in chunks(16, 12), slack in 1u64..64) {
        let total: u64 = data.iter().map(|c| c.len() as u64).sum();
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("app.log");
        let mut writer = RotatingWriter::new(&path, &RotationPolicy::new(total + slack), Arc::new(NullDiagnostics))
            .expect("writer");

        for chunk in &data {
            prop_assert!(!writer.write(chunk).rotated);
        }

        prop_assert_eq!(fs::metadata(&path).expect("stat").len(), total);
        prop_assert_eq!(writer.current_size_bytes(), total);
        prop_assert!(!writer.backup_path(1).exists());
    }

    #[test]
    fn rotation_loses_nothing_while_the_window_holds(
        data in chunks(24, 40),
        max_size in 1u64..48,
    ) {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("app.log");
        let policy = RotationPolicy::new(max_size).with_max_backups(1000);
        let mut writer = RotatingWriter::new(&path, &policy, Arc::new(NullDiagnostics))
            .expect("writer");

        let mut rotations = 0u32;
        for chunk in &data {
            let report = writer.write(chunk);
            prop_assert!(report.persisted);
            if report.rotated {
                rotations += 1;
                // The triggering chunk is alone in the fresh live file.
                prop_assert_eq!(&fs::read(&path).expect("read live"), chunk);
            }
        }

        let mut replay = Vec::new();
        for index in (1..=rotations).rev() {
            let backup = fs::read(writer.backup_path(index)).expect("read backup");
            // A file only exceeds the budget when it holds one oversized chunk.
            prop_assert!(backup.len() as u64 <= max_size || data.iter().any(|c| c == &backup));
            replay.extend_from_slice(&backup);
        }
        replay.extend_from_slice(&fs::read(&path).expect("read live"));

        prop_assert_eq!(replay, data.concat());
        prop_assert!(!writer.backup_path(rotations + 1).exists());
    }

    #[test]
    fn window_never_exceeds_max_backups(
        data in chunks(8, 30),
        max_size in 1u64..16,
        max_backups in 0u32..4,
    ) {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("app.log");
        let policy = RotationPolicy::new(max_size).with_max_backups(max_backups);
        let mut writer = RotatingWriter::new(&path, &policy, Arc::new(NullDiagnostics))
            .expect("writer");

        for chunk in &data {
            writer.write(chunk);
        }

        let files = fs::read_dir(tmp.path()).expect("read dir").count();
        prop_assert!(files <= 1 + max_backups.max(1) as usize);
        prop_assert!(!writer.backup_path(max_backups.max(1) + 1).exists());
    }
}
